use crate::antenna::GainMode;
use crate::coverage::compliance::SignalQuality;
use crate::coverage::throughput::throughput_from_sinr;
use crate::coverage::view::ViewMode;
use crate::math::units::{dbm_to_mw, mw_to_dbm};
use crate::model::{AccessPoint, Scene};
use crate::prelude::Point;
use crate::propagation::PropagationModel;
use serde::{Deserialize, Serialize};

/// Floor values and thresholds used when combining several transmitters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// RSSI reported where no AP is enabled, dBm.
    pub no_server_rssi_dbm: f64,
    /// CCI reported when no co-channel interferer exists, dBm.
    pub cci_floor_dbm: f64,
    /// Interference below this level is left out of SINR, dBm.
    pub sinr_cci_cutoff_dbm: f64,
    /// An interferer counts once its received power exceeds this, dBm.
    pub interference_threshold_dbm: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            no_server_rssi_dbm: -200.0,
            cci_floor_dbm: -200.0,
            sinr_cci_cutoff_dbm: -150.0,
            interference_threshold_dbm: -85.0,
        }
    }
}

/// The AP serving a point and its received power there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingSignal<'s> {
    pub ap: Option<&'s AccessPoint>,
    pub rssi_dbm: f64,
}

impl ServingSignal<'_> {
    pub fn channel(&self) -> Option<u32> {
        self.ap.map(|ap| ap.channel)
    }
}

/// Discrete key used to color categorical views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category<'s> {
    Server(&'s str),
    Channel(u32),
    Count(usize),
    NoServer,
}

/// One evaluated raster cell: the scalar value plus, for categorical views, its key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample<'s> {
    pub value: f64,
    pub category: Option<Category<'s>>,
}

/// Everything a tooltip shows for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub point: Point,
    pub ap_id: Option<String>,
    pub channel: Option<u32>,
    pub rssi_dbm: f64,
    pub snr_db: f64,
    pub cci_dbm: f64,
    pub sinr_db: f64,
    pub interferers: usize,
    pub throughput_mbps: f64,
    pub quality: SignalQuality,
}

/// Multi-AP signal evaluation over one scene snapshot.
///
/// Every query is a pure function of the snapshot, so one `Coverage` can be
/// shared by reference across worker threads.
#[derive(Debug)]
pub struct Coverage<'s> {
    scene: &'s Scene,
    model: PropagationModel<'s>,
    config: AggregatorConfig,
    gain_mode: GainMode,
    focus: Option<&'s AccessPoint>,
}

impl<'s> Coverage<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Self {
            scene,
            model: PropagationModel::new(scene),
            config: AggregatorConfig::default(),
            gain_mode: GainMode::Directional,
            focus: None,
        }
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_gain_mode(mut self, gain_mode: GainMode) -> Self {
        self.gain_mode = gain_mode;
        self
    }

    /// Treats the named AP as the server everywhere, if it exists and is enabled.
    pub fn with_focus(mut self, ap_id: Option<&str>) -> Self {
        self.focus = ap_id.and_then(|id| {
            let ap = self.scene.access_point(id).filter(|ap| ap.enabled);
            if ap.is_none() {
                log::debug!("focus AP '{}' is missing or disabled; using best server", id);
            }
            ap
        });
        self
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn gain_mode(&self) -> GainMode {
        self.gain_mode
    }

    pub fn noise_floor_dbm(&self) -> f64 {
        self.scene.propagation.noise_floor_dbm
    }

    /// Power received at `point` from a single AP, dBm.
    pub fn received_power(&self, ap: &AccessPoint, point: &Point) -> f64 {
        let gain = self
            .scene
            .patterns
            .gain(ap, point, &self.scene.propagation, self.gain_mode);
        self.model.received_power(ap, gain, point)
    }

    /// Strongest enabled AP at `point`; ties keep the earlier AP.
    pub fn best_server(&self, point: &Point) -> ServingSignal<'s> {
        let mut best = ServingSignal {
            ap: None,
            rssi_dbm: self.config.no_server_rssi_dbm,
        };
        for ap in self.scene.enabled_aps() {
            let rssi = self.received_power(ap, point);
            if best.ap.is_none() || rssi > best.rssi_dbm {
                best = ServingSignal {
                    ap: Some(ap),
                    rssi_dbm: rssi,
                };
            }
        }
        best
    }

    /// The focus AP when one is set, otherwise the best server.
    pub fn serving(&self, point: &Point) -> ServingSignal<'s> {
        match self.focus {
            Some(ap) => ServingSignal {
                ap: Some(ap),
                rssi_dbm: self.received_power(ap, point),
            },
            None => self.best_server(point),
        }
    }

    fn co_channel<'a>(&'a self, serving: &'a AccessPoint) -> impl Iterator<Item = &'s AccessPoint> + 'a {
        self.scene
            .enabled_aps()
            .filter(move |ap| ap.id != serving.id && ap.channel == serving.channel)
    }

    /// Co-channel interference at `point`, summed in milliwatts, dBm.
    pub fn cci(&self, point: &Point, serving: &AccessPoint) -> f64 {
        let (any, total_mw) = self.co_channel(serving).fold((false, 0.0), |(_, sum), ap| {
            (true, sum + dbm_to_mw(self.received_power(ap, point)))
        });
        if !any || total_mw <= 0.0 {
            self.config.cci_floor_dbm
        } else {
            mw_to_dbm(total_mw).max(self.config.cci_floor_dbm)
        }
    }

    /// Same-channel, non-serving APs received above `threshold_dbm` at `point`.
    pub fn interfering_count(&self, point: &Point, serving: &AccessPoint, threshold_dbm: f64) -> usize {
        self.co_channel(serving)
            .filter(|ap| self.received_power(ap, point) > threshold_dbm)
            .count()
    }

    pub fn snr(&self, rssi_dbm: f64) -> f64 {
        rssi_dbm - self.noise_floor_dbm()
    }

    pub fn sinr(&self, rssi_dbm: f64, cci_dbm: f64) -> f64 {
        let interference = if cci_dbm < self.config.sinr_cci_cutoff_dbm {
            0.0
        } else {
            dbm_to_mw(cci_dbm)
        };
        let noise = dbm_to_mw(self.noise_floor_dbm());
        10.0 * (dbm_to_mw(rssi_dbm) / (interference + noise).max(1e-12)).log10()
    }

    fn cci_of(&self, point: &Point, serving: &ServingSignal<'_>) -> f64 {
        serving
            .ap
            .map_or(self.config.cci_floor_dbm, |ap| self.cci(point, ap))
    }

    fn interferers_of(&self, point: &Point, serving: &ServingSignal<'_>) -> usize {
        serving.ap.map_or(0, |ap| {
            self.interfering_count(point, ap, self.config.interference_threshold_dbm)
        })
    }

    /// Value of one view mode at `point`.
    pub fn evaluate(&self, mode: ViewMode, point: &Point) -> CellSample<'s> {
        let serving = self.serving(point);
        let numeric = |value| CellSample {
            value,
            category: None,
        };
        match mode {
            ViewMode::Rssi => numeric(serving.rssi_dbm),
            ViewMode::Snr => numeric(self.snr(serving.rssi_dbm)),
            ViewMode::Sinr => numeric(self.sinr(serving.rssi_dbm, self.cci_of(point, &serving))),
            ViewMode::Throughput => numeric(throughput_from_sinr(
                self.sinr(serving.rssi_dbm, self.cci_of(point, &serving)),
            )),
            ViewMode::Cci => {
                let count = self.interferers_of(point, &serving);
                CellSample {
                    value: count as f64,
                    category: Some(Category::Count(count)),
                }
            }
            ViewMode::BestServer => CellSample {
                value: serving.rssi_dbm,
                category: Some(
                    serving
                        .ap
                        .map_or(Category::NoServer, |ap| Category::Server(ap.id.as_str())),
                ),
            },
            ViewMode::ServingChannel => CellSample {
                value: serving.rssi_dbm,
                category: Some(
                    serving
                        .channel()
                        .map_or(Category::NoServer, Category::Channel),
                ),
            },
        }
    }

    /// All point metrics at once.
    pub fn probe(&self, point: &Point) -> Probe {
        let serving = self.serving(point);
        let cci_dbm = self.cci_of(point, &serving);
        let sinr_db = self.sinr(serving.rssi_dbm, cci_dbm);
        Probe {
            point: *point,
            ap_id: serving.ap.map(|ap| ap.id.clone()),
            channel: serving.channel(),
            rssi_dbm: serving.rssi_dbm,
            snr_db: self.snr(serving.rssi_dbm),
            cci_dbm,
            sinr_db,
            interferers: self.interferers_of(point, &serving),
            throughput_mbps: throughput_from_sinr(sinr_db),
            quality: SignalQuality::from_rssi(serving.rssi_dbm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Area;

    fn ap(id: &str, x: f64, y: f64, channel: u32) -> AccessPoint {
        AccessPoint::new(id, Point::new(x, y), 15.0, 5.0, channel)
    }

    fn two_ap_scene() -> Scene {
        Scene::new(Area::default())
            .with_access_point(ap("west", 5.0, 10.0, 1))
            .with_access_point(ap("east", 25.0, 10.0, 1))
    }

    #[test]
    fn best_server_picks_nearest_equal_power_ap() {
        let scene = two_ap_scene();
        let coverage = Coverage::new(&scene);
        let best = coverage.best_server(&Point::new(8.0, 10.0));
        assert_eq!(best.ap.map(|ap| ap.id.as_str()), Some("west"));
        let expected = coverage.received_power(&scene.access_points[0], &Point::new(8.0, 10.0));
        assert_eq!(best.rssi_dbm, expected);
    }

    #[test]
    fn no_enabled_ap_yields_sentinel() {
        let scene = Scene::new(Area::default()).with_access_point(ap("a", 5.0, 5.0, 1).disabled());
        let coverage = Coverage::new(&scene);
        let best = coverage.best_server(&Point::new(1.0, 1.0));
        assert!(best.ap.is_none());
        assert_eq!(best.rssi_dbm, -200.0);
        let probe = coverage.probe(&Point::new(1.0, 1.0));
        assert_eq!(probe.cci_dbm, -200.0);
        assert_eq!(probe.interferers, 0);
        assert_eq!(probe.throughput_mbps, 0.0);
        assert_eq!(probe.quality, SignalQuality::VeryWeak);
    }

    #[test]
    fn cci_excludes_serving_and_other_channels() {
        let scene = two_ap_scene().with_access_point(ap("far", 15.0, 2.0, 6));
        let coverage = Coverage::new(&scene);
        let point = Point::new(8.0, 10.0);
        let serving = &scene.access_points[0];
        let east_only = coverage.received_power(&scene.access_points[1], &point);
        assert!((coverage.cci(&point, serving) - east_only).abs() < 1e-9);

        let lonely = &scene.access_points[2];
        assert_eq!(coverage.cci(&point, lonely), -200.0);
    }

    #[test]
    fn cci_sums_interferers_in_milliwatts_above_the_floor() {
        let scene = two_ap_scene()
            .with_access_point(ap("north", 25.0, 10.0, 1))
            .with_access_point(ap("south", 5.0, 18.0, 6));
        let coverage = Coverage::new(&scene);
        let point = Point::new(8.0, 10.0);
        let serving = &scene.access_points[0];
        let single = coverage.received_power(&scene.access_points[1], &point);
        let doubled = single + 10.0 * 2.0_f64.log10();
        assert!((coverage.cci(&point, serving) - doubled).abs() < 1e-9);

        let clamped = Coverage::new(&scene).with_config(AggregatorConfig {
            cci_floor_dbm: single + 20.0,
            ..AggregatorConfig::default()
        });
        assert_eq!(clamped.cci(&point, serving), single + 20.0);
        assert_eq!(clamped.cci(&point, &scene.access_points[3]), single + 20.0);
    }

    #[test]
    fn midpoint_counts_only_the_non_serving_ap() {
        let scene = two_ap_scene();
        let coverage = Coverage::new(&scene);
        let mid = Point::new(15.0, 10.0);
        let best = coverage.best_server(&mid);
        let serving = best.ap.unwrap();
        assert_eq!(coverage.interfering_count(&mid, serving, best.rssi_dbm - 10.0), 1);
        assert_eq!(coverage.interfering_count(&mid, serving, best.rssi_dbm + 10.0), 0);
    }

    #[test]
    fn sinr_is_below_snr_with_interference() {
        let scene = two_ap_scene();
        let coverage = Coverage::new(&scene);
        let probe = coverage.probe(&Point::new(12.0, 10.0));
        assert!(probe.sinr_db < probe.snr_db);
        assert_eq!(probe.ap_id.as_deref(), Some("west"));
        // Equal interference and noise would cost ~3 dB; here the interferer dominates.
        assert!(probe.snr_db - probe.sinr_db > 3.0);
    }

    #[test]
    fn sinr_ignores_interference_below_cutoff() {
        let scene = Scene::new(Area::default());
        let coverage = Coverage::new(&scene);
        assert!((coverage.sinr(-60.0, -200.0) - coverage.snr(-60.0)).abs() < 1e-9);
    }

    #[test]
    fn focus_ap_serves_every_point() {
        let scene = two_ap_scene();
        let coverage = Coverage::new(&scene).with_focus(Some("east"));
        let sample = coverage.evaluate(ViewMode::BestServer, &Point::new(1.0, 10.0));
        assert_eq!(sample.category, Some(Category::Server("east")));

        let unknown = Coverage::new(&scene).with_focus(Some("nope"));
        let sample = unknown.evaluate(ViewMode::BestServer, &Point::new(1.0, 10.0));
        assert_eq!(sample.category, Some(Category::Server("west")));
    }

    #[test]
    fn categorical_modes_report_keys() {
        let scene = two_ap_scene();
        let coverage = Coverage::new(&scene);
        let channel = coverage.evaluate(ViewMode::ServingChannel, &Point::new(3.0, 3.0));
        assert_eq!(channel.category, Some(Category::Channel(1)));
        let count = coverage.evaluate(ViewMode::Cci, &Point::new(15.0, 10.0));
        assert_eq!(count.category, Some(Category::Count(1)));
        assert_eq!(count.value, 1.0);
    }
}
