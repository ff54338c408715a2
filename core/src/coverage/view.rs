use serde::{Deserialize, Serialize};

/// Quantity a raster or point query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ViewMode {
    #[default]
    Rssi,
    Snr,
    Sinr,
    /// Number of same-channel interferers above the interference threshold.
    Cci,
    #[serde(rename = "thr")]
    Throughput,
    #[serde(rename = "best")]
    BestServer,
    #[serde(rename = "servch")]
    ServingChannel,
}

impl ViewMode {
    pub const ALL: [ViewMode; 7] = [
        ViewMode::Rssi,
        ViewMode::Snr,
        ViewMode::Sinr,
        ViewMode::Cci,
        ViewMode::Throughput,
        ViewMode::BestServer,
        ViewMode::ServingChannel,
    ];

    /// Resolves a mode name; unknown names fall back to RSSI.
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .unwrap_or_else(|| {
                log::warn!("unknown view mode '{}', using rssi", name);
                ViewMode::Rssi
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Rssi => "rssi",
            ViewMode::Snr => "snr",
            ViewMode::Sinr => "sinr",
            ViewMode::Cci => "cci",
            ViewMode::Throughput => "thr",
            ViewMode::BestServer => "best",
            ViewMode::ServingChannel => "servch",
        }
    }

    /// Modes colored per discrete key rather than along a gradient.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            ViewMode::Cci | ViewMode::BestServer | ViewMode::ServingChannel
        )
    }

    /// Default legend range `(min, max)` for the mode.
    pub fn default_legend(self) -> (f64, f64) {
        match self {
            ViewMode::Rssi | ViewMode::BestServer | ViewMode::ServingChannel => (-100.0, -30.0),
            ViewMode::Snr => (0.0, 40.0),
            ViewMode::Sinr | ViewMode::Cci => (-10.0, 40.0),
            ViewMode::Throughput => (0.0, 80.0),
        }
    }
}

impl From<String> for ViewMode {
    fn from(name: String) -> Self {
        ViewMode::from_name(&name)
    }
}
