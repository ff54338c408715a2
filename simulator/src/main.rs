use anyhow::{bail, Context};
use clap::Parser;
use covcore::coverage::ViewMode;
use covcore::propagation::ModelVariant;
use covcore::raster::{RefreshMode, ViewRequest};
use report::model::CoverageReport;
use report::writer::{write_heatmap, write_report};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline coverage planning driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Area width in meters for a generated scenario
    #[arg(long, default_value_t = 30.0)]
    width: f64,
    /// Area height in meters for a generated scenario
    #[arg(long, default_value_t = 20.0)]
    height: f64,
    #[arg(long, default_value_t = 4)]
    aps: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// View mode: rssi, snr, sinr, cci, thr, best or servch
    #[arg(long, default_value = "rssi")]
    mode: String,
    #[arg(long)]
    cell_size: Option<f64>,
    /// Propagation model: p25d or p525
    #[arg(long)]
    model: Option<String>,
    /// Stop after the fast pass
    #[arg(long, default_value_t = false)]
    interactive: bool,
    /// Write the JSON report here, overriding the workflow
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the PNG heatmap here, overriding the workflow
    #[arg(long)]
    heatmap: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let mut view = ViewRequest::new(ViewMode::from_name(&args.mode));
        if let Some(cell_size) = args.cell_size {
            view.cell_size = cell_size;
        }
        WorkflowConfig::from_args(args.width, args.height, args.aps, args.seed, view)
    };
    if let Some(model) = &args.model {
        workflow_config.propagation.model = ModelVariant::from_name(model);
    }
    if args.interactive {
        workflow_config.refresh = RefreshMode::Interactive;
    }
    if args.report.is_some() {
        workflow_config.output.report = args.report.clone();
    }
    if args.heatmap.is_some() {
        workflow_config.output.heatmap = args.heatmap.clone();
    }

    let runner = Runner::new(workflow_config);
    let scheduler = runner.scheduler()?;

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for raster refinement")?;
    let result: anyhow::Result<WorkflowResult> = runtime.block_on(async {
        tokio::select! {
            result = runner.execute(&scheduler) => result,
            interrupt = signal::ctrl_c() => {
                interrupt.context("awaiting Ctrl+C")?;
                scheduler.cancel();
                bail!("interrupted before the raster was complete");
            }
        }
    });
    let result = result?;

    let report = CoverageReport::from_result(&result);
    println!("{}", report.summary());
    for probe in &report.probes {
        println!(
            "probe ({:.1}, {:.1}) -> {} ch {} rssi {:.1} dBm snr {:.1} dB sinr {:.1} dB interferers {} thr {:.1} Mbps",
            probe.point.x,
            probe.point.y,
            probe.ap_id.as_deref().unwrap_or("none"),
            probe.channel.map_or_else(|| "-".to_string(), |ch| ch.to_string()),
            probe.rssi_dbm,
            probe.snr_db,
            probe.sinr_db,
            probe.interferers,
            probe.throughput_mbps
        );
    }

    let output = &runner.config().output;
    if let Some(path) = &output.report {
        write_report(&report, path)?;
    }
    if let Some(path) = &output.heatmap {
        write_heatmap(&result.raster, path)?;
    }

    Ok(())
}
