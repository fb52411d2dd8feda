use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bwgraph::{
    config::{Config, LoggingConfig, SourceConfig, SourceKind},
    network::{self, CounterSource},
    terminal, ColorMap, Dashboard, EventSource, GraphRenderer, Surface,
};
use clap::Parser;
use log::info;

/// Live bar graph of download and upload rates for one network interface.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to ./bwgraph.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to watch instead of the first active one
    #[arg(short, long)]
    interface: Option<String>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Where samples come from
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SourceArg {
    Counters,
    Capture,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Counters => SourceKind::Counters,
            SourceArg::Capture => SourceKind::Capture,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(interface) = cli.interface {
        config.source.interface = Some(interface);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.source.interval_ms = interval_ms;
    }
    if let Some(source) = cli.source {
        config.source.kind = source.into();
    }
    config.validate()?;

    init_logging(&config.logging)?;

    let source = build_source(&config.source)?;
    let renderer = GraphRenderer::new(
        config.graph.download_color.as_str(),
        config.graph.upload_color.as_str(),
    );
    let surface = Surface::stdout(ColorMap::detect()).context("preparing terminal")?;

    let mut dashboard = Dashboard::new(surface, source, renderer);
    let interrupt = dashboard.handle();
    ctrlc::set_handler(move || {
        interrupt.interrupt();
    })
    .context("installing signal handler")?;
    terminal::spawn_input_reader(dashboard.handle());

    let result = dashboard.run();
    // Terminal is back to normal before anything is printed
    drop(dashboard);
    result?;
    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let Some(path) = &logging.file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&logging.level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    info!("logging to {}", path.display());
    Ok(())
}

fn build_source(config: &SourceConfig) -> Result<Box<dyn EventSource>> {
    let interface = match &config.interface {
        Some(interface) => interface.clone(),
        None => network::default_interface()?,
    };
    info!("watching {interface} via {:?}", config.kind);

    match config.kind {
        SourceKind::Counters => Ok(Box::new(CounterSource::new(interface, config.interval()))),
        #[cfg(feature = "capture")]
        SourceKind::Capture => Ok(Box::new(network::CaptureSource::new(
            interface,
            config.interval(),
        ))),
        #[cfg(not(feature = "capture"))]
        SourceKind::Capture => Err(bwgraph::GraphError::InvalidConfig {
            details: "packet capture needs bwgraph built with the `capture` feature".to_string(),
        }
        .into()),
    }
}
