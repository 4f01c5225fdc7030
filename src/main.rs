use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use log::{info, warn};

use icstream::engine::{AcquisitionLoop, CancelToken, LoopConfig};
use icstream::hal::device_storage::{load_profile, write_example_config};
use icstream::hal::{DeviceProfile, ProfileConfig, SerialSource, SourceRegistry};
use icstream::sinks::LogSink;

#[derive(Parser, Debug)]
#[command(name = "icstream", version, about = "Stream samples from a custom acquisition IC")]
struct Args {
    /// JSON device profile
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write an example profile to PATH and exit
    #[arg(long, value_name = "PATH")]
    create_config: Option<PathBuf>,

    /// Generate synthetic data instead of opening the device
    #[arg(short, long)]
    simulate: bool,

    /// Serial port (overrides the profile)
    #[arg(short, long)]
    port: Option<String>,

    #[arg(short, long)]
    baudrate: Option<u32>,

    /// Number of channels (overrides the profile)
    #[arg(short = 'n', long)]
    channels: Option<usize>,

    /// Sample rate in Hz (overrides the profile)
    #[arg(short = 'r', long)]
    srate: Option<f64>,

    /// Stream name (overrides the profile)
    #[arg(long)]
    name: Option<String>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Log every Nth sample at debug level
    #[arg(long, default_value_t = 1000)]
    log_every: u64,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Profile from file (or defaults) with command line overrides applied
fn build_config(args: &Args) -> Result<ProfileConfig> {
    let mut config = match &args.config {
        Some(path) => load_profile(path)?.0,
        None => ProfileConfig::default(),
    };

    if args.simulate {
        config.transport.interface = "simulate".to_string();
    }
    if let Some(port) = &args.port {
        config.transport.port = port.clone();
    }
    if let Some(baudrate) = args.baudrate {
        config.transport.baudrate = baudrate;
    }
    if let Some(channels) = args.channels {
        if channels != config.num_channels {
            config.channel_names.clear();
            config.channel_types.clear();
        }
        config.num_channels = channels;
    }
    if let Some(srate) = args.srate {
        config.sample_rate = srate;
    }
    if let Some(name) = &args.name {
        config.name = name.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(path) = &args.create_config {
        write_example_config(path)?;
        info!("Example profile written to {}", path.display());
        return Ok(());
    }

    if args.list_ports {
        for port in SerialSource::list_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let config = build_config(&args)?;
    let profile = DeviceProfile::from_config(&config).context("Invalid device profile")?;

    let registry = SourceRegistry::with_defaults();
    let source = registry.create_source(&config.transport, &profile)?;
    let sink = LogSink::new(profile.metadata().name.clone(), args.log_every.max(1));

    let loop_config = LoopConfig {
        max_duration: args
            .duration
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        ..LoopConfig::default()
    };

    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, shutting down");
                signal_token.cancel();
            }
            Err(err) => warn!("Failed to listen for Ctrl-C: {}", err),
        }
    });

    let handle = tokio::task::spawn_blocking(move || {
        let mut acquisition = AcquisitionLoop::with_config(profile, source, sink, loop_config);
        acquisition.run(&cancel)
    });

    let snapshot = handle
        .await
        .context("Acquisition thread panicked")?
        .context("Acquisition stopped with an error")?;

    info!("Done: {} samples", snapshot.samples_produced);
    Ok(())
}
