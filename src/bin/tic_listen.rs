//! `tic-listen`: receive Linky TIC frames over UDP and log sensor updates.

use std::net::IpAddr;

use clap::{Parser, ValueEnum};
use linky_tic::{
    parse_port, ChecksumScope, DecodeOptions, LeniencyPolicy, ListenerConfig, SensorRegistry,
    SensorUpdate, TicEvent, TicListener, DEFAULT_PORT,
};
use tracing::{error, info, warn};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.as_filter().into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

fn port_arg(value: &str) -> Result<u16, String> {
    parse_port(value).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "tic-listen", version, about = "Linky TIC UDP listener")]
struct Cli {
    /// UDP port to listen on.
    #[arg(long, short, default_value_t = DEFAULT_PORT, value_parser = port_arg)]
    port: u16,

    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Accept PTEC/OPTARIF lines with a bad or missing checksum.
    #[arg(long)]
    lenient: bool,

    /// Include the separator before the checksum in the checksum sum.
    #[arg(long)]
    include_separator: bool,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

impl Cli {
    fn listener_config(&self) -> ListenerConfig {
        let mut options = DecodeOptions::new();
        if self.lenient {
            options = options.leniency(LeniencyPolicy::TariffLabels);
        }
        if self.include_separator {
            options = options.checksum_scope(ChecksumScope::IncludeSeparator);
        }

        ListenerConfig::new()
            .bind_ip(self.bind)
            .port(self.port)
            .decode_options(options)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    if let Err(err) = run(cli).await {
        error!(error = %err, "tic-listen failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> linky_tic::Result<()> {
    let mut listener = TicListener::new(cli.listener_config());
    let mut events = listener.subscribe().ok_or(linky_tic::TicError::ChannelClosed)?;
    listener.bind().await?;

    let shutdown = listener.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
        }
        shutdown.cancel();
    });

    let receiver = tokio::spawn(async move { listener.run().await });

    let mut registry = SensorRegistry::new();
    while let Some(event) = events.recv().await {
        match event {
            TicEvent::Listening { local_addr } => info!(%local_addr, "Listening for TIC frames"),
            TicEvent::Frame { source, frame } => {
                info!(%source, measurements = frame.len(), "TIC frame");
                for update in registry.apply(&frame) {
                    log_update(&update);
                }
            }
            TicEvent::Empty { source } => warn!(%source, "No valid TIC data in datagram"),
            TicEvent::Error(message) => warn!(%message, "Receive error"),
            TicEvent::Stopped => break,
        }
    }

    match receiver.await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "Listener task failed");
            Ok(())
        }
    }
}

fn log_update(update: &SensorUpdate) {
    match update {
        SensorUpdate::Created { label, value } => {
            let info = linky_tic::label_info(label);
            info!(label = %label, name = %info.name, unit = info.unit.unwrap_or(""), %value, "New sensor");
        }
        SensorUpdate::Changed {
            label,
            previous,
            value,
        } => info!(label = %label, %previous, %value, "Sensor changed"),
        SensorUpdate::Unchanged { .. } => {}
    }
}
