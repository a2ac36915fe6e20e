//! SweeTrivia dispenser host: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  axum router    I2cTransport /       TokioDelay          │
//! │  (HTTP API)     SimulatedTransport   LogEventSink        │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          DispenseService (handshake logic)         │  │
//! │  │  bus lock · lease · bounded ack polling            │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use sweetrivia_dispenser::adapters::log_sink::LogEventSink;
use sweetrivia_dispenser::adapters::process::{Narrator, QuestionBankRefresher};
use sweetrivia_dispenser::adapters::simulated::SimulatedTransport;
use sweetrivia_dispenser::adapters::time::TokioDelay;
use sweetrivia_dispenser::app::ports::DispenseTransport;
use sweetrivia_dispenser::app::service::DispenseService;
use sweetrivia_dispenser::config::HostConfig;
use sweetrivia_dispenser::http::{self, HttpState};

/// SweeTrivia candy dispenser host
///
/// Relays kiosk dispense requests to the candy MCU over I2C.
#[derive(Parser, Debug)]
#[command(name = "sweetrivia-dispenser")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// I2C bus index (overrides config)
    #[arg(long)]
    bus_index: Option<u8>,

    /// Delay between acknowledgment polls in ms (overrides config)
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Poll budget before timing out (overrides config)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Use the in-memory dispenser instead of the I2C bus
    #[arg(long)]
    simulate: bool,

    /// Poll on which the simulated dispenser acknowledges (0 = never)
    #[arg(long, default_value_t = 3)]
    simulate_ack_after: u32,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn load_config(&self) -> Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => HostConfig::default(),
        };

        if let Some(addr) = self.listen {
            config.server.listen_addr = addr;
        }
        if let Some(idx) = self.bus_index {
            config.dispenser.bus_index = idx;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.dispenser.poll_interval_ms = ms;
        }
        if let Some(n) = self.max_attempts {
            config.dispenser.max_attempts = n;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("SweeTrivia dispenser v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load_config()?;
    info!(
        "I2C bus {} addr 0x{:02X}, poll every {} ms, {} attempts",
        config.dispenser.bus_index,
        config.dispenser.device_address,
        config.dispenser.poll_interval_ms,
        config.dispenser.max_attempts
    );

    if cli.simulate {
        warn!("Simulated dispenser: acks after {} polls", cli.simulate_ack_after);
        return run(config, SimulatedTransport::new(cli.simulate_ack_after)).await;
    }

    #[cfg(feature = "hardware")]
    {
        use sweetrivia_dispenser::adapters::i2c::{I2cTransport, LinuxBusOpener};

        let transport = I2cTransport::new(
            LinuxBusOpener,
            config.dispenser.bus_index,
            config.dispenser.device_address,
        );
        run(config, transport).await
    }

    #[cfg(not(feature = "hardware"))]
    {
        anyhow::bail!("built without the `hardware` feature; run with --simulate")
    }
}

async fn run<T: DispenseTransport>(config: HostConfig, transport: T) -> Result<()> {
    let dispenser = DispenseService::new(
        transport,
        TokioDelay,
        config.dispenser.retry_policy(),
        Box::new(LogEventSink::new()),
    );
    let policy = dispenser.policy();
    info!(
        "Ack budget: {} polls every {:?} ({:?} total)",
        policy.max_attempts(),
        policy.interval(),
        policy.budget()
    );
    let state = HttpState {
        dispenser: Arc::new(dispenser),
        narrator: Arc::new(Narrator::new(config.narration.clone())),
        questions: Arc::new(QuestionBankRefresher::new(config.question_bank.clone())),
    };

    http::serve(config.server.listen_addr, state)
        .await
        .context("HTTP server failed")
}
