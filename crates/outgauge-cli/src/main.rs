//! outgauge - print live OutGauge telemetry
//!
//! Binds a UDP socket, prints one line per received OutGauge packet and shuts
//! the listener down cleanly on Ctrl-C or SIGTERM.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod output;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use outgauge_listener::{DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, ListenerConfig, OutGaugeListener};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "outgauge")]
#[command(about = "Print live OutGauge telemetry (Live for Speed, BeamNG.drive) received over UDP")]
#[command(version)]
struct Cli {
    /// IP address to listen on
    #[arg(default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    ip: IpAddr,

    /// UDP port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Records buffered for the terminal before new ones are dropped
    #[arg(
        long,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    capacity: usize,

    /// Print each record as a JSON object
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let addr = SocketAddr::new(cli.ip, cli.port);
    let config = ListenerConfig::new(addr).with_queue_capacity(cli.capacity);
    let mut listener = OutGaugeListener::start_with_config(config)
        .await
        .with_context(|| format!("could not listen on {addr}"))?;
    println!("Listening to {}", listener.local_addr());

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            record = listener.recv() => match record {
                Some(record) => output::print_record(&record, cli.json),
                None => {
                    warn!("OutGauge listener stopped receiving");
                    break;
                }
            },
            signal = &mut shutdown => {
                signal?;
                break;
            }
        }
    }

    listener.close().await?;
    let stats = listener.stats();
    info!(
        received = stats.datagrams_received,
        delivered = stats.records_delivered,
        lost = stats.lost(),
        "Listener closed"
    );
    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("outgauge={log_level},outgauge_listener={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Resolves on SIGINT/SIGTERM (Ctrl-C on Windows).
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("failed to wait for Ctrl-C")?;
        info!("Received Ctrl-C");
    }

    Ok(())
}
