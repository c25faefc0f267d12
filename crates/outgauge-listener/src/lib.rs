//! OutGauge UDP telemetry listener.
//!
//! OutGauge is the dashboard telemetry protocol of Live for Speed, also spoken
//! by BeamNG.drive: one 96-byte little-endian UDP datagram per sample carrying
//! speed, RPM, gear, pedal positions and dashboard lights.
//!
//! ## Modules
//! - `layout` - Byte offsets of every packet field
//! - `flags` - `StatusFlags` / `DashLights` bit sets and the compiled flag layout
//! - `packet` - `decode` and the `TelemetryRecord` it produces
//! - `listener` - `OutGaugeListener`, the background receiver and its bounded queue
//! - `config` - `ListenerConfig`
//! - `stats` - `ListenerStats` counters
//!
//! ## Features
//! - `beamng-layout` - compile the reduced BeamNG.drive bit layout instead of
//!   the full Live for Speed one
//! - `serde` - `Serialize`/`Deserialize` for records, flag sets and stats
//!
//! # Usage
//!
//! ```rust,no_run
//! use outgauge_listener::{ListenerConfig, OutGaugeListener};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), outgauge_listener::ListenerError> {
//! let config = ListenerConfig::default().with_queue_capacity(32);
//! let mut listener = OutGaugeListener::start_with_config(config).await?;
//! if let Some(record) = listener.recv().await {
//!     println!("{} rpm, lights: {}", record.rpm, record.active_lights);
//! }
//! listener.close().await?;
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod config;
pub mod error;
pub mod flags;
pub mod layout;
pub mod listener;
pub mod packet;
pub mod stats;

pub use config::{DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, ListenerConfig};
pub use error::{DecodeError, ListenerError};
pub use flags::{DashLights, FLAG_LAYOUT, FlagLayout, StatusFlags};
pub use layout::PACKET_SIZE;
pub use listener::{ListenerState, OutGaugeListener, TelemetryReceiver};
pub use packet::{TelemetryRecord, decode};
pub use stats::ListenerStats;
