//! Async client for the OpenRGB SDK protocol.
//!
//! [`Connection`] is the engine: one TCP stream, a background read loop and
//! per-command reply slots. [`OrgbClient`] layers the named SDK operations on
//! top and refuses those the negotiated protocol version cannot carry.
//!
//! ```no_run
//! # async fn run() -> orgb_client::Result<()> {
//! use orgb_client::{ClientConfig, OrgbClient};
//! use orgb_model::Color;
//!
//! let client = OrgbClient::connect("127.0.0.1:6742", ClientConfig::default()).await?;
//! for device in client.all_controllers().await? {
//!     let colors = vec![Color::new(0, 64, 255); device.leds.len()];
//!     client.update_leds(device.index, &colors).await?;
//! }
//! client.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
mod negotiate;

pub use client::OrgbClient;
pub use config::{ClientConfig, DEFAULT_CLIENT_NAME, DEFAULT_NEGOTIATION_TIMEOUT};
pub use connection::{Connection, ConnectionState, DeviceListUpdated};
pub use error::{ClientError, Result};
