//! # linky_tic
//!
//! Linky TIC (Télé-information Client) historic-mode decoder for Rust.
//!
//! French residential electricity meters broadcast their measurements as
//! TIC frames on a serial line. Bridges such as ESP boards forward those
//! frames inside UDP datagrams. This crate decodes them into labeled
//! measurements, validating every line independently.
//!
//! ## Features
//!
//! - **Per-line validation**: a corrupted line is dropped, the rest of the frame is kept
//! - **Stateless decoder**: one datagram in, one [`TicFrame`] out, never a panic
//! - **Event-driven listener**: UDP reception via tokio and channels
//! - **Sensor registry**: create-or-update records with typed values
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linky_tic::{ListenerConfig, SensorRegistry, TicEvent, TicListener};
//!
//! #[tokio::main]
//! async fn main() -> linky_tic::Result<()> {
//!     let mut listener = TicListener::new(ListenerConfig::new().port(8095));
//!     let mut events = listener.subscribe().expect("first subscriber");
//!     listener.bind().await?;
//!
//!     tokio::spawn(async move { listener.run().await });
//!
//!     let mut registry = SensorRegistry::new();
//!     while let Some(event) = events.recv().await {
//!         if let TicEvent::Frame { frame, .. } = event {
//!             for update in registry.apply(&frame) {
//!                 println!("{:?}", update);
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol Overview
//!
//! A historic-mode frame is a sequence of data lines between STX and ETX:
//!
//! ```text
//! +-----+-----+-------+----+-------+----+----------+-----+-- ... --+-----+
//! | STX | LF  | LABEL | SP | VALUE | SP | CHECKSUM | CR  |   ...   | ETX |
//! |0x02 |0x0A |       |0x20|       |0x20|          |0x0D |         |0x03 |
//! +-----+-----+-------+----+-------+----+----------+-----+-- ... --+-----+
//! ```
//!
//! The checksum character is `(sum(LABEL SP VALUE) & 0x3F) + 0x20`.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checksum;
pub mod codec;
pub mod error;
pub mod listener;
pub mod parser;
pub mod registry;
pub mod types;

// Re-export main types
pub use checksum::ChecksumScope;
pub use codec::TicCodec;
pub use error::{Result, TicError};
pub use listener::{
    parse_port, ListenerConfig, ListenerState, TicEvent, TicListener, DEFAULT_PORT,
};
pub use parser::{decode, decode_frame, parse_frame, parse_line, DecodeOptions, LeniencyPolicy};
pub use registry::{label_info, LabelInfo, Sensor, SensorRegistry, SensorUpdate};
pub use types::*;
