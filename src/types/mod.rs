//! TIC historic-mode type definitions.
//!
//! This module contains the core types produced by the decoder:
//!
//! - `Measurement` - One validated label/value pair
//! - `TicFrame` - Ordered label to measurement mapping for one frame
//! - `DecodeStats` - Per-frame line bookkeeping
//! - `TicValue` - Typed view of a measurement value
//! - Label and framing constants

mod frame;
mod label;
mod value;

pub use frame::*;
pub use label::*;
pub use value::*;
