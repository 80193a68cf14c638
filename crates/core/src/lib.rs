//! # SlotFinder Core
//!
//! Pure scheduling computations shared by the HTTP layer:
//!
//! - [`slots`]: free slot search over a day-aligned window of busy intervals
//! - [`filter`]: selection of records scheduled shortly after a reference instant
//! - [`time`]: timestamp parsing, rounding and rendering helpers
//! - [`clock`]: the source of "now" for callers that anchor to the current time
//!
//! Nothing in this crate performs I/O or keeps state between calls.

pub mod clock;
pub mod errors;
pub mod filter;
pub mod models;
pub mod slots;
pub mod time;

pub mod mock;
