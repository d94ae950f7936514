//! Inter-call pacing for the Scheherazade narrative pipeline.
//!
//! The pipeline generates segments strictly sequentially; the only rate
//! control it needs is a fixed minimum delay between consecutive model
//! calls, shared process-wide.

mod pacer;

pub use pacer::{Pacer, PacingConfig};
