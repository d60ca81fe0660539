//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the toolkit is in use.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
