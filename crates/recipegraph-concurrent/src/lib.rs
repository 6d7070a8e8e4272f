//! Concurrency primitives for RecipeGraph worker pools
//!
//! - `signal`: fire-once cancellation flag observed by every worker
//! - `work_queue`: shared batch queue (FIFO) or stack (LIFO) with in-flight
//!   tracking so an idle monitor can tell an exhausted frontier from a busy one

pub mod signal;
pub mod work_queue;

pub use signal::CancellationSignal;
pub use work_queue::{Discipline, WorkQueue};
