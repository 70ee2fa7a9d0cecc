//! Dispatch queues
//!
//! A queue accepts boxed jobs and runs them later, in the order they were
//! dispatched, on whichever thread drives it. Nothing here spawns threads:
//! the host owns the loop (a frame loop, a tokio task) and pumps the queue.

#[cfg(feature = "tokio")]
mod channel;
mod main_loop;

#[cfg(feature = "tokio")]
pub use channel::{ChannelQueue, JobReceiver};
pub use main_loop::MainLoopQueue;

use crate::error::DispatchError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A deferred unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to any queue.
pub type QueueHandle = Arc<dyn DispatchQueue>;

/// A serial execution context that accepts jobs.
///
/// Implementors must run jobs in dispatch order.
pub trait DispatchQueue: Send + Sync {
    /// Human-readable name for logs.
    fn label(&self) -> &str;

    /// Enqueue `job` without running it.
    fn dispatch(&self, job: Job) -> Result<(), DispatchError>;
}

/// Run one job, containing any panic so later jobs still run.
///
/// Returns `false` if the job panicked.
pub(crate) fn run_job(label: &str, job: Job) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(()) => true,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic>".to_string());
            tracing::error!(queue = label, %message, "job panicked");
            false
        }
    }
}
