//! Process-wide main queue
//!
//! The main queue is an injectable handle: it starts out as a
//! [`MainLoopQueue`] the host pumps from its frame loop, and can be swapped
//! for any other [`DispatchQueue`](crate::queue::DispatchQueue) with
//! [`install_main_queue`].

use crate::queue::{MainLoopQueue, QueueHandle};
use crate::settings::DispatchSettings;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

static DEFAULT_MAIN_LOOP: Lazy<MainLoopQueue> =
    Lazy::new(|| MainLoopQueue::from_settings(&DispatchSettings::default()));

static MAIN_QUEUE: Lazy<RwLock<QueueHandle>> =
    Lazy::new(|| RwLock::new(Arc::new(DEFAULT_MAIN_LOOP.clone())));

/// Queue that `set_on_main` accessors dispatch to.
///
/// Unless the host installs its own queue, this is [`default_main_loop`],
/// and the host must pump it or queued writes pile up without bound.
pub fn main_queue() -> QueueHandle {
    MAIN_QUEUE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the main queue, returning the previous one.
///
/// Accessors built earlier keep the queue they were built with.
pub fn install_main_queue(queue: QueueHandle) -> QueueHandle {
    let mut current = MAIN_QUEUE.write().unwrap_or_else(PoisonError::into_inner);
    tracing::debug!(from = current.label(), to = queue.label(), "main queue replaced");
    std::mem::replace(&mut *current, queue)
}

/// The built-in main loop queue, for the thread acting as main to pump.
///
/// Only receives jobs while it is the installed main queue. A host that
/// keeps it installed must pump it regularly (e.g. once per frame);
/// nothing else drains it.
pub fn default_main_loop() -> MainLoopQueue {
    DEFAULT_MAIN_LOOP.clone()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static MAIN_QUEUE_TESTS: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch the process-wide main queue.
    pub(crate) fn lock_main_queue() -> MutexGuard<'static, ()> {
        MAIN_QUEUE_TESTS.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
