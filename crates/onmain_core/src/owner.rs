//! Owner capability
//!
//! Types opt in with an empty `impl DeferrableOwner for T {}` and then get
//! `set_on_main()` / `defer_on(queue)` on their shared handle.

use crate::accessor::DeferredAccessor;
use crate::queue::QueueHandle;
use std::sync::{Arc, RwLock};

/// Shared, mutable owner handle.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap `value` in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Marker for types whose fields may be written through a deferred accessor.
pub trait DeferrableOwner: Send + Sync + 'static {}

/// Accessor constructors for shared owners.
///
/// Every call builds a new accessor; nothing is cached on the owner.
pub trait DeferExt<Root> {
    /// Accessor bound to the current main queue.
    ///
    /// Writes through it are not applied immediately; they land when the
    /// main loop next pumps its queue.
    fn set_on_main(&self) -> DeferredAccessor<Root>;

    /// Accessor bound to `queue`.
    fn defer_on(&self, queue: QueueHandle) -> DeferredAccessor<Root>;
}

impl<Root: DeferrableOwner> DeferExt<Root> for Shared<Root> {
    fn set_on_main(&self) -> DeferredAccessor<Root> {
        DeferredAccessor::on_main(self)
    }

    fn defer_on(&self, queue: QueueHandle) -> DeferredAccessor<Root> {
        DeferredAccessor::new(self, queue)
    }
}
