// accessor.rs - Deferred writes through a weak owner reference
//
// Writes are posted to a queue and resolve the owner only when the job
// runs; a dropped owner turns the job into a no-op. Reads happen right
// away on the calling thread and return None once the owner is gone.

use crate::field::Field;
use crate::main_queue::main_queue;
use crate::owner::Shared;
use crate::queue::{Job, QueueHandle};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Weak `(owner, queue)` pair for posting field writes onto a queue.
///
/// Holding an accessor never keeps the owner alive. Build a fresh one
/// wherever it is needed; it is cheap and there is nothing to store.
///
/// Reads are optional rather than fatal: they see the owner's current
/// value, not any write still waiting on the queue. If the owner is in
/// hand, read the field directly instead.
pub struct DeferredAccessor<Root> {
    owner: Weak<RwLock<Root>>,
    queue: QueueHandle,
}

impl<Root> DeferredAccessor<Root>
where
    Root: Send + Sync + 'static,
{
    pub fn new(owner: &Shared<Root>, queue: QueueHandle) -> Self {
        Self {
            owner: Arc::downgrade(owner),
            queue,
        }
    }

    /// Accessor targeting the current main queue.
    pub fn on_main(owner: &Shared<Root>) -> Self {
        Self::new(owner, main_queue())
    }

    /// Post `field = value` onto the queue.
    ///
    /// On an `Option` field, `None` is written through and clears the field.
    pub fn set<Value>(&self, field: Field<Root, Value>, value: Value)
    where
        Value: Send + 'static,
    {
        self.post(field.name(), move |root| {
            *field.get_mut(root) = value;
        });
    }

    /// Post `field = value` only when a value is present.
    ///
    /// `None` posts nothing and leaves the field as it is. Returns whether a
    /// write was posted.
    pub fn set_if_some<Value>(&self, field: Field<Root, Value>, value: Option<Value>) -> bool
    where
        Value: Send + 'static,
    {
        match value {
            Some(value) => {
                self.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Post a read-modify-write of one member.
    ///
    /// `f` runs while the owner's write lock is held, so it must not read
    /// the same owner through an accessor (`get`/`with`); that deadlocks.
    pub fn update<Value, F>(&self, field: Field<Root, Value>, f: F)
    where
        Value: 'static,
        F: FnOnce(&mut Value) + Send + 'static,
    {
        self.post(field.name(), move |root| f(field.get_mut(root)));
    }

    /// Read the member now, on this thread. `None` once the owner is gone.
    pub fn get<Value>(&self, field: Field<Root, Value>) -> Option<Value>
    where
        Value: Clone,
    {
        self.with(field, Value::clone)
    }

    /// Like [`get`](Self::get) without requiring `Clone`.
    pub fn with<Value, R>(&self, field: Field<Root, Value>, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let owner = self.owner.upgrade()?;
        let root = read(&owner);
        Some(f(field.get(&*root)))
    }

    pub fn is_alive(&self) -> bool {
        self.owner.strong_count() > 0
    }

    pub fn queue(&self) -> &QueueHandle {
        &self.queue
    }

    fn post(&self, field: &'static str, write: impl FnOnce(&mut Root) + Send + 'static) {
        let owner = self.owner.clone();
        let job: Job = Box::new(move || {
            let Some(owner) = owner.upgrade() else {
                tracing::debug!(field, "owner dropped before deferred write ran");
                return;
            };
            let mut root = write_lock(&owner);
            write(&mut *root);
        });

        match self.queue.dispatch(job) {
            Ok(()) => tracing::trace!(queue = self.queue.label(), field, "deferred write posted"),
            Err(err) => tracing::warn!(%err, field, "deferred write dropped"),
        }
    }
}

impl<Root> Clone for DeferredAccessor<Root> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<Root> fmt::Debug for DeferredAccessor<Root> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredAccessor")
            .field("root", &std::any::type_name::<Root>())
            .field("queue", &self.queue.label())
            .field("alive", &(self.owner.strong_count() > 0))
            .finish()
    }
}

fn read<Root>(owner: &RwLock<Root>) -> RwLockReadGuard<'_, Root> {
    owner.read().unwrap_or_else(|poisoned| {
        tracing::warn!("owner lock poisoned; reading anyway");
        poisoned.into_inner()
    })
}

fn write_lock<Root>(owner: &RwLock<Root>) -> RwLockWriteGuard<'_, Root> {
    owner.write().unwrap_or_else(|poisoned| {
        tracing::warn!("owner lock poisoned; writing anyway");
        poisoned.into_inner()
    })
}
