//! onmain core
//!
//! Deferred field writes for objects shared across threads:
//! - Field descriptors (`Field`, `field!`)
//! - Dispatch queues (`DispatchQueue`, `MainLoopQueue`, `ChannelQueue`)
//! - The deferred accessor and the `DeferrableOwner` capability
//! - Settings for the main queue
//!
//! # Usage
//!
//! ```ignore
//! use onmain_core::{field, shared, DeferExt, DeferrableOwner};
//!
//! struct Status { text: String }
//! impl DeferrableOwner for Status {}
//!
//! let status = shared(Status { text: String::new() });
//! std::thread::spawn({
//!     let status = status.clone();
//!     move || status.set_on_main().set(field!(Status, text), "done".to_string())
//! });
//! // ... the main thread pumps `onmain_core::default_main_loop()` each frame
//! ```

pub mod accessor;
pub mod error;
pub mod field;
pub mod main_queue;
pub mod owner;
pub mod queue;
pub mod settings;

pub use accessor::DeferredAccessor;
pub use error::{DispatchError, SettingsError};
pub use field::Field;
pub use main_queue::{default_main_loop, install_main_queue, main_queue};
pub use owner::{shared, DeferExt, DeferrableOwner, Shared};
#[cfg(feature = "tokio")]
pub use queue::{ChannelQueue, JobReceiver};
pub use queue::{DispatchQueue, Job, MainLoopQueue, QueueHandle};
pub use settings::DispatchSettings;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
