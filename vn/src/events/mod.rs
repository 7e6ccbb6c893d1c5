//! Scheduler event publishing
//!
//! Observers (the CLI event stream, other views) subscribe to the bus
//! instead of polling shared state for changes.

mod bus;
mod types;

pub use bus::{EventBus, DEFAULT_CHANNEL_CAPACITY};
pub use types::Event;
