//! Topic-based event bus for runtime events.
//!
//! The world worker publishes every drained notification and cast-ended
//! signal here; consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CastEndedEvent, NotificationEvent, WorldEvent};
