//! Async host for one spell-engine world instance.
//!
//! A [`Runtime`] owns a [`spell_core::World`] on a dedicated tokio task and
//! drives its clock either from a real-time interval or from explicit
//! `advance` commands. Clients talk to it through a cloneable
//! [`RuntimeHandle`] and receive everything the world emits on a topic-based
//! [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder, and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps the world task internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{CastEndedEvent, Event, EventBus, NotificationEvent, Topic, WorldEvent};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
