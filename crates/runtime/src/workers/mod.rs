//! Background tasks owned by the runtime.

mod observer;
mod simulation;

pub(crate) use observer::EndedForwarder;
pub(crate) use simulation::{Command, WorldWorker};
