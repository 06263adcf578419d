//! Bridges the world's synchronous `ended` signal to the event bus.

use std::sync::{Arc, Mutex};

use spell_core::{CastEnded, CastObserver, World};
use tracing::warn;

/// Buffers ended signals raised inside a world step so the worker can
/// publish them after the step's notifications.
#[derive(Debug, Default)]
pub(crate) struct EndedForwarder {
    pending: Mutex<Vec<CastEnded>>,
}

impl EndedForwarder {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn drain(&self) -> Vec<CastEnded> {
        match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl CastObserver for EndedForwarder {
    fn on_cast_ended(&self, _world: &mut World, ended: &CastEnded) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push(*ended),
            Err(poisoned) => {
                warn!(cast = %ended.cast, "ended buffer poisoned");
                poisoned.into_inner().push(*ended);
            }
        }
    }
}
