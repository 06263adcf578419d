//! Event payloads for each topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spell_core::{CastEnded, Envelope, GameTime, Guid};

/// One drained outbox entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub envelope: Envelope,
    /// Wall-clock time the worker published the entry.
    pub emitted_at: DateTime<Utc>,
}

/// A cast stopped being in progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CastEndedEvent {
    pub ended: CastEnded,
    /// World clock at the end of the step that ended the cast.
    pub at: GameTime,
}

/// Instance-level changes made through the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    UnitSpawned { guid: Guid, at: GameTime },
    UnitDespawned { guid: Guid, at: GameTime },
    /// Published for explicit `advance` commands only, not interval ticks.
    ClockAdvanced { now: GameTime },
}
