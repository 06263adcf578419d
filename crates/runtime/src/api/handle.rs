//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the world or streaming events from specific topics.

use std::collections::HashMap;

use spell_core::{CastId, CastRequest, GameTime, Guid, SwingOutcome, Unit, Vec3};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Sends a command built around a fresh reply channel and awaits the reply.
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Starts a cast. Synchronous rejections surface as [`RuntimeError::Cast`].
    pub async fn start_cast(&self, request: CastRequest) -> Result<CastId> {
        let result = self
            .request(|reply| Command::StartCast { request, reply })
            .await?;
        Ok(result?)
    }

    /// Interrupts the caster's in-progress cast. Returns whether one was stopped.
    pub async fn stop_cast(&self, caster: Guid) -> Result<bool> {
        self.request(|reply| Command::StopCast { caster, reply })
            .await
    }

    pub async fn move_unit(&self, guid: Guid, position: Vec3, orientation: f32) -> Result<bool> {
        self.request(|reply| Command::MoveUnit {
            guid,
            position,
            orientation,
            reply,
        })
        .await
    }

    /// Reports a weapon swing so a pending on-next-swing cast can fire.
    pub async fn attack_swing(&self, attacker: Guid) -> Result<SwingOutcome> {
        self.request(|reply| Command::AttackSwing { attacker, reply })
            .await
    }

    /// Adds a unit; a `Guid::NONE` guid is replaced by a fresh one.
    pub async fn spawn_unit(&self, unit: Unit) -> Result<Guid> {
        self.request(|reply| Command::SpawnUnit {
            unit: Box::new(unit),
            reply,
        })
        .await
    }

    pub async fn kill_unit(&self, guid: Guid, killer: Option<Guid>) -> Result<bool> {
        self.request(|reply| Command::KillUnit {
            guid,
            killer,
            reply,
        })
        .await
    }

    pub async fn despawn(&self, guid: Guid) -> Result<Option<Unit>> {
        self.request(|reply| Command::Despawn { guid, reply })
            .await
    }

    /// Advances the world clock by `ms` and returns the new time.
    pub async fn advance(&self, ms: u64) -> Result<GameTime> {
        self.request(|reply| Command::Advance { ms, reply })
            .await
    }

    /// Snapshot of one unit.
    pub async fn query_unit(&self, guid: Guid) -> Result<Option<Unit>> {
        self.request(|reply| Command::QueryUnit { guid, reply })
            .await
    }

    pub async fn clock(&self) -> Result<GameTime> {
        self.request(|reply| Command::QueryClock { reply }).await
    }

    /// Asks the worker to stop after the commands already queued.
    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Cast` - Cast start/success/failure and ended signals
    /// - `Topic::Combat` - Every other world notification
    /// - `Topic::World` - Spawns, despawns and manual clock advances
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
