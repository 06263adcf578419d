//! World worker that owns the authoritative [`spell_core::World`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), applies
//! them to the world, drives the clock, and publishes whatever the world
//! emitted to the [`EventBus`] after every step.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spell_core::{
    CastError, CastId, CastRequest, GameTime, Guid, SwingOutcome, Unit, Vec3, World,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::events::{CastEndedEvent, Event, EventBus, NotificationEvent, WorldEvent};

use super::EndedForwarder;

/// Commands that can be sent to the world worker.
pub(crate) enum Command {
    StartCast {
        request: CastRequest,
        reply: oneshot::Sender<Result<CastId, CastError>>,
    },
    StopCast {
        caster: Guid,
        reply: oneshot::Sender<bool>,
    },
    MoveUnit {
        guid: Guid,
        position: Vec3,
        orientation: f32,
        reply: oneshot::Sender<bool>,
    },
    AttackSwing {
        attacker: Guid,
        reply: oneshot::Sender<SwingOutcome>,
    },
    SpawnUnit {
        unit: Box<Unit>,
        reply: oneshot::Sender<Guid>,
    },
    KillUnit {
        guid: Guid,
        killer: Option<Guid>,
        reply: oneshot::Sender<bool>,
    },
    Despawn {
        guid: Guid,
        reply: oneshot::Sender<Option<Unit>>,
    },
    /// Advance the clock by `ms`; replies with the new time.
    Advance {
        ms: u64,
        reply: oneshot::Sender<GameTime>,
    },
    QueryUnit {
        guid: Guid,
        reply: oneshot::Sender<Option<Unit>>,
    },
    QueryClock {
        reply: oneshot::Sender<GameTime>,
    },
    Shutdown,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::StartCast { .. } => "start_cast",
            Command::StopCast { .. } => "stop_cast",
            Command::MoveUnit { .. } => "move_unit",
            Command::AttackSwing { .. } => "attack_swing",
            Command::SpawnUnit { .. } => "spawn_unit",
            Command::KillUnit { .. } => "kill_unit",
            Command::Despawn { .. } => "despawn",
            Command::Advance { .. } => "advance",
            Command::QueryUnit { .. } => "query_unit",
            Command::QueryClock { .. } => "query_clock",
            Command::Shutdown => "shutdown",
        }
    }
}

/// Background task that processes world commands.
pub(crate) struct WorldWorker {
    world: World,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    ended: Arc<EndedForwarder>,
    tick_interval: Option<Duration>,
}

impl WorldWorker {
    pub(crate) fn new(
        world: World,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        ended: Arc<EndedForwarder>,
        tick_interval: Option<Duration>,
    ) -> Self {
        info!(
            units = world.units().count(),
            tick_ms = tick_interval.map(|d| d.as_millis() as u64),
            "WorldWorker initialized"
        );
        Self {
            world,
            command_rx,
            event_bus,
            ended,
            tick_interval,
        }
    }

    /// Main worker loop. Exits on [`Command::Shutdown`] or once every
    /// handle is dropped.
    pub(crate) async fn run(mut self) {
        let mut ticker = self.tick_interval.map(|period| {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let step_ms = self
            .tick_interval
            .map_or(0, |period| period.as_millis() as u64);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    if matches!(cmd, Command::Shutdown) {
                        debug!("WorldWorker shutting down");
                        break;
                    }
                    self.handle_command(cmd);
                }
                _ = next_tick(&mut ticker) => {
                    self.world.advance(step_ms);
                }
            }
            self.publish_outbox();
        }
        self.publish_outbox();
    }

    fn handle_command(&mut self, cmd: Command) {
        let name = cmd.name();
        trace!(command = name, "handling command");
        let delivered = match cmd {
            Command::StartCast { request, reply } => {
                reply.send(self.world.start_cast(request)).is_ok()
            }
            Command::StopCast { caster, reply } => reply.send(self.world.stop_cast(caster)).is_ok(),
            Command::MoveUnit {
                guid,
                position,
                orientation,
                reply,
            } => reply
                .send(self.world.move_unit(guid, position, orientation))
                .is_ok(),
            Command::AttackSwing { attacker, reply } => {
                reply.send(self.world.attack_swing(attacker)).is_ok()
            }
            Command::SpawnUnit { unit, reply } => {
                let guid = self.world.spawn_unit(*unit);
                self.event_bus.publish(Event::World(WorldEvent::UnitSpawned {
                    guid,
                    at: self.world.clock(),
                }));
                reply.send(guid).is_ok()
            }
            Command::KillUnit {
                guid,
                killer,
                reply,
            } => reply.send(self.world.kill_unit(guid, killer)).is_ok(),
            Command::Despawn { guid, reply } => {
                let removed = self.world.despawn(guid);
                if removed.is_some() {
                    self.event_bus.publish(Event::World(WorldEvent::UnitDespawned {
                        guid,
                        at: self.world.clock(),
                    }));
                }
                reply.send(removed).is_ok()
            }
            Command::Advance { ms, reply } => {
                self.world.advance(ms);
                let now = self.world.clock();
                self.event_bus
                    .publish(Event::World(WorldEvent::ClockAdvanced { now }));
                reply.send(now).is_ok()
            }
            Command::QueryUnit { guid, reply } => reply.send(self.world.unit(guid).cloned()).is_ok(),
            Command::QueryClock { reply } => reply.send(self.world.clock()).is_ok(),
            Command::Shutdown => true,
        };
        if !delivered {
            debug!(command = name, "reply channel closed (caller dropped)");
        }
    }

    /// Publishes the drained outbox, then the ended signals of the step.
    fn publish_outbox(&mut self) {
        let emitted_at = Utc::now();
        for envelope in self.world.drain_notifications() {
            self.event_bus
                .publish(Event::Notification(NotificationEvent {
                    envelope,
                    emitted_at,
                }));
        }
        let at = self.world.clock();
        for ended in self.ended.drain() {
            self.event_bus
                .publish(Event::CastEnded(CastEndedEvent { ended, at }));
        }
    }
}

/// Resolves on the next interval tick; never resolves with a manual clock.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
