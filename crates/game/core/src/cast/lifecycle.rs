//! Cast state transitions: start, activate, complete, stop, release.

use tracing::{debug, trace, warn};

use crate::env::{SpellAttributesEx, SpellOracle};
use crate::math::Vec3;
use crate::state::{Guid, UnitSignal};
use crate::world::{Notification, SpellCastResult, TimerEvent, World};

use super::{
    ActiveCast, CastContext, CastEnded, CastError, CastFailure, CastId, CastPhase, CastRequest,
    TargetSelector,
};

impl World {
    // ===== public entry points =====

    /// Starts a cast.
    ///
    /// Instant casts complete before this returns, including the `ended`
    /// signal. A caster that is already casting rejects the request with
    /// [`CastError::AlreadyCasting`] unless [`CastRequest::replace`] is set,
    /// in which case the running cast is stopped first.
    pub fn start_cast(&mut self, request: CastRequest) -> Result<CastId, CastError> {
        let result = self.begin_cast(request);
        self.flush_work();
        result
    }

    /// Interrupts the cast occupying `caster`'s slot.
    pub fn stop_cast(&mut self, caster: Guid) -> bool {
        let stopped = self.interrupt_caster(caster);
        self.flush_work();
        stopped
    }

    // ===== transitions =====

    pub(crate) fn begin_cast(&mut self, request: CastRequest) -> Result<CastId, CastError> {
        self.check_caster(request.caster)?;
        let spell = self
            .data
            .spell(request.spell)
            .ok_or(CastError::UnknownSpell(request.spell))?;

        if !request.is_proc
            && let Some(current) = self.busy_cast(request.caster)
        {
            if !request.replace {
                let spell = self.casts.get(&current).map_or(request.spell, |c| c.spell.id);
                return Err(CastError::AlreadyCasting {
                    caster: request.caster,
                    spell,
                });
            }
            self.stop_cast_by_id(current);
            // An `ended` observer may have queued up another cast.
            if let Some(current) = self.busy_cast(request.caster) {
                let spell = self.casts.get(&current).map_or(request.spell, |c| c.spell.id);
                return Err(CastError::AlreadyCasting {
                    caster: request.caster,
                    spell,
                });
            }
            self.check_caster(request.caster)?;
        }

        let id = self.next_cast_id();
        let cast_time = request.cast_time.unwrap_or(spell.cast_time);
        let cast_position = self
            .units
            .get(&request.caster)
            .map_or(Vec3::ZERO, |u| u.position);
        let item_entry = request.item.and_then(|item| {
            self.units
                .get(&request.caster)
                .and_then(|u| u.character.as_ref())
                .and_then(|c| c.inventory.find(item))
                .map(|(_, stack)| stack.entry)
        });
        let announce = !spell.is_passive() && !request.is_proc;

        debug!(
            cast = %id,
            caster = %request.caster,
            spell = spell.id.0,
            cast_time,
            proc = request.is_proc,
            "cast started"
        );

        self.casts.insert(
            id,
            ActiveCast {
                id,
                caster: request.caster,
                spell: spell.clone(),
                target: request.target,
                base_points: request.base_points,
                cast_time,
                is_proc: request.is_proc,
                item: request.item,
                item_entry,
                finished: false,
                phase: CastPhase::Casting,
                started_at: self.clock,
                cast_position,
                countdown: Default::default(),
                impact: Default::default(),
                projectile: None,
                subscriptions: Vec::new(),
            },
        );
        if !request.is_proc {
            self.slots
                .entry(request.caster)
                .or_insert_with(CastContext::default)
                .begin(id);
        }

        if announce {
            self.broadcast(
                request.caster,
                Notification::SpellStart {
                    cast: id,
                    caster: request.caster,
                    spell: spell.id,
                    target: request.target,
                    cast_time,
                },
            );
        }

        self.activate(id);
        Ok(id)
    }

    fn check_caster(&self, caster: Guid) -> Result<(), CastError> {
        let unit = self
            .units
            .get(&caster)
            .ok_or(CastError::CasterNotFound(caster))?;
        if !unit.is_alive() {
            return Err(CastError::CasterDead(caster));
        }
        Ok(())
    }

    /// The caster's slotted cast, if it hasn't finished yet.
    fn busy_cast(&self, caster: Guid) -> Option<CastId> {
        let id = self.current_cast(caster)?;
        self.casts.get(&id).filter(|c| !c.finished).map(|c| c.id)
    }

    /// Starts the cast-time countdown, or completes inline for instant casts.
    fn activate(&mut self, id: CastId) {
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        if cast.cast_time == 0 {
            self.on_cast_finished(id);
            return;
        }

        let end = self.clock + cast.cast_time;
        cast.countdown
            .set_end(&mut self.timers, end, TimerEvent::CastFinished(id));
        let caster = cast.caster;
        let target = cast.target_unit().filter(|t| *t != caster);

        if let Some(target) = target
            && self.units.contains_key(&target)
        {
            self.subscribe(id, target, UnitSignal::Killed);
            self.subscribe(id, target, UnitSignal::Despawned);
        }
        self.subscribe(id, caster, UnitSignal::Moved);
    }

    /// Cast-time gate elapsed (or instant cast): validate, pay, and branch
    /// into effect application.
    pub(crate) fn on_cast_finished(&mut self, id: CastId) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let caster = cast.caster;
        let spell = cast.spell.clone();
        let is_proc = cast.is_proc;
        let target = cast.target;
        self.unsubscribe_all(id);

        if !self.units.get(&caster).is_some_and(|u| u.is_alive()) || !self.target_resolves(id) {
            debug!(cast = %id, caster = %caster, spell = spell.id.0, "cast target vanished");
            self.mark_finished(id);
            self.finish_cast(id, false);
            return;
        }

        if !is_proc && let Err(failure) = self.validate_completion(id) {
            self.fail_cast(id, failure);
            return;
        }

        self.mark_finished(id);

        if spell.is_on_next_swing() {
            self.register_swing(id);
        } else {
            if let Err(failure) = self.consume_resources(id) {
                self.fail_cast(id, failure);
                return;
            }
            self.send_cast_go(id);
            self.launch_or_apply(id);
        }

        if spell.attributes_ex.contains(SpellAttributesEx::REQ_COMBO_POINTS)
            && let Some(character) = self.units.get_mut(&caster).and_then(|u| u.character.as_mut())
        {
            character.reset_combo_points();
            self.notify(
                caster,
                Notification::ComboPoints {
                    unit: caster,
                    target: Guid::NONE,
                    points: 0,
                },
            );
        }

        if spell.attributes_ex.contains(SpellAttributesEx::MELEE_COMBAT_START) {
            self.start_melee_combat(caster, target);
        }

        // Effects may have torn this cast down already.
        if self.casts.contains_key(&id) {
            self.finish_cast(id, true);
        }
    }

    fn start_melee_combat(&mut self, caster: Guid, target: TargetSelector) {
        let victim = match target {
            TargetSelector::Unit(guid) if self.units.contains_key(&guid) => guid,
            _ => {
                warn!(caster = %caster, "no target for auto attack after spell cast");
                return;
            }
        };
        let Some(unit) = self.units.get_mut(&caster) else {
            return;
        };
        unit.victim = Some(victim);
        unit.auto_attack = true;
        self.broadcast(
            caster,
            Notification::AttackStart {
                attacker: caster,
                victim,
            },
        );
    }

    pub(crate) fn send_cast_go(&mut self, id: CastId) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        if cast.spell.is_passive() {
            return;
        }
        let notification = Notification::SpellGo {
            cast: id,
            caster: cast.caster,
            caster_of_record: cast.item.unwrap_or(cast.caster),
            spell: cast.spell.id,
            target: cast.target.resolved(cast.caster),
            triggered: cast.is_proc,
        };
        let caster = cast.caster;
        self.broadcast(caster, notification);
    }

    fn mark_finished(&mut self, id: CastId) {
        if let Some(cast) = self.casts.get_mut(&id) {
            cast.finished = true;
        }
    }

    /// Reports a completion failure and ends the cast without side effects.
    pub(crate) fn fail_cast(&mut self, id: CastId, failure: CastFailure) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let (caster, spell) = (cast.caster, cast.spell.id);
        debug!(cast = %id, caster = %caster, spell = spell.0, %failure, "cast failed");
        self.broadcast(
            caster,
            Notification::CastFailed {
                cast: id,
                caster,
                spell,
                reason: failure.result_code(),
            },
        );
        self.mark_finished(id);
        self.finish_cast(id, false);
    }

    /// Fires `ended`, then returns the slot to idle and releases the cast
    /// unless it waits on a projectile or swing.
    pub(crate) fn finish_cast(&mut self, id: CastId, success: bool) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let ended = CastEnded {
            cast: id,
            caster: cast.caster,
            spell: cast.spell.id,
            success,
        };
        self.fire_cast_ended(ended);

        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let deferred = cast.is_deferred();
        if let Some(slot) = self.slots.get_mut(&ended.caster) {
            slot.clear_if(id);
        }
        if !deferred {
            self.release_cast(id);
        }
    }

    /// Interrupts whatever occupies `caster`'s slot.
    pub(crate) fn interrupt_caster(&mut self, caster: Guid) -> bool {
        match self.current_cast(caster) {
            Some(id) => {
                self.stop_cast_by_id(id);
                true
            }
            None => false,
        }
    }

    pub(crate) fn stop_cast_by_id(&mut self, id: CastId) {
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        cast.countdown.cancel(&mut self.timers);
        let already_finished = core::mem::replace(&mut cast.finished, true);
        let (caster, spell) = (cast.caster, cast.spell.id);
        self.unsubscribe_all(id);

        if !already_finished {
            debug!(cast = %id, caster = %caster, spell = spell.0, "cast interrupted");
            self.broadcast(
                caster,
                Notification::CastFailed {
                    cast: id,
                    caster,
                    spell,
                    reason: SpellCastResult::Interrupted,
                },
            );
        }

        self.fire_cast_ended(CastEnded {
            cast: id,
            caster,
            spell,
            success: false,
        });

        if self.casts.contains_key(&id) {
            if let Some(slot) = self.slots.get_mut(&caster) {
                slot.clear_if(id);
            }
            self.release_cast(id);
        }
    }

    /// A watched target died or left the world.
    pub(crate) fn on_target_removed(&mut self, id: CastId) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        match cast.phase {
            CastPhase::InFlight => {
                debug!(cast = %id, "projectile target gone, dropping cast");
                self.release_cast(id);
            }
            CastPhase::Casting => self.stop_cast_by_id(id),
            CastPhase::AwaitingSwing | CastPhase::Complete => {}
        }
    }

    /// A watched unit moved from `old_position` to its current position.
    pub(crate) fn on_unit_moved(&mut self, id: CastId, mover: Guid, old_position: Vec3) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        if mover == cast.caster && cast.phase == CastPhase::Casting {
            if cast.finished {
                return;
            }
            let moved = self
                .units
                .get(&mover)
                .is_some_and(|u| u.position != cast.cast_position);
            if moved {
                self.stop_cast_by_id(id);
            }
        } else if cast.phase == CastPhase::InFlight
            && cast.projectile.is_some_and(|p| p.target == mover)
        {
            self.retarget_projectile(id, old_position);
        }
    }

    /// Drops a cast from the registry and detaches it from everything it
    /// was hooked into.
    pub(crate) fn release_cast(&mut self, id: CastId) {
        let Some(mut cast) = self.casts.remove(&id) else {
            return;
        };
        cast.countdown.cancel(&mut self.timers);
        cast.impact.cancel(&mut self.timers);
        for (unit, signal) in cast.subscriptions.drain(..) {
            if let Some(unit) = self.units.get_mut(&unit) {
                unit.listeners.unsubscribe(signal, id);
            }
        }
        if let Some(unit) = self.units.get_mut(&cast.caster)
            && unit.swing_callback == Some(id)
        {
            unit.swing_callback = None;
        }
        if let Some(slot) = self.slots.get_mut(&cast.caster) {
            slot.clear_if(id);
        }
        trace!(cast = %id, "cast released");
    }

    // ===== subscriptions =====

    pub(crate) fn subscribe(&mut self, id: CastId, unit: Guid, signal: UnitSignal) {
        let Some(target) = self.units.get_mut(&unit) else {
            return;
        };
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        target.listeners.subscribe(signal, id);
        if !cast.subscriptions.contains(&(unit, signal)) {
            cast.subscriptions.push((unit, signal));
        }
    }

    pub(crate) fn unsubscribe_all(&mut self, id: CastId) {
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        for (unit, signal) in cast.subscriptions.drain(..) {
            if let Some(unit) = self.units.get_mut(&unit) {
                unit.listeners.unsubscribe(signal, id);
            }
        }
    }
}
