//! On-next-swing spells.
//!
//! A completed on-next-swing cast parks itself on the caster's swing hook.
//! The caster's next weapon swing pays the cost and applies the effects, or
//! reports why it couldn't. The hook is one-shot either way.

use tracing::debug;

use crate::state::Guid;
use crate::world::{Notification, World};

use super::{CastFailure, CastId, CastPhase};

/// Result of a weapon swing for the pending on-next-swing cast.
#[derive(Clone, Debug, PartialEq)]
pub enum SwingOutcome {
    /// No cast was waiting for this swing.
    NoCallback,
    /// The cast paid its cost and its effects were applied.
    Consumed(CastId),
    /// The cast couldn't pay; the swing proceeds as a plain attack.
    NotConsumed { cast: CastId, failure: CastFailure },
}

impl SwingOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed(_))
    }
}

impl World {
    /// Runs `attacker`'s pending on-next-swing cast, if any.
    pub fn attack_swing(&mut self, attacker: Guid) -> SwingOutcome {
        let outcome = self.run_swing_callback(attacker);
        self.flush_work();
        outcome
    }

    fn run_swing_callback(&mut self, attacker: Guid) -> SwingOutcome {
        let Some(id) = self
            .units
            .get_mut(&attacker)
            .and_then(|u| u.swing_callback.take())
        else {
            return SwingOutcome::NoCallback;
        };
        let Some(spell) = self.casts.get(&id).map(|c| c.spell.id) else {
            return SwingOutcome::NoCallback;
        };

        if let Err(failure) = self.consume_resources(id) {
            debug!(cast = %id, caster = %attacker, spell = spell.0, %failure, "swing spell not consumed");
            self.notify(
                attacker,
                Notification::CastFailed {
                    cast: id,
                    caster: attacker,
                    spell,
                    reason: failure.result_code(),
                },
            );
            self.release_cast(id);
            return SwingOutcome::NotConsumed { cast: id, failure };
        }

        self.send_cast_go(id);
        if let Some(cast) = self.casts.get_mut(&id) {
            cast.phase = CastPhase::Complete;
        }
        self.apply_all_effects(id);
        self.release_cast(id);
        SwingOutcome::Consumed(id)
    }

    /// Parks a completed cast on the caster's swing hook, replacing any
    /// cast already waiting there.
    pub(crate) fn register_swing(&mut self, id: CastId) {
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        cast.phase = CastPhase::AwaitingSwing;
        let caster = cast.caster;
        let Some(unit) = self.units.get_mut(&caster) else {
            return;
        };
        let previous = unit.swing_callback.replace(id);
        debug!(cast = %id, caster = %caster, "waiting for next swing");
        if let Some(previous) = previous
            && previous != id
        {
            self.release_cast(previous);
        }
    }
}
