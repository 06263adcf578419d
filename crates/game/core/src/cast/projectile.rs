//! Projectile flight.
//!
//! A completed cast with a nonzero spell speed and a unit target flies
//! towards that target. The impact countdown is re-aimed every time the
//! target moves: the projectile's current position is interpolated along the
//! leg it was flying, and a new leg starts from there.

use tracing::debug;

use crate::state::UnitSignal;
use crate::timer::GameTime;
use crate::world::{TimerEvent, World};

use super::{CastId, CastPhase, Projectile};

/// Flight time in ms for `distance` units at `speed` units per second.
pub fn travel_time(distance: f32, speed: f32) -> GameTime {
    if speed <= 0.0 {
        return 0;
    }
    (distance / speed * 1000.0) as GameTime
}

impl World {
    /// Launches a projectile, or applies the effects right away when the
    /// flight would be too short to matter.
    pub(crate) fn launch_or_apply(&mut self, id: CastId) {
        let Some(cast) = self.casts.get(&id) else {
            return;
        };
        let speed = cast.spell.speed;
        let caster = cast.caster;
        let target = cast.target_unit().filter(|t| *t != caster);

        let flight = match (speed > 0.0, target) {
            (true, Some(target)) => self
                .units
                .get(&caster)
                .zip(self.units.get(&target))
                .map(|(c, t)| (target, c.position, travel_time(c.position.distance(t.position), speed))),
            _ => None,
        };

        match flight {
            Some((target, origin, travel)) if travel >= self.config.projectile_min_travel_ms => {
                let start = self.clock;
                let end = start + travel;
                let Some(cast) = self.casts.get_mut(&id) else {
                    return;
                };
                cast.phase = CastPhase::InFlight;
                cast.projectile = Some(Projectile {
                    target,
                    origin,
                    start,
                    end,
                });
                cast.impact
                    .set_end(&mut self.timers, end, TimerEvent::ProjectileImpact(id));
                self.subscribe(id, target, UnitSignal::Moved);
                self.subscribe(id, target, UnitSignal::Killed);
                self.subscribe(id, target, UnitSignal::Despawned);
                debug!(cast = %id, target = %target, travel, "projectile launched");
            }
            _ => self.apply_all_effects(id),
        }
    }

    /// The projectile's target moved away from `old_position`.
    pub(crate) fn retarget_projectile(&mut self, id: CastId, old_position: crate::math::Vec3) {
        let now = self.clock;
        let min_travel = self.config.projectile_min_travel_ms;
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        if !cast.impact.is_running(&self.timers) {
            return;
        }
        let Some(projectile) = cast.projectile.as_mut() else {
            return;
        };
        let Some(target) = self.units.get(&projectile.target) else {
            return;
        };

        let position = projectile.origin.lerp(old_position, projectile.progress(now));
        let travel = travel_time(target.position.distance(position), cast.spell.speed);
        projectile.origin = position;
        projectile.start = now;
        projectile.end = now + travel;

        if travel >= min_travel {
            cast.impact
                .set_end(&mut self.timers, now + travel, TimerEvent::ProjectileImpact(id));
            debug!(cast = %id, travel, "projectile re-aimed");
        } else {
            cast.impact.cancel(&mut self.timers);
            self.on_projectile_impact(id);
        }
    }

    pub(crate) fn on_projectile_impact(&mut self, id: CastId) {
        let Some(cast) = self.casts.get_mut(&id) else {
            return;
        };
        cast.phase = CastPhase::Complete;
        self.unsubscribe_all(id);
        debug!(cast = %id, "projectile impact");
        self.apply_all_effects(id);
        self.release_cast(id);
    }
}
