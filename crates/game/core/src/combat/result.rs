//! Attack outcomes and the attack table.

use rand::{Rng, RngCore};

use crate::env::{SpellEffect, SpellEntry};
use crate::state::Unit;

use super::hit::{melee_chances, spell_miss_chance, spell_resist_pct};

/// Outcome of resolving a spell or swing against one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOutcome {
    Miss,
    Dodge,
    Parry,
    Block,
    CriticalHit,
    Crushing,
    Immune,
    #[default]
    Normal,
}

impl HitOutcome {
    /// Outcomes that cancel the effect on this target entirely.
    pub const fn is_avoided(self) -> bool {
        matches!(self, Self::Miss | Self::Dodge | Self::Parry | Self::Immune)
    }
}

/// How a spell effect is resolved against its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionMode {
    /// Heals and buffs. Buff auras can't crit.
    Beneficial { can_crit: bool },
    /// Damage and debuffs.
    Hostile,
    /// Weapon-based special attacks.
    SpecialMelee,
}

/// Outcome plus the proportional resist for one target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRoll {
    pub outcome: HitOutcome,
    /// Percent of the remaining amount resisted, in `[0, 100]`.
    pub resist_pct: f32,
}

impl AttackRoll {
    pub const fn new(outcome: HitOutcome, resist_pct: f32) -> Self {
        Self {
            outcome,
            resist_pct,
        }
    }

    pub const fn normal() -> Self {
        Self::new(HitOutcome::Normal, 0.0)
    }
}

/// Everything an attack table may look at for one caster/target pair.
#[derive(Clone, Copy, Debug)]
pub struct AttackContext<'a> {
    pub caster: &'a Unit,
    pub target: &'a Unit,
    pub spell: &'a SpellEntry,
    pub effect: &'a SpellEffect,
    pub mode: ResolutionMode,
}

/// Resolves hit outcomes for spells and special attacks.
pub trait AttackTable: Send + Sync {
    fn resolve(&self, ctx: &AttackContext<'_>, rng: &mut dyn RngCore) -> AttackRoll;
}

/// Level-based attack table.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardAttackTable {
    /// Crit chance (percent) for spells.
    pub spell_crit: f32,
}

impl StandardAttackTable {
    pub const fn new() -> Self {
        Self { spell_crit: 5.0 }
    }

    fn resolve_melee(&self, ctx: &AttackContext<'_>, rng: &mut dyn RngCore) -> HitOutcome {
        let chances = melee_chances(
            ctx.caster.level,
            ctx.target.level,
            ctx.caster.is_player(),
            ctx.target.block_value.is_some_and(|b| b > 0),
        );
        let roll: f32 = rng.gen_range(0.0..100.0);
        let table = [
            (chances.miss, HitOutcome::Miss),
            (chances.dodge, HitOutcome::Dodge),
            (chances.parry, HitOutcome::Parry),
            (chances.block, HitOutcome::Block),
            (chances.crit, HitOutcome::CriticalHit),
            (chances.crushing, HitOutcome::Crushing),
        ];
        let mut edge = 0.0;
        for (chance, outcome) in table {
            edge += chance;
            if roll < edge {
                return outcome;
            }
        }
        HitOutcome::Normal
    }
}

impl AttackTable for StandardAttackTable {
    fn resolve(&self, ctx: &AttackContext<'_>, rng: &mut dyn RngCore) -> AttackRoll {
        let school = ctx.spell.school;
        if ctx.target.immunities.intersects(school) {
            return AttackRoll::new(HitOutcome::Immune, 0.0);
        }

        match ctx.mode {
            ResolutionMode::Beneficial { can_crit } => {
                if can_crit && rng.gen_range(0.0..100.0) < self.spell_crit {
                    AttackRoll::new(HitOutcome::CriticalHit, 0.0)
                } else {
                    AttackRoll::normal()
                }
            }
            ResolutionMode::Hostile => {
                let miss = spell_miss_chance(ctx.caster.level, ctx.target.level);
                let roll: f32 = rng.gen_range(0.0..100.0);
                if roll < miss {
                    return AttackRoll::new(HitOutcome::Miss, 0.0);
                }
                let resist_pct = if school.is_physical() {
                    0.0
                } else {
                    spell_resist_pct(ctx.caster.level, ctx.target.resistances[school.index()])
                };
                let outcome = if roll < miss + self.spell_crit {
                    HitOutcome::CriticalHit
                } else {
                    HitOutcome::Normal
                };
                AttackRoll::new(outcome, resist_pct)
            }
            ResolutionMode::SpecialMelee => AttackRoll::new(self.resolve_melee(ctx, rng), 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::env::{EffectKind, SpellId, SpellSchools};
    use crate::state::Guid;

    #[test]
    fn immune_target_short_circuits() {
        let caster = Unit::new(Guid(1), "mage", 60);
        let mut target = Unit::new(Guid(2), "elemental", 60);
        target.immunities = SpellSchools::FIRE;
        let mut spell = SpellEntry::new(SpellId(133), "Fireball");
        spell.school = SpellSchools::FIRE;
        let effect = SpellEffect::new(EffectKind::SchoolDamage);
        let ctx = AttackContext {
            caster: &caster,
            target: &target,
            spell: &spell,
            effect: &effect,
            mode: ResolutionMode::Hostile,
        };

        let mut rng = StdRng::seed_from_u64(7);
        let roll = StandardAttackTable::new().resolve(&ctx, &mut rng);
        assert_eq!(roll.outcome, HitOutcome::Immune);
    }

    #[test]
    fn non_critting_buffs_are_always_normal() {
        let caster = Unit::new(Guid(1), "priest", 60);
        let target = caster.clone();
        let spell = SpellEntry::new(SpellId(1243), "Fortitude");
        let effect = SpellEffect::new(EffectKind::ApplyAura);
        let ctx = AttackContext {
            caster: &caster,
            target: &target,
            spell: &spell,
            effect: &effect,
            mode: ResolutionMode::Beneficial { can_crit: false },
        };

        let table = StandardAttackTable::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(table.resolve(&ctx, &mut rng), AttackRoll::normal());
        }
    }
}
