use crate::env::SpellSchools;

use super::{Aura, AuraId};

/// Result of routing damage through absorb auras.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbsorbResult {
    pub absorbed: u32,
    /// Absorb auras whose pool ran dry; their removal goes through the
    /// world work queue.
    pub depleted: Vec<AuraId>,
}

/// Per-unit store of active auras in application order.
///
/// Structural removal while other code walks the list must be posted to the
/// world work queue; the container itself only offers the primitive
/// operations.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraContainer {
    auras: Vec<Aura>,
}

impl AuraContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.auras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aura> {
        self.auras.iter()
    }

    pub fn get(&self, id: AuraId) -> Option<&Aura> {
        self.auras.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AuraId) -> Option<&mut Aura> {
        self.auras.iter_mut().find(|a| a.id == id)
    }

    /// Adds an aura. An aura of the same spell, effect slot and caster is
    /// replaced and returned so the caller can cancel its timers.
    pub fn add(&mut self, aura: Aura) -> Option<Aura> {
        let existing = self.auras.iter().position(|a| {
            a.spell == aura.spell && a.effect_index == aura.effect_index && a.caster == aura.caster
        });
        match existing {
            Some(index) => Some(core::mem::replace(&mut self.auras[index], aura)),
            None => {
                self.auras.push(aura);
                None
            }
        }
    }

    pub fn remove(&mut self, id: AuraId) -> Option<Aura> {
        let index = self.auras.iter().position(|a| a.id == id)?;
        Some(self.auras.remove(index))
    }

    /// Most recently applied aura of `dispel_type` with the given polarity,
    /// skipping the ids in `taken`. Removal is up to the caller.
    pub fn peek_back(&self, dispel_type: u32, positive: bool, taken: &[AuraId]) -> Option<&Aura> {
        self.auras.iter().rev().find(|a| {
            a.dispel_type == dispel_type && a.positive == positive && !taken.contains(&a.id)
        })
    }

    pub fn ids(&self) -> Vec<AuraId> {
        self.auras.iter().map(|a| a.id).collect()
    }

    /// Soaks up to `damage` with absorb auras, oldest first.
    pub fn consume_absorb(&mut self, damage: u32, school: SpellSchools) -> AbsorbResult {
        let mut result = AbsorbResult::default();
        let mut left = damage;
        for aura in self.auras.iter_mut() {
            if left == 0 {
                break;
            }
            if !aura.absorbs(school) {
                continue;
            }
            let soaked = left.min(aura.remaining);
            aura.remaining -= soaked;
            left -= soaked;
            result.absorbed += soaked;
            if aura.remaining == 0 {
                result.depleted.push(aura.id);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AuraType, SpellId};
    use crate::state::Guid;

    fn aura(id: u64, spell: u32, dispel: u32, positive: bool) -> Aura {
        let mut a = Aura::new(AuraId(id), SpellId(spell), AuraType::Dummy, Guid(1), Guid(2));
        a.dispel_type = dispel;
        a.positive = positive;
        a
    }

    fn shield(id: u64, pool: u32, mask: i32) -> Aura {
        let mut a = Aura::new(AuraId(id), SpellId(17), AuraType::SchoolAbsorb, Guid(1), Guid(2));
        a.effect_index = id as u8;
        a.remaining = pool;
        a.misc_value = mask;
        a
    }

    #[test]
    fn peek_back_takes_latest_matching_polarity() {
        let mut c = AuraContainer::new();
        c.add(aura(1, 10, 1, true));
        c.add(aura(2, 11, 1, false));
        c.add(aura(3, 12, 1, true));
        c.add(aura(4, 13, 2, true));

        assert_eq!(c.peek_back(1, true, &[]).map(|a| a.id), Some(AuraId(3)));
        assert_eq!(c.peek_back(1, true, &[AuraId(3)]).map(|a| a.id), Some(AuraId(1)));
        assert!(c.peek_back(1, true, &[AuraId(1), AuraId(3)]).is_none());
        assert_eq!(c.peek_back(1, false, &[]).map(|a| a.id), Some(AuraId(2)));
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn add_replaces_same_spell_and_caster() {
        let mut c = AuraContainer::new();
        assert!(c.add(aura(1, 10, 0, true)).is_none());
        let replaced = c.add(aura(2, 10, 0, true));
        assert_eq!(replaced.map(|a| a.id), Some(AuraId(1)));
        assert_eq!(c.ids(), vec![AuraId(2)]);
    }

    #[test]
    fn absorb_drains_oldest_shield_first() {
        let mut c = AuraContainer::new();
        c.add(shield(1, 30, 0));
        c.add(shield(2, 50, 0));

        let r = c.consume_absorb(45, SpellSchools::FIRE);
        assert_eq!(r.absorbed, 45);
        assert_eq!(r.depleted, vec![AuraId(1)]);
        assert_eq!(c.get(AuraId(2)).map(|a| a.remaining), Some(35));
    }

    #[test]
    fn absorb_respects_school_mask() {
        let mut c = AuraContainer::new();
        c.add(shield(1, 100, SpellSchools::FROST.bits() as i32));
        assert_eq!(c.consume_absorb(40, SpellSchools::FIRE).absorbed, 0);
        assert_eq!(c.consume_absorb(40, SpellSchools::FROST).absorbed, 40);
    }
}
