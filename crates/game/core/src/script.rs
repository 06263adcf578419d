//! Per-spell scripted effects.
//!
//! Script effects have no generic behaviour. A host registers a
//! [`SpellScript`] for each spell id that needs one; spells without a script
//! treat the effect as a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cast::{CastId, TargetSelector};
use crate::effect::EffectError;
use crate::env::{SpellEffect, SpellEntry, SpellId};
use crate::state::Guid;
use crate::world::World;

/// What a script sees of the cast that triggered it.
#[derive(Clone, Copy, Debug)]
pub struct ScriptContext<'a> {
    pub cast: CastId,
    pub caster: Guid,
    pub spell: &'a SpellEntry,
    pub effect: &'a SpellEffect,
    pub effect_index: usize,
    pub target: TargetSelector,
    /// Rolled base points of the effect slot.
    pub base_points: i32,
}

pub trait SpellScript: Send + Sync {
    fn on_script_effect(&self, world: &mut World, ctx: &ScriptContext<'_>)
    -> Result<(), EffectError>;
}

#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<SpellId, Arc<dyn SpellScript>>,
}

impl core::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut spells: Vec<_> = self.scripts.keys().map(|s| s.0).collect();
        spells.sort_unstable();
        f.debug_struct("ScriptRegistry")
            .field("spells", &spells)
            .finish()
    }
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `script` for `spell`, returning the script it replaced.
    pub fn register(
        &mut self,
        spell: SpellId,
        script: Arc<dyn SpellScript>,
    ) -> Option<Arc<dyn SpellScript>> {
        self.scripts.insert(spell, script)
    }

    pub fn with_script(mut self, spell: SpellId, script: Arc<dyn SpellScript>) -> Self {
        self.register(spell, script);
        self
    }

    pub fn get(&self, spell: SpellId) -> Option<Arc<dyn SpellScript>> {
        self.scripts.get(&spell).cloned()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
