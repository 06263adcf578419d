//! Spell cast resolution for a single world instance.
//!
//! `spell-core` owns the rules that take a cast from the moment a unit
//! starts it until its effects land: the per-caster cast slot, cast timers,
//! target validation at completion, projectile travel, melee swing
//! attachment, effect dispatch, and aura ticking. All state lives in a
//! [`World`], driven by its clock; hosts feed it requests and unit events and
//! drain the notifications it leaves in its outbox.
//!
//! Static content is reached through the oracle traits in [`env`], so the
//! same world runs against bundled tables, a content directory, or test
//! fixtures.
pub mod aura;
pub mod cast;
pub mod combat;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod math;
pub mod script;
pub mod state;
pub mod timer;
pub mod world;

pub use aura::{Aura, AuraContainer, AuraId};
pub use cast::{
    ActiveCast, CastEnded, CastError, CastFailure, CastId, CastObserver, CastPhase, CastRequest,
    SwingOutcome, TargetSelector,
};
pub use combat::{AttackContext, AttackRoll, AttackTable, HitOutcome, ResolutionMode};
pub use config::GameConfig;
pub use effect::{DISPATCH_ORDER, EffectError};
pub use env::{
    AuraType, CreatureEntry, CreatureOracle, Destination, EffectKind, EffectTarget, GameData,
    GameDataOracle, ItemEntry, ItemId, ItemOracle, MapOracle, PowerType, SpellEffect, SpellEntry,
    SpellId, SpellOracle, SpellSchools, WorldLocation,
};
pub use error::{ErrorSeverity, GameError};
pub use math::Vec3;
pub use script::{ScriptContext, ScriptRegistry, SpellScript};
pub use state::{Character, GameObject, GameObjectKind, Guid, Inventory, Unit};
pub use timer::GameTime;
pub use world::{Envelope, Notification, SpellCastResult, World, WorkItem};
