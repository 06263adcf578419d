//! Outbound notifications.
//!
//! Everything the engine tells the outside world is a [`Notification`]
//! wrapped in an [`Envelope`] naming the characters in visibility range.
//! Delivery is fire-and-forget; the host drains the outbox after each step.

use crate::aura::AuraId;
use crate::cast::{CastId, TargetSelector};
use crate::env::{AuraType, ItemId, PowerType, SpellId, SpellSchools, WorldLocation};
use crate::math::Vec3;
use crate::state::{Guid, InventoryError, ItemPush, StandState};
use crate::timer::GameTime;

/// Reason code carried by cast failure notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellCastResult {
    CastOkay,
    FailedTooClose,
    FailedOutOfRange,
    FailedLineOfSight,
    FailedUnitNotInfront,
    FailedNoPower,
    FailedItemNotFound,
    FailedSpellInProgress,
    FailedBadTargets,
    FailedCasterDead,
    Interrupted,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notification {
    SpellStart {
        cast: CastId,
        caster: Guid,
        spell: SpellId,
        target: TargetSelector,
        cast_time: u64,
    },
    SpellGo {
        cast: CastId,
        caster: Guid,
        /// Item guid when cast from an item, otherwise the caster.
        caster_of_record: Guid,
        spell: SpellId,
        target: TargetSelector,
        triggered: bool,
    },
    CastFailed {
        cast: CastId,
        caster: Guid,
        spell: SpellId,
        reason: SpellCastResult,
    },
    SpellDamageLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        school: SpellSchools,
        damage: u32,
        absorbed: u32,
        resisted: u32,
        blocked: u32,
        critical: bool,
    },
    SpellMiss {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        outcome: crate::combat::HitOutcome,
    },
    PeriodicAuraLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        aura_type: AuraType,
        amount: u32,
    },
    HealLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        amount: u32,
        critical: bool,
    },
    EnergizeLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        power_type: PowerType,
        amount: u32,
    },
    ItemPushResult {
        owner: Guid,
        push: ItemPush,
    },
    InventoryChangeFailure {
        owner: Guid,
        item: ItemId,
        error: InventoryError,
    },
    DispelLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        removed: Vec<SpellId>,
    },
    StealLog {
        caster: Guid,
        target: Guid,
        spell: SpellId,
        stolen: SpellId,
    },
    AuraApplied {
        target: Guid,
        caster: Guid,
        spell: SpellId,
        aura: AuraId,
    },
    AuraRemoved {
        target: Guid,
        spell: SpellId,
        aura: AuraId,
    },
    UnitDied {
        unit: Guid,
        killer: Option<Guid>,
    },
    Teleported {
        unit: Guid,
        location: WorldLocation,
    },
    TransferPending {
        unit: Guid,
        map: u32,
    },
    ChargeStarted {
        unit: Guid,
        destination: Vec3,
        arrival: GameTime,
    },
    CreatureSummoned {
        summoner: Guid,
        unit: Guid,
        entry: u32,
    },
    ObjectStateChanged {
        object: Guid,
        state: u8,
    },
    LootOpened {
        looter: Guid,
        object: Guid,
        items: Vec<(ItemId, u16)>,
    },
    ObjectInteraction {
        unit: Guid,
        object: Guid,
    },
    StandStateChanged {
        unit: Guid,
        state: StandState,
    },
    AttackStart {
        attacker: Guid,
        victim: Guid,
    },
    ComboPoints {
        unit: Guid,
        target: Guid,
        points: u8,
    },
    DuelRequested {
        challenger: Guid,
        target: Guid,
    },
    HomeBound {
        unit: Guid,
        location: WorldLocation,
    },
    QuestCompleted {
        unit: Guid,
        quest: u32,
    },
    ProficiencyChanged {
        unit: Guid,
        item_class: u32,
        mask: u32,
    },
}

impl Notification {
    /// Short name used in logs and event topics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpellStart { .. } => "spell_start",
            Self::SpellGo { .. } => "spell_go",
            Self::CastFailed { .. } => "cast_failed",
            Self::SpellDamageLog { .. } => "spell_damage_log",
            Self::SpellMiss { .. } => "spell_miss",
            Self::PeriodicAuraLog { .. } => "periodic_aura_log",
            Self::HealLog { .. } => "heal_log",
            Self::EnergizeLog { .. } => "energize_log",
            Self::ItemPushResult { .. } => "item_push_result",
            Self::InventoryChangeFailure { .. } => "inventory_change_failure",
            Self::DispelLog { .. } => "dispel_log",
            Self::StealLog { .. } => "steal_log",
            Self::AuraApplied { .. } => "aura_applied",
            Self::AuraRemoved { .. } => "aura_removed",
            Self::UnitDied { .. } => "unit_died",
            Self::Teleported { .. } => "teleported",
            Self::TransferPending { .. } => "transfer_pending",
            Self::ChargeStarted { .. } => "charge_started",
            Self::CreatureSummoned { .. } => "creature_summoned",
            Self::ObjectStateChanged { .. } => "object_state_changed",
            Self::LootOpened { .. } => "loot_opened",
            Self::ObjectInteraction { .. } => "object_interaction",
            Self::StandStateChanged { .. } => "stand_state_changed",
            Self::AttackStart { .. } => "attack_start",
            Self::ComboPoints { .. } => "combo_points",
            Self::DuelRequested { .. } => "duel_requested",
            Self::HomeBound { .. } => "home_bound",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::ProficiencyChanged { .. } => "proficiency_changed",
        }
    }

    /// True for cast lifecycle notifications (start, go, failure).
    pub fn is_cast_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::SpellStart { .. } | Self::SpellGo { .. } | Self::CastFailed { .. }
        )
    }
}

/// A notification plus the characters it is addressed to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub at: GameTime,
    /// Object the notification is fanned out from.
    pub source: Guid,
    pub recipients: Vec<Guid>,
    pub notification: Notification,
}
