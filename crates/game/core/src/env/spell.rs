//! Declarative spell and effect definitions.

use std::sync::Arc;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::GameConfig;
use crate::math::Vec3;

/// Identifier of a spell entry in the static tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpellId(pub u32);

impl core::fmt::Display for SpellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Primary spell attribute bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellAttributes: u32 {
        const ON_NEXT_SWING = 0x0000_0004;
        const ON_NEXT_SWING_2 = 0x0000_0400;
        const PASSIVE = 0x0000_0040;
    }
}

bitflags! {
    /// Secondary spell attribute bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellAttributesEx: u32 {
        const NO_THREAT = 0x0000_0400;
        const REQ_COMBO_POINTS = 0x0010_0000;
        const MELEE_COMBAT_START = 0x0000_0200;
    }
}

bitflags! {
    /// Damage school mask.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellSchools: u8 {
        const NORMAL = 0x01;
        const HOLY = 0x02;
        const FIRE = 0x04;
        const NATURE = 0x08;
        const FROST = 0x10;
        const SHADOW = 0x20;
        const ARCANE = 0x40;
    }
}

impl SpellSchools {
    /// Index of the lowest school in the mask (0 = physical).
    pub fn index(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.bits().trailing_zeros() as usize).min(GameConfig::MAX_SCHOOLS - 1)
    }

    pub fn is_physical(self) -> bool {
        self.index() == 0
    }
}

bitflags! {
    /// Conditions that interrupt auras of a spell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AuraInterruptFlags: u32 {
        const NOT_SEATED = 0x0004_0000;
    }
}

/// Resource pool consumed or restored by spells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerType {
    #[default]
    Mana,
    Rage,
    Focus,
    Energy,
    Happiness,
    Health,
}

impl PowerType {
    /// Index into a unit's power arrays. Health is tracked separately.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Mana => Some(0),
            Self::Rage => Some(1),
            Self::Focus => Some(2),
            Self::Energy => Some(3),
            Self::Happiness => Some(4),
            Self::Health => None,
        }
    }

    /// Maps an effect misc value onto a power pool.
    pub const fn from_misc(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Mana),
            1 => Some(Self::Rage),
            2 => Some(Self::Focus),
            3 => Some(Self::Energy),
            4 => Some(Self::Happiness),
            -2 => Some(Self::Health),
            _ => None,
        }
    }
}

/// Kind of a spell effect slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    #[default]
    None,
    InstantKill,
    SchoolDamage,
    Dummy,
    TeleportUnits,
    ApplyAura,
    PowerDrain,
    Heal,
    Bind,
    QuestComplete,
    WeaponDamageNoSchool,
    CreateItem,
    Energize,
    WeaponPercentDamage,
    TriggerSpell,
    OpenLock,
    OpenLockItem,
    Proficiency,
    Summon,
    Dispel,
    WeaponDamage,
    AddComboPoints,
    Duel,
    PowerBurn,
    ApplyAreaAuraParty,
    ScriptEffect,
    AttackMe,
    NormalizedWeaponDmg,
    StealBeneficialBuff,
    Charge,
}

/// Aura behaviours understood by the aura container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraType {
    #[default]
    Dummy,
    PeriodicDamage,
    PeriodicHeal,
    PeriodicLeech,
    PeriodicEnergize,
    SchoolAbsorb,
    ModStun,
    ModRoot,
    ModDecreaseSpeed,
    ModIncreaseSpeed,
    ModStat,
    ModResistance,
    ModDamageDone,
}

impl AuraType {
    /// Periodic auras whose magnitude scales with the caster's spell power.
    pub const fn is_modified_by_bonus(self) -> bool {
        matches!(
            self,
            Self::PeriodicDamage | Self::PeriodicHeal | Self::PeriodicLeech
        )
    }

    pub const fn is_periodic(self) -> bool {
        matches!(
            self,
            Self::PeriodicDamage | Self::PeriodicHeal | Self::PeriodicLeech | Self::PeriodicEnergize
        )
    }

    const fn is_harmful(self) -> bool {
        matches!(
            self,
            Self::PeriodicDamage
                | Self::PeriodicLeech
                | Self::ModStun
                | Self::ModRoot
                | Self::ModDecreaseSpeed
        )
    }
}

/// Which units an effect slot is applied to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTarget {
    /// The selection the cast was issued against.
    #[default]
    Selected,
    /// Always the caster.
    Caster,
    /// Units around the caster within the effect radius (the caster included
    /// for friendly effects).
    CasterArea,
}

/// Destination selector for teleport effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    #[default]
    None,
    /// Character bind point.
    Home,
    /// Location stored on the spell entry.
    Database,
    /// The caster's own location.
    Caster,
}

/// Map, position and orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldLocation {
    pub map: u32,
    pub position: Vec3,
    pub orientation: f32,
}

/// One declarative effect slot of a spell.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellEffect {
    pub kind: EffectKind,
    pub base_points: i32,
    pub die_sides: i32,
    pub base_dice: i32,
    pub dice_per_level: f32,
    pub points_per_level: f32,
    pub points_per_combo_point: f32,
    pub misc_value_a: i32,
    pub misc_value_b: i32,
    pub aura: AuraType,
    /// Periodic tick interval in ms.
    pub amplitude: u32,
    pub radius: f32,
    pub multiple_value: f32,
    pub item_type: u32,
    pub summon_unit: u32,
    pub trigger_spell: Option<SpellId>,
    pub target_a: EffectTarget,
    pub target_b: Destination,
}

/// Static definition of a spell.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellEntry {
    pub id: SpellId,
    pub name: String,
    pub school: SpellSchools,
    pub attributes: SpellAttributes,
    pub attributes_ex: SpellAttributesEx,
    pub power_type: PowerType,
    pub cost: u32,
    /// Cost as a percentage of base health/mana; used when `cost` is zero.
    pub cost_pct: u32,
    pub min_range: f32,
    pub max_range: f32,
    /// Projectile speed in units per second; zero for instant impact.
    pub speed: f32,
    /// Cast time in ms used when the caller doesn't override it.
    pub cast_time: u64,
    /// Aura duration in ms; zero or negative means permanent.
    pub duration: i32,
    pub base_level: u32,
    pub max_level: u32,
    pub spell_level: u32,
    /// Requires the target to be in front of the caster.
    pub facing: bool,
    pub cooldown: u64,
    pub category: u32,
    pub category_cooldown: u64,
    pub item_class: u32,
    pub item_subclass_mask: u32,
    pub aura_interrupt_flags: AuraInterruptFlags,
    pub dispel_type: u32,
    pub effects: ArrayVec<SpellEffect, { GameConfig::MAX_SPELL_EFFECTS }>,
    pub additional_spells: Vec<SpellId>,
    pub target_location: Option<WorldLocation>,
}

impl SpellEntry {
    pub fn new(id: SpellId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            school: SpellSchools::NORMAL,
            ..Self::default()
        }
    }

    /// Builder: append an effect slot.
    ///
    /// # Panics
    ///
    /// Panics if the entry already has the maximum number of effects.
    pub fn with_effect(mut self, effect: SpellEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_passive(&self) -> bool {
        self.attributes.contains(SpellAttributes::PASSIVE)
    }

    pub fn is_on_next_swing(&self) -> bool {
        self.attributes
            .intersects(SpellAttributes::ON_NEXT_SWING | SpellAttributes::ON_NEXT_SWING_2)
    }

    pub fn no_threat(&self) -> bool {
        self.attributes_ex.contains(SpellAttributesEx::NO_THREAT)
    }

    pub fn has_range(&self) -> bool {
        self.min_range != 0.0 || self.max_range != 0.0
    }

    /// Whether the aura created by `effect` counts as a buff.
    pub fn is_positive_effect(&self, effect: &SpellEffect) -> bool {
        if effect.target_a == EffectTarget::Caster {
            return true;
        }
        !effect.aura.is_harmful()
    }
}

impl SpellEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Builder: flat base points.
    pub fn with_points(mut self, base_points: i32) -> Self {
        self.base_points = base_points;
        self
    }

    /// Builder: random dice range on top of the base points.
    pub fn with_dice(mut self, base_dice: i32, die_sides: i32) -> Self {
        self.base_dice = base_dice;
        self.die_sides = die_sides;
        self
    }

    pub fn with_aura(mut self, aura: AuraType) -> Self {
        self.aura = aura;
        self
    }

    pub fn with_misc(mut self, misc_value_a: i32) -> Self {
        self.misc_value_a = misc_value_a;
        self
    }

    pub fn with_target(mut self, target: EffectTarget) -> Self {
        self.target_a = target;
        self
    }
}

/// Read access to the spell table.
pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<Arc<SpellEntry>>;

    /// Every spell sharing `category` (used to propagate category cooldowns).
    fn category_spells(&self, category: u32) -> &[SpellId];
}
