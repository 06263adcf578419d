use std::collections::HashMap;

use crate::aura::AuraContainer;
use crate::cast::CastId;
use crate::config::GameConfig;
use crate::env::{CreatureEntry, PowerType, SpellId, SpellSchools};
use crate::math::Vec3;
use crate::timer::GameTime;

use super::{Character, Guid, UnitListeners};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandState {
    #[default]
    Stand,
    Sit,
}

/// Outcome of [`Unit::deal_damage`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageResult {
    /// Health actually removed.
    pub applied: u32,
    /// True if this damage killed the unit.
    pub killed: bool,
}

/// A creature or character in the world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub guid: Guid,
    pub entry: u32,
    pub name: String,
    pub level: u32,
    pub faction: u32,
    pub map: u32,
    pub position: Vec3,
    pub orientation: f32,
    pub combat_reach: f32,

    // ===== resources =====
    pub health: u32,
    pub max_health: u32,
    pub base_health: u32,
    pub power_type: PowerType,
    pub powers: [u32; GameConfig::MAX_POWERS],
    pub max_powers: [u32; GameConfig::MAX_POWERS],
    pub base_mana: u32,
    pub last_mana_use: GameTime,

    // ===== combat stats =====
    pub min_damage: f32,
    pub max_damage: f32,
    pub armor: u32,
    pub block_value: Option<u32>,
    pub resistances: [u32; GameConfig::MAX_SCHOOLS],
    pub immunities: SpellSchools,
    /// Flat spell power per school.
    pub spell_bonus: [i32; GameConfig::MAX_SCHOOLS],
    /// Percent modifier on spell output per school.
    pub spell_bonus_pct: [i32; GameConfig::MAX_SCHOOLS],

    // ===== runtime state =====
    pub auras: AuraContainer,
    pub cooldowns: HashMap<SpellId, GameTime>,
    pub threat: HashMap<Guid, f32>,
    pub victim: Option<Guid>,
    pub auto_attack: bool,
    pub stand_state: StandState,
    pub summoned_by: Option<Guid>,
    pub character: Option<Character>,
    pub listeners: UnitListeners,
    /// Cast waiting for this unit's next weapon swing.
    pub swing_callback: Option<CastId>,
}

impl Unit {
    pub fn new(guid: Guid, name: impl Into<String>, level: u32) -> Self {
        Self {
            guid,
            entry: 0,
            name: name.into(),
            level: level.max(1),
            faction: 0,
            map: 0,
            position: Vec3::ZERO,
            orientation: 0.0,
            combat_reach: 1.5,
            health: 100,
            max_health: 100,
            base_health: 100,
            power_type: PowerType::Mana,
            powers: [0; GameConfig::MAX_POWERS],
            max_powers: [0; GameConfig::MAX_POWERS],
            base_mana: 0,
            last_mana_use: 0,
            min_damage: 1.0,
            max_damage: 2.0,
            armor: 0,
            block_value: None,
            resistances: [0; GameConfig::MAX_SCHOOLS],
            immunities: SpellSchools::empty(),
            spell_bonus: [0; GameConfig::MAX_SCHOOLS],
            spell_bonus_pct: [0; GameConfig::MAX_SCHOOLS],
            auras: AuraContainer::new(),
            cooldowns: HashMap::new(),
            threat: HashMap::new(),
            victim: None,
            auto_attack: false,
            stand_state: StandState::Stand,
            summoned_by: None,
            character: None,
            listeners: UnitListeners::default(),
            swing_callback: None,
        }
    }

    /// Instantiates a creature template.
    pub fn from_creature(guid: Guid, entry: &CreatureEntry) -> Self {
        let mut unit = Self::new(guid, entry.name.clone(), entry.level)
            .with_faction(entry.faction)
            .with_health(entry.health)
            .with_power(entry.power_type, entry.power);
        unit.entry = entry.id;
        unit.min_damage = entry.min_damage;
        unit.max_damage = entry.max_damage;
        unit.armor = entry.armor;
        unit.combat_reach = entry.combat_reach;
        unit
    }

    // ===== builders =====

    pub fn with_faction(mut self, faction: u32) -> Self {
        self.faction = faction;
        self
    }

    pub fn with_position(mut self, position: Vec3, orientation: f32) -> Self {
        self.position = position;
        self.orientation = orientation;
        self
    }

    pub fn with_map(mut self, map: u32) -> Self {
        self.map = map;
        self
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self.max_health = health;
        self.base_health = health;
        self
    }

    /// Sets the primary power type and fills the pool to `max`.
    pub fn with_power(mut self, power_type: PowerType, max: u32) -> Self {
        self.power_type = power_type;
        if let Some(index) = power_type.index() {
            self.powers[index] = max;
            self.max_powers[index] = max;
        }
        if power_type == PowerType::Mana {
            self.base_mana = max;
        }
        self
    }

    pub fn with_weapon(mut self, min_damage: f32, max_damage: f32) -> Self {
        self.min_damage = min_damage;
        self.max_damage = max_damage;
        self
    }

    pub fn with_character(mut self, character: Character) -> Self {
        self.character = Some(character);
        self
    }

    // ===== queries =====

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_player(&self) -> bool {
        self.character.is_some()
    }

    pub fn combo_points(&self) -> u8 {
        self.character.as_ref().map_or(0, |c| c.combo_points)
    }

    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }

    pub fn distance_to(&self, other: &Unit) -> f32 {
        self.position.distance(other.position)
    }

    pub fn power(&self, power_type: PowerType) -> u32 {
        match power_type.index() {
            Some(index) => self.powers[index],
            None => self.health,
        }
    }

    pub fn max_power(&self, power_type: PowerType) -> u32 {
        match power_type.index() {
            Some(index) => self.max_powers[index],
            None => self.max_health,
        }
    }

    /// Sets a pool, clamped to its maximum.
    pub fn set_power(&mut self, power_type: PowerType, value: u32) {
        match power_type.index() {
            Some(index) => self.powers[index] = value.min(self.max_powers[index]),
            None => self.health = value.min(self.max_health),
        }
    }

    pub fn spell_bonus(&self, school: usize) -> i32 {
        self.spell_bonus.get(school).copied().unwrap_or(0)
    }

    pub fn spell_bonus_pct(&self, school: usize) -> i32 {
        self.spell_bonus_pct.get(school).copied().unwrap_or(0)
    }

    // ===== mutation =====

    /// Removes health. Dead units take no damage.
    pub fn deal_damage(&mut self, amount: u32) -> DamageResult {
        if !self.is_alive() {
            return DamageResult::default();
        }
        let applied = amount.min(self.health);
        self.health -= applied;
        DamageResult {
            applied,
            killed: self.health == 0,
        }
    }

    /// Restores health up to the maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let applied = amount.min(self.max_health - self.health.min(self.max_health));
        self.health += applied;
        applied
    }

    /// Adds power up to the maximum. Returns the amount added.
    pub fn energize(&mut self, power_type: PowerType, amount: u32) -> u32 {
        let current = self.power(power_type);
        let room = self.max_power(power_type).saturating_sub(current);
        let applied = amount.min(room);
        self.set_power(power_type, current + applied);
        applied
    }

    /// Armor mitigation against an attacker of `attacker_level`, capped at 75%.
    pub fn armor_reduced_damage(&self, attacker_level: u32, damage: u32) -> u32 {
        let armor = self.armor as f32;
        let reduction = armor / (armor + 400.0 + 85.0 * attacker_level as f32);
        let reduction = reduction.clamp(0.0, 0.75);
        damage - (damage as f32 * reduction) as u32
    }

    pub fn add_threat(&mut self, source: Guid, amount: f32) {
        *self.threat.entry(source).or_insert(0.0) += amount;
    }

    pub fn threat_of(&self, source: Guid) -> f32 {
        self.threat.get(&source).copied().unwrap_or(0.0)
    }

    /// Highest threat entry; ties resolve to the lowest guid.
    pub fn top_threat(&self) -> Option<(Guid, f32)> {
        self.threat
            .iter()
            .map(|(g, t)| (*g, *t))
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    pub fn cooldown_until(&self, spell: SpellId) -> GameTime {
        self.cooldowns.get(&spell).copied().unwrap_or(0)
    }

    pub fn is_on_cooldown(&self, spell: SpellId, now: GameTime) -> bool {
        self.cooldown_until(spell) > now
    }

    /// Extends a cooldown; never shortens an existing one.
    pub fn set_cooldown(&mut self, spell: SpellId, until: GameTime) {
        let entry = self.cooldowns.entry(spell).or_insert(0);
        *entry = (*entry).max(until);
    }
}
