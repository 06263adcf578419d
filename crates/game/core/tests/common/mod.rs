#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::RngCore;
use spell_core::{
    AttackContext, AttackRoll, AttackTable, CastEnded, CastObserver, Character, GameConfig,
    GameData, Guid, HitOutcome, Notification, PowerType, ScriptRegistry, Unit, Vec3, World,
};

pub const MAGE: Guid = Guid(1);
pub const WOLF: Guid = Guid(2);

/// Attack table that hands out queued rolls, then plain hits.
#[derive(Debug, Default)]
pub struct ScriptedTable {
    rolls: Mutex<VecDeque<AttackRoll>>,
}

impl ScriptedTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, outcome: HitOutcome) {
        self.rolls
            .lock()
            .unwrap()
            .push_back(AttackRoll::new(outcome, 0.0));
    }
}

impl AttackTable for ScriptedTable {
    fn resolve(&self, _ctx: &AttackContext<'_>, _rng: &mut dyn RngCore) -> AttackRoll {
        self.rolls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(AttackRoll::normal)
    }
}

/// Records every `ended` signal.
#[derive(Debug, Default)]
pub struct EndedLog {
    pub ended: Mutex<Vec<CastEnded>>,
}

impl EndedLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<CastEnded> {
        self.ended.lock().unwrap().clone()
    }

    pub fn successes(&self) -> usize {
        self.all().iter().filter(|e| e.success).count()
    }

    pub fn failures(&self) -> usize {
        self.all().iter().filter(|e| !e.success).count()
    }
}

impl CastObserver for EndedLog {
    fn on_cast_ended(&self, _world: &mut World, ended: &CastEnded) {
        self.ended.lock().unwrap().push(*ended);
    }
}

pub struct Harness {
    pub world: World,
    pub table: Arc<ScriptedTable>,
    pub log: Arc<EndedLog>,
}

impl Harness {
    /// World with a player mage at the origin and a hostile wolf 10 yards
    /// east of it.
    pub fn new(data: GameData) -> Self {
        Self::with_scripts(data, ScriptRegistry::new())
    }

    pub fn with_scripts(data: GameData, scripts: ScriptRegistry) -> Self {
        let table = ScriptedTable::new();
        let log = EndedLog::new();
        let mut world = World::new(GameConfig::default(), Arc::new(data))
            .with_attack_table(table.clone())
            .with_observer(log.clone())
            .with_scripts(scripts)
            .with_seed(42);
        world.spawn_unit(mage());
        world.spawn_unit(wolf(Vec3::new(10.0, 0.0, 0.0)));
        Self { world, table, log }
    }

    pub fn health(&self, guid: Guid) -> u32 {
        self.world.unit(guid).map_or(0, |u| u.health)
    }

    pub fn mana(&self, guid: Guid) -> u32 {
        self.world
            .unit(guid)
            .map_or(0, |u| u.power(PowerType::Mana))
    }

    /// Drains the outbox and keeps the notifications matching `pred`.
    pub fn take(&mut self, pred: impl Fn(&Notification) -> bool) -> Vec<Notification> {
        self.world
            .drain_notifications()
            .into_iter()
            .map(|e| e.notification)
            .filter(|n| pred(n))
            .collect()
    }
}

pub fn mage() -> Unit {
    Unit::new(MAGE, "Jaina", 60)
        .with_faction(1)
        .with_health(500)
        .with_power(PowerType::Mana, 1000)
        .with_character(Character::default())
}

pub fn wolf(position: Vec3) -> Unit {
    Unit::new(WOLF, "Timber Wolf", 60)
        .with_faction(2)
        .with_health(300)
        .with_position(position, 0.0)
}
