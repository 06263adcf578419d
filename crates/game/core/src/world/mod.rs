//! World instance: the single-threaded owner of all mutable simulation state.
//!
//! A [`World`] holds units, game objects, live casts, the timer queue, and
//! the deferred work queue. Every public operation runs to completion on the
//! calling thread, drains the work queue, and leaves notifications in the
//! outbox for the host to deliver.

mod events;
mod notify;
mod visibility;

pub use events::{TimerEvent, WorkItem};
pub use notify::{Envelope, Notification, SpellCastResult};
pub use visibility::VisibilityGrid;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::aura::AuraId;
use crate::cast::{ActiveCast, CastContext, CastEnded, CastId, CastObserver};
use crate::combat::{AttackTable, StandardAttackTable};
use crate::config::GameConfig;
use crate::env::{GameDataOracle, MapOracle, OpenTerrain, SpellSchools};
use crate::math::Vec3;
use crate::script::ScriptRegistry;
use crate::state::{DamageResult, GameObject, Guid, GuidAllocator, Unit, UnitSignal};
use crate::timer::{GameTime, TimerId, TimerQueue};

pub struct World {
    pub(crate) config: GameConfig,
    pub(crate) data: Arc<dyn GameDataOracle>,
    pub(crate) terrain: Arc<dyn MapOracle>,
    pub(crate) attack_table: Arc<dyn AttackTable>,
    pub(crate) scripts: ScriptRegistry,
    observers: Vec<Arc<dyn CastObserver>>,
    pub(crate) grid: VisibilityGrid,
    pub(crate) clock: GameTime,
    pub(crate) rng: StdRng,
    pub(crate) guids: GuidAllocator,
    pub(crate) units: BTreeMap<Guid, Unit>,
    pub(crate) objects: BTreeMap<Guid, GameObject>,
    pub(crate) timers: TimerQueue<TimerEvent>,
    /// Per-caster cast slot.
    pub(crate) slots: HashMap<Guid, CastContext>,
    /// Owning registry of every live cast. Presence is the liveness token.
    pub(crate) casts: HashMap<CastId, ActiveCast>,
    next_cast: u64,
    next_aura: u64,
    work: VecDeque<WorkItem>,
    outbox: Vec<Envelope>,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("clock", &self.clock)
            .field("units", &self.units.len())
            .field("objects", &self.objects.len())
            .field("casts", &self.casts.len())
            .field("timers", &self.timers.len())
            .field("pending_work", &self.work.len())
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(config: GameConfig, data: Arc<dyn GameDataOracle>) -> Self {
        let grid = VisibilityGrid::new(config.visibility_tile_size, config.sight_tiles);
        Self {
            config,
            data,
            terrain: Arc::new(OpenTerrain),
            attack_table: Arc::new(StandardAttackTable::new()),
            scripts: ScriptRegistry::new(),
            observers: Vec::new(),
            grid,
            clock: 0,
            rng: StdRng::seed_from_u64(0),
            guids: GuidAllocator::default(),
            units: BTreeMap::new(),
            objects: BTreeMap::new(),
            timers: TimerQueue::new(),
            slots: HashMap::new(),
            casts: HashMap::new(),
            next_cast: 1,
            next_aura: 1,
            work: VecDeque::new(),
            outbox: Vec::new(),
        }
    }

    // ===== builders =====

    pub fn with_terrain(mut self, terrain: Arc<dyn MapOracle>) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_attack_table(mut self, table: Arc<dyn AttackTable>) -> Self {
        self.attack_table = table;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_entropy(mut self) -> Self {
        self.rng = StdRng::from_entropy();
        self
    }

    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CastObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn CastObserver>) {
        self.observers.push(observer);
    }

    // ===== accessors =====

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn data(&self) -> &dyn GameDataOracle {
        self.data.as_ref()
    }

    pub fn clock(&self) -> GameTime {
        self.clock
    }

    pub fn unit(&self, guid: Guid) -> Option<&Unit> {
        self.units.get(&guid)
    }

    pub fn unit_mut(&mut self, guid: Guid) -> Option<&mut Unit> {
        self.units.get_mut(&guid)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn object(&self, guid: Guid) -> Option<&GameObject> {
        self.objects.get(&guid)
    }

    pub fn cast(&self, id: CastId) -> Option<&ActiveCast> {
        self.casts.get(&id)
    }

    /// Number of live casts, including detached projectiles and pending swings.
    pub fn live_casts(&self) -> usize {
        self.casts.len()
    }

    /// The cast occupying `caster`'s slot, if any.
    pub fn current_cast(&self, caster: Guid) -> Option<CastId> {
        self.slots.get(&caster).and_then(CastContext::current)
    }

    pub fn is_casting(&self, caster: Guid) -> bool {
        self.current_cast(caster)
            .and_then(|id| self.casts.get(&id))
            .is_some_and(|c| !c.finished)
    }

    pub fn next_deadline(&self) -> Option<GameTime> {
        self.timers.next_deadline()
    }

    pub fn pending_work(&self) -> usize {
        self.work.len()
    }

    pub fn drain_notifications(&mut self) -> Vec<Envelope> {
        core::mem::take(&mut self.outbox)
    }

    // ===== population =====

    /// Adds a unit. A zero guid is replaced by a freshly allocated one.
    pub fn spawn_unit(&mut self, mut unit: Unit) -> Guid {
        if unit.guid.is_none() {
            unit.guid = self.guids.allocate();
        } else {
            self.guids.reserve(unit.guid);
        }
        let guid = unit.guid;
        debug!(unit = %guid, name = %unit.name, "spawned unit");
        self.units.insert(guid, unit);
        guid
    }

    pub fn spawn_object(&mut self, mut object: GameObject) -> Guid {
        if object.guid.is_none() {
            object.guid = self.guids.allocate();
        } else {
            self.guids.reserve(object.guid);
        }
        let guid = object.guid;
        self.objects.insert(guid, object);
        guid
    }

    pub(crate) fn next_cast_id(&mut self) -> CastId {
        let id = CastId(self.next_cast);
        self.next_cast += 1;
        id
    }

    pub(crate) fn next_aura_id(&mut self) -> AuraId {
        let id = AuraId(self.next_aura);
        self.next_aura += 1;
        id
    }

    // ===== clock =====

    /// Advances the clock by `ms`, firing every timer that comes due.
    pub fn advance(&mut self, ms: u64) {
        let target = self.clock.saturating_add(ms);
        self.advance_to(target);
    }

    pub fn advance_to(&mut self, target: GameTime) {
        while let Some((at, timer, event)) = self.timers.pop_due(target) {
            self.clock = self.clock.max(at);
            self.dispatch_timer(timer, event);
            self.flush_work();
        }
        self.clock = self.clock.max(target);
    }

    fn dispatch_timer(&mut self, timer: TimerId, event: TimerEvent) {
        trace!(?event, at = self.clock, "timer fired");
        match event {
            TimerEvent::CastFinished(cast) => {
                if self.casts.get(&cast).is_some_and(|c| c.countdown.is_timer(timer)) {
                    self.on_cast_finished(cast);
                }
            }
            TimerEvent::ProjectileImpact(cast) => {
                if self.casts.get(&cast).is_some_and(|c| c.impact.is_timer(timer)) {
                    self.on_projectile_impact(cast);
                }
            }
            TimerEvent::AuraTick { unit, aura } => self.on_aura_tick(unit, aura, timer),
            TimerEvent::AuraExpire { unit, aura } => self.on_aura_expire(unit, aura, timer),
        }
    }

    // ===== work queue =====

    pub fn post(&mut self, item: WorkItem) {
        self.work.push_back(item);
    }

    /// Auras of `unit` already queued to leave it.
    pub(crate) fn queued_removals(&self, unit: Guid) -> Vec<AuraId> {
        self.work.iter().filter_map(|item| item.removes_from(unit)).collect()
    }

    /// Runs deferred work until the queue is empty.
    pub fn flush_work(&mut self) {
        while let Some(item) = self.work.pop_front() {
            match item {
                WorkItem::RemoveAura { unit, aura } => self.remove_aura_now(unit, aura),
                WorkItem::StealAura { from, aura, to } => self.steal_aura_now(from, aura, to),
            }
        }
    }

    // ===== notifications =====

    /// Fans a notification out from `source` to the characters in sight.
    pub(crate) fn broadcast(&mut self, source: Guid, notification: Notification) {
        let origin = self
            .units
            .get(&source)
            .map(|u| (u.map, u.position))
            .or_else(|| self.objects.get(&source).map(|o| (o.map, o.position)));
        let recipients = match origin {
            Some((map, position)) => {
                self.grid
                    .subscribers_in_sight(map, position, self.units.values())
            }
            None => Vec::new(),
        };
        if recipients.is_empty() {
            trace!(kind = notification.kind(), source = %source, "notification has no subscribers");
        }
        self.outbox.push(Envelope {
            at: self.clock,
            source,
            recipients,
            notification,
        });
    }

    /// Sends a notification to one unit only.
    pub(crate) fn notify(&mut self, recipient: Guid, notification: Notification) {
        self.outbox.push(Envelope {
            at: self.clock,
            source: recipient,
            recipients: vec![recipient],
            notification,
        });
    }

    pub(crate) fn fire_cast_ended(&mut self, ended: CastEnded) {
        debug!(
            cast = %ended.cast,
            caster = %ended.caster,
            spell = ended.spell.0,
            success = ended.success,
            "cast ended"
        );
        let observers = self.observers.clone();
        for observer in observers.iter() {
            observer.on_cast_ended(self, &ended);
        }
    }

    // ===== unit events =====

    /// Moves a unit and notifies casts watching it.
    pub fn move_unit(&mut self, guid: Guid, position: Vec3, orientation: f32) -> bool {
        let moved = self.relocate_unit(guid, position, orientation);
        self.flush_work();
        moved
    }

    pub(crate) fn relocate_unit(&mut self, guid: Guid, position: Vec3, orientation: f32) -> bool {
        let Some(unit) = self.units.get_mut(&guid) else {
            return false;
        };
        let old_position = unit.position;
        unit.position = position;
        unit.orientation = orientation;
        let watchers = unit.listeners.subscribers(UnitSignal::Moved);

        for cast in watchers {
            self.on_unit_moved(cast, guid, old_position);
        }
        true
    }

    /// Applies damage through the unit's health operation, adding threat and
    /// handling death.
    pub(crate) fn damage_unit(
        &mut self,
        attacker: Guid,
        target: Guid,
        amount: u32,
        no_threat: bool,
    ) -> DamageResult {
        let Some(unit) = self.units.get_mut(&target) else {
            return DamageResult::default();
        };
        let result = unit.deal_damage(amount);
        if !no_threat && attacker != target && result.applied > 0 {
            unit.add_threat(attacker, result.applied as f32);
        }
        if result.killed {
            self.handle_unit_death(target, Some(attacker));
        }
        result
    }

    /// Kills a unit outright.
    pub fn kill_unit(&mut self, guid: Guid, killer: Option<Guid>) -> bool {
        let Some(unit) = self.units.get_mut(&guid) else {
            return false;
        };
        if !unit.is_alive() {
            return false;
        }
        unit.health = 0;
        self.handle_unit_death(guid, killer);
        self.flush_work();
        true
    }

    pub(crate) fn handle_unit_death(&mut self, guid: Guid, killer: Option<Guid>) {
        debug!(unit = %guid, killer = ?killer, "unit died");
        self.broadcast(guid, Notification::UnitDied { unit: guid, killer });

        let Some(unit) = self.units.get_mut(&guid) else {
            return;
        };
        let watchers = unit.listeners.subscribers(UnitSignal::Killed);
        let swing = unit.swing_callback.take();
        let auras = unit.auras.ids();
        unit.victim = None;
        unit.auto_attack = false;

        for cast in watchers {
            self.on_target_removed(cast);
        }
        // A cast already applying its effects finishes on its own.
        if self.is_casting(guid) {
            self.interrupt_caster(guid);
        }
        if let Some(cast) = swing {
            self.release_cast(cast);
        }
        for aura in auras {
            self.post(WorkItem::RemoveAura { unit: guid, aura });
        }
    }

    /// Removes a unit from the world, interrupting everything tied to it.
    pub fn despawn(&mut self, guid: Guid) -> Option<Unit> {
        let watchers = self.units.get(&guid)?.listeners.subscribers(UnitSignal::Despawned);
        for cast in watchers {
            self.on_target_removed(cast);
        }
        self.interrupt_caster(guid);

        let owned: Vec<CastId> = self
            .casts
            .values()
            .filter(|c| c.caster == guid)
            .map(|c| c.id)
            .collect();
        for cast in owned {
            self.release_cast(cast);
        }

        let mut unit = self.units.remove(&guid)?;
        for aura in unit.auras.iter() {
            let mut tick = aura.tick.clone();
            let mut expiry = aura.expiry.clone();
            tick.cancel(&mut self.timers);
            expiry.cancel(&mut self.timers);
        }
        unit.swing_callback = None;
        self.slots.remove(&guid);
        debug!(unit = %guid, "despawned unit");
        self.flush_work();
        Some(unit)
    }

    /// Units on the caster's map within `radius` of `center`.
    pub(crate) fn units_in_radius(&self, map: u32, center: Vec3, radius: f32) -> Vec<Guid> {
        self.units
            .values()
            .filter(|u| u.map == map && u.is_alive() && u.position.distance(center) <= radius)
            .map(|u| u.guid)
            .collect()
    }

    pub(crate) fn spell_power(&self, caster: Guid, school: SpellSchools) -> (i32, i32) {
        self.units
            .get(&caster)
            .map(|u| (u.spell_bonus(school.index()), u.spell_bonus_pct(school.index())))
            .unwrap_or((0, 0))
    }
}
