//! High-level runtime orchestrator.
//!
//! The runtime owns the world worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::sync::Arc;
use std::time::Duration;

use spell_content::{ContentFactory, ContentSource};
use spell_core::{
    AttackTable, CastObserver, GameConfig, GameDataOracle, ScriptRegistry, Unit, World,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, EndedForwarder, WorldWorker};

/// Runtime configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Real-time clock step. `None` leaves the clock to explicit `advance`
    /// commands.
    pub tick_interval: Option<Duration>,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 256,
            command_buffer_size: 32,
            tick_interval: None,
            rng_seed: None,
        }
    }
}

impl RuntimeConfig {
    pub const TICK_MS_VAR: &'static str = "SPELL_TICK_MS";
    pub const EVENT_BUFFER_VAR: &'static str = "SPELL_EVENT_BUFFER";
    pub const COMMAND_BUFFER_VAR: &'static str = "SPELL_COMMAND_BUFFER";
    pub const RNG_SEED_VAR: &'static str = "SPELL_RNG_SEED";

    /// Reads overrides from the process environment.
    ///
    /// `SPELL_TICK_MS=0` selects the manual clock.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(ms) = parse_var::<u64>(&lookup, Self::TICK_MS_VAR)? {
            config.tick_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(size) = parse_var(&lookup, Self::EVENT_BUFFER_VAR)? {
            config.event_buffer_size = size;
        }
        if let Some(size) = parse_var(&lookup, Self::COMMAND_BUFFER_VAR)? {
            config.command_buffer_size = size;
        }
        config.rng_seed = parse_var(&lookup, Self::RNG_SEED_VAR)?;
        Ok(config)
    }

    pub fn with_game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Option<Duration>) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| RuntimeError::InvalidEnv { var, value })
}

/// Main runtime hosting one world instance.
///
/// Design: Runtime owns the worker task. [`RuntimeHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to one event topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Commands queued before the call are still processed.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    data: Option<Arc<dyn GameDataOracle>>,
    content: Option<ContentSource>,
    units: Vec<Unit>,
    observers: Vec<Arc<dyn CastObserver>>,
    attack_table: Option<Arc<dyn AttackTable>>,
    scripts: ScriptRegistry,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            data: None,
            content: None,
            units: Vec::new(),
            observers: Vec::new(),
            attack_table: None,
            scripts: ScriptRegistry::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Static tables the world reads through its oracles.
    pub fn data(mut self, data: Arc<dyn GameDataOracle>) -> Self {
        self.data = Some(data);
        self
    }

    /// Load static tables from a content source when starting. Ignored if
    /// [`data`](Self::data) was set.
    pub fn content(mut self, source: ContentSource) -> Self {
        self.content = Some(source);
        self
    }

    /// Units spawned before the worker starts.
    pub fn spawn_units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.units.extend(units);
        self
    }

    /// Extra observer of every cast's `ended` signal. Runs inside the world
    /// step, before the event is published.
    pub fn observer(mut self, observer: Arc<dyn CastObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn attack_table(mut self, table: Arc<dyn AttackTable>) -> Self {
        self.attack_table = Some(table);
        self
    }

    pub fn scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    /// Build the world and spawn its worker task.
    pub async fn start(self) -> Result<Runtime> {
        let data = match (self.data, self.content) {
            (Some(data), _) => data,
            (None, Some(source)) => {
                let loaded = ContentFactory::new(source).load_data()?;
                Arc::new(loaded) as Arc<dyn GameDataOracle>
            }
            (None, None) => return Err(RuntimeError::MissingData),
        };

        let ended = EndedForwarder::new();
        let mut world = World::new(self.config.game_config.clone(), data)
            .with_scripts(self.scripts)
            .with_observer(ended.clone());
        world = match self.config.rng_seed {
            Some(seed) => world.with_seed(seed),
            None => world.with_entropy(),
        };
        if let Some(table) = self.attack_table {
            world = world.with_attack_table(table);
        }
        for observer in self.observers {
            world.add_observer(observer);
        }
        for unit in self.units {
            world.spawn_unit(unit);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        info!(
            tick_interval = ?self.config.tick_interval,
            seeded = self.config.rng_seed.is_some(),
            "starting runtime"
        );
        let worker = WorldWorker::new(
            world,
            command_rx,
            event_bus,
            ended,
            self.config.tick_interval,
        );
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.tick_interval, None);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.event_buffer_size, 256);
    }

    #[test]
    fn reads_every_variable() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("SPELL_TICK_MS", "50"),
            ("SPELL_EVENT_BUFFER", "1024"),
            ("SPELL_COMMAND_BUFFER", " 8 "),
            ("SPELL_RNG_SEED", "7"),
        ]))
        .unwrap();
        assert_eq!(config.tick_interval, Some(Duration::from_millis(50)));
        assert_eq!(config.event_buffer_size, 1024);
        assert_eq!(config.command_buffer_size, 8);
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn zero_tick_selects_manual_clock() {
        let config = RuntimeConfig::from_lookup(lookup(&[("SPELL_TICK_MS", "0")])).unwrap();
        assert_eq!(config.tick_interval, None);
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let err = RuntimeConfig::from_lookup(lookup(&[("SPELL_RNG_SEED", "lucky")])).unwrap_err();
        match err {
            RuntimeError::InvalidEnv { var, value } => {
                assert_eq!(var, "SPELL_RNG_SEED");
                assert_eq!(value, "lucky");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
