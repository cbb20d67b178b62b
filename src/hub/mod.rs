//! Minimal host for sensor entities
//!
//! The hub owns registered entities, publishes their values to a shared
//! `StateStore`, and drives polling. It also owns the update-invocation
//! wrapper: entities return errors from `async_update`, and the hub logs them
//! and marks the entity unavailable until its next successful update.

pub mod run_state;
pub mod states;

use futures::future::join_all;
use lazy_static::lazy_static;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::sensor::SensorEntity;
use crate::template::TemplateEngine;

pub use run_state::{RunState, RunStateHandle, RunStateQuery};
pub use states::{StateStore, STATE_UNAVAILABLE, STATE_UNKNOWN};

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

const ENTITY_DOMAIN: &str = "sensor";

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
}

/// Lowercase `name` and collapse everything but letters and digits to `_`
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = NON_WORD.replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug.to_string()
    }
}

/// Registration callback handed to platform loaders
pub trait AddEntities {
    /// Register `entities`; with `update_before_add` each gets one update
    /// before the hub starts polling
    fn add_entities(&mut self, entities: Vec<Box<dyn SensorEntity>>, update_before_add: bool);
}

struct RegisteredEntity {
    entity_id: String,
    entity: Box<dyn SensorEntity>,
    available: bool,
    pending_initial_update: bool,
}

impl RegisteredEntity {
    fn state(&self) -> String {
        if !self.available {
            return STATE_UNAVAILABLE.to_string();
        }
        self.entity
            .native_value()
            .map(str::to_string)
            .unwrap_or_else(|| STATE_UNKNOWN.to_string())
    }
}

pub struct Hub {
    run_state: Arc<RunStateHandle>,
    states: Arc<StateStore>,
    templates: Arc<TemplateEngine>,
    entities: Vec<RegisteredEntity>,
    scan_interval: Duration,
}

impl Hub {
    pub fn new(scan_interval: Duration) -> Self {
        let states = Arc::new(StateStore::new());
        Self {
            run_state: Arc::new(RunStateHandle::default()),
            templates: Arc::new(TemplateEngine::new(Arc::clone(&states))),
            states,
            entities: Vec::new(),
            scan_interval,
        }
    }

    pub fn run_state(&self) -> Arc<RunStateHandle> {
        Arc::clone(&self.run_state)
    }

    pub fn states(&self) -> Arc<StateStore> {
        Arc::clone(&self.states)
    }

    pub fn template_engine(&self) -> Arc<TemplateEngine> {
        Arc::clone(&self.templates)
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    pub fn entity_ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.entity_id.as_str()).collect()
    }

    pub fn entity(&self, entity_id: &str) -> Option<&dyn SensorEntity> {
        self.find(entity_id).map(|e| e.entity.as_ref())
    }

    pub fn is_available(&self, entity_id: &str) -> Option<bool> {
        self.find(entity_id).map(|e| e.available)
    }

    fn find(&self, entity_id: &str) -> Option<&RegisteredEntity> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    fn next_entity_id(&self, name: &str) -> String {
        let base = format!("{ENTITY_DOMAIN}.{}", slugify(name));
        let taken = |candidate: &str| {
            self.entities.iter().any(|e| e.entity_id == candidate)
                || self.states.contains(candidate)
        };

        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Run one update of `entity_id` through the update wrapper
    ///
    /// Returns `None` for an unknown entity, otherwise whether the update
    /// succeeded.
    pub async fn update_entity(&mut self, entity_id: &str) -> Option<bool> {
        let states = Arc::clone(&self.states);
        let registered = self
            .entities
            .iter_mut()
            .find(|e| e.entity_id == entity_id)?;
        Some(refresh(registered, &states).await)
    }

    /// Update every polled entity once; entities run concurrently
    pub async fn poll_once(&mut self) {
        let states = self.states.as_ref();
        let updates = self
            .entities
            .iter_mut()
            .filter(|e| e.entity.should_poll())
            .map(move |e| refresh(e, states));
        join_all(updates).await;
    }

    async fn run_initial_updates(&mut self) {
        let states = self.states.as_ref();
        let updates = self
            .entities
            .iter_mut()
            .filter(|e| e.pending_initial_update)
            .map(move |e| {
                e.pending_initial_update = false;
                refresh(e, states)
            });
        join_all(updates).await;
    }

    /// Start the hub and poll until `shutdown` resolves
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        // Initial updates belong to setup, before the hub leaves NotRunning.
        self.run_initial_updates().await;
        self.run_state.set(RunState::Starting);
        self.run_state.set(RunState::Running);

        tracing::info!(
            entities = self.entities.len(),
            scan_interval_secs = self.scan_interval.as_secs(),
            "Hub running"
        );

        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first poll
        // happens one full interval after startup.
        ticker.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.poll_once().await,
            }
        }

        self.run_state.set(RunState::Stopping);
        tracing::info!("Hub stopping");
        self.run_state.set(RunState::Stopped);
    }
}

impl AddEntities for Hub {
    fn add_entities(&mut self, entities: Vec<Box<dyn SensorEntity>>, update_before_add: bool) {
        for entity in entities {
            let entity_id = self.next_entity_id(entity.name());
            let registered = RegisteredEntity {
                entity_id: entity_id.clone(),
                entity,
                available: true,
                pending_initial_update: update_before_add,
            };
            self.states.set(&entity_id, registered.state());

            tracing::info!(
                entity_id = %entity_id,
                name = registered.entity.name(),
                update_before_add,
                "Entity registered"
            );
            self.entities.push(registered);
        }
    }
}

async fn refresh(registered: &mut RegisteredEntity, states: &StateStore) -> bool {
    let success = match registered.entity.async_update().await {
        Ok(()) => {
            if !registered.available {
                tracing::info!(entity_id = %registered.entity_id, "Entity available again");
            }
            registered.available = true;
            true
        }
        Err(error) => {
            if registered.available {
                let hint = error
                    .completion_error()
                    .map(|e| e.user_message())
                    .unwrap_or_default();
                tracing::warn!(
                    entity_id = %registered.entity_id,
                    category = error.category(),
                    error = %error,
                    hint = %hint,
                    "Update failed, marking entity unavailable"
                );
            } else {
                tracing::debug!(
                    entity_id = %registered.entity_id,
                    error = %error,
                    "Update failed again"
                );
            }
            registered.available = false;
            false
        }
    };

    states.set(&registered.entity_id, registered.state());
    success
}
