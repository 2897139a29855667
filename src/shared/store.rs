use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::domain::Configuration;

/// A value paired with the sequence number its request was issued under.
///
/// Sequence numbers come from a single counter in the sync client, so a
/// higher number always means a later request regardless of when the
/// response arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub sequence: u64,
    pub value: T,
}

impl<T> Stamped<T> {
    pub fn new(sequence: u64, value: T) -> Self {
        Self { sequence, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stamped<U> {
        Stamped {
            sequence: self.sequence,
            value: f(self.value),
        }
    }
}

/// Result of [`ConfigStore::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied { version: u64 },
    /// A newer result was already applied; the store did not change
    Stale { sequence: u64, applied_sequence: u64 },
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }
}

/// Editable copy of the configuration, detached from the store
#[derive(Debug, Clone, PartialEq)]
pub struct DraftConfig {
    config: Configuration,
    base_version: u64,
}

impl DraftConfig {
    pub fn new(config: Configuration, base_version: u64) -> Self {
        Self {
            config,
            base_version,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    /// Store version this draft was copied from
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn into_config(self) -> Configuration {
        self.config
    }
}

#[derive(Debug)]
struct StoreState {
    config: Arc<Configuration>,
    version: u64,
    applied_sequence: u64,
}

/// Owner of the last known-good configuration.
///
/// Readers get `Arc` snapshots; writers swap the whole document under one
/// lock, so no reader ever sees a half-applied update.
#[derive(Debug)]
pub struct ConfigStore {
    state: RwLock<StoreState>,
    modified: AtomicBool,
}

impl ConfigStore {
    pub fn new(initial: Configuration) -> Self {
        Self {
            state: RwLock::new(StoreState {
                config: Arc::new(initial),
                version: 0,
                applied_sequence: 0,
            }),
            modified: AtomicBool::new(false),
        }
    }

    /// Current configuration snapshot
    pub fn get(&self) -> Arc<Configuration> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.config)
    }

    /// Incremented on every replace or applied commit
    pub fn version(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Sequence of the last committed network result, 0 if none
    pub fn applied_sequence(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .applied_sequence
    }

    /// Swap in a new document unconditionally. Returns the new version.
    pub fn replace(&self, config: Configuration) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.config = Arc::new(config);
        state.version += 1;
        self.modified.store(false, Ordering::SeqCst);

        info!(version = state.version, "Configuration replaced");
        state.version
    }

    /// Apply a network result unless a newer one has already been applied
    pub fn commit(&self, stamped: Stamped<Configuration>) -> CommitOutcome {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if stamped.sequence <= state.applied_sequence {
            debug!(
                sequence = stamped.sequence,
                applied_sequence = state.applied_sequence,
                "Discarding stale configuration result"
            );
            return CommitOutcome::Stale {
                sequence: stamped.sequence,
                applied_sequence: state.applied_sequence,
            };
        }

        state.config = Arc::new(stamped.value);
        state.version += 1;
        state.applied_sequence = stamped.sequence;
        self.modified.store(false, Ordering::SeqCst);

        info!(
            version = state.version,
            sequence = stamped.sequence,
            "Configuration committed"
        );
        CommitOutcome::Applied {
            version: state.version,
        }
    }

    /// Deep copy of the current configuration for editing
    pub fn begin_edit(&self) -> DraftConfig {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        DraftConfig::new(Configuration::clone(&state.config), state.version)
    }

    /// Flag that a draft holds unsaved changes
    pub fn mark_modified(&self) {
        self.modified.store(true, Ordering::SeqCst);
    }

    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Configuration::factory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Configuration {
        let mut config = Configuration::factory();
        config.system.name = name.to_string();
        config
    }

    #[test]
    fn test_replace_bumps_version_and_clears_modified() {
        let store = ConfigStore::default();
        store.mark_modified();
        assert!(store.is_modified());

        let version = store.replace(named("Tent 1"));

        assert_eq!(version, 1);
        assert_eq!(store.version(), 1);
        assert_eq!(store.get().system.name, "Tent 1");
        assert!(!store.is_modified());
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = ConfigStore::default();
        let before = store.get();

        store.replace(named("Tent 1"));

        assert_eq!(before.system.name, "GrowIT Cannabis Controller");
        assert_eq!(store.get().system.name, "Tent 1");
    }

    #[test]
    fn test_begin_edit_is_independent_copy() {
        let store = ConfigStore::default();
        let mut draft = store.begin_edit();
        draft.config_mut().system.name = "Edited".to_string();

        assert_eq!(store.get().system.name, "GrowIT Cannabis Controller");
        assert_eq!(draft.base_version(), 0);
        assert_eq!(draft.config().system.name, "Edited");
    }

    #[test]
    fn test_commit_applies_newer_sequence() {
        let store = ConfigStore::default();

        let outcome = store.commit(Stamped::new(2, named("Saved")));

        assert_eq!(outcome, CommitOutcome::Applied { version: 1 });
        assert_eq!(store.applied_sequence(), 2);
        assert_eq!(store.get().system.name, "Saved");
    }

    #[test]
    fn test_commit_discards_older_sequence() {
        let store = ConfigStore::default();
        store.commit(Stamped::new(2, named("Saved")));

        let outcome = store.commit(Stamped::new(1, named("Fetched")));

        assert_eq!(
            outcome,
            CommitOutcome::Stale {
                sequence: 1,
                applied_sequence: 2
            }
        );
        assert_eq!(store.get().system.name, "Saved");
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_commit_same_sequence_twice_is_stale() {
        let store = ConfigStore::default();
        store.commit(Stamped::new(5, named("First")));

        assert!(!store.commit(Stamped::new(5, named("Again"))).is_applied());
        assert_eq!(store.get().system.name, "First");
    }

    #[test]
    fn test_stale_commit_keeps_modified_flag() {
        let store = ConfigStore::default();
        store.commit(Stamped::new(3, named("Saved")));
        store.mark_modified();

        store.commit(Stamped::new(1, named("Old")));

        assert!(store.is_modified());
    }

    #[test]
    fn test_stamped_map_keeps_sequence() {
        let stamped = Stamped::new(7, 21).map(|n| n * 2);
        assert_eq!(stamped, Stamped::new(7, 42));
    }
}
