//! Shared, injectable handle around a [`GardenStore`].
//!
//! Taps, purchases and production ticks all funnel through [`Garden`]. Each
//! call holds the store lock for its whole read-modify-write, so no caller
//! ever observes a half-applied mutation and concurrent credits add up.
//! After a mutation that changed state the handle publishes a
//! [`GardenChange`] on a `watch` channel; the ticker and any presentation
//! layer subscribe to it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::catalog::Catalog;
use super::errors::GardenError;
use super::store::{Balance, GardenSnapshot, GardenStore, Placement, Position, UpgradeReceipt};
use crate::metrics;

/// Published after every state-changing mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GardenChange {
    pub revision: u64,
    pub production_rate: u64,
}

#[derive(Clone)]
pub struct Garden {
    store: Arc<Mutex<GardenStore>>,
    changes: Arc<watch::Sender<GardenChange>>,
}

impl Garden {
    pub fn new(store: GardenStore) -> Self {
        let initial = GardenChange {
            revision: store.revision(),
            production_rate: store.production_rate(),
        };
        let (tx, _rx) = watch::channel(initial);
        Self {
            store: Arc::new(Mutex::new(store)),
            changes: Arc::new(tx),
        }
    }

    /// Session with the standard catalog and default settings.
    pub fn standard() -> Self {
        Self::new(GardenStore::new(Arc::new(Catalog::standard())))
    }

    /// Receiver that wakes whenever the garden changes.
    pub fn subscribe(&self) -> watch::Receiver<GardenChange> {
        self.changes.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, GardenStore> {
        // Store mutations never panic midway, so a poisoned lock still
        // guards consistent state.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock and publish a change if the revision moved.
    fn mutate<T>(&self, f: impl FnOnce(&mut GardenStore) -> T) -> T {
        let mut store = self.lock();
        let before = store.revision();
        let out = f(&mut store);
        if store.revision() != before {
            let change = GardenChange {
                revision: store.revision(),
                production_rate: store.production_rate(),
            };
            self.changes.send_replace(change);
        }
        out
    }

    /// Read-only access to the store.
    pub fn read<T>(&self, f: impl FnOnce(&GardenStore) -> T) -> T {
        f(&self.lock())
    }

    pub fn tap(&self) -> u64 {
        metrics::inc_taps();
        self.mutate(|s| s.tap())
    }

    pub fn credit(&self, amount: u64) {
        self.mutate(|s| s.credit(amount))
    }

    pub fn purchase_upgrade(&self, upgrade_id: &str) -> Result<UpgradeReceipt, GardenError> {
        let result = self.mutate(|s| s.purchase_upgrade(upgrade_id));
        if result.is_ok() {
            metrics::inc_purchases();
        }
        result
    }

    pub fn purchase_decoration(&self, decoration_id: &str) -> Result<u32, GardenError> {
        let result = self.mutate(|s| s.purchase_decoration(decoration_id));
        if result.is_ok() {
            metrics::inc_purchases();
        }
        result
    }

    pub fn place_decoration(
        &self,
        decoration_id: &str,
        position: Position,
    ) -> Result<Placement, GardenError> {
        self.mutate(|s| s.place_decoration(decoration_id, position))
    }

    pub fn remove_placement(&self, instance_id: &str) -> Result<Placement, GardenError> {
        self.mutate(|s| s.remove_placement(instance_id))
    }

    pub fn clear_garden(&self) -> usize {
        self.mutate(|s| s.clear_garden())
    }

    pub fn purchase_theme(&self, theme_id: &str) -> Result<(), GardenError> {
        let result = self.mutate(|s| s.purchase_theme(theme_id));
        if result.is_ok() {
            metrics::inc_purchases();
        }
        result
    }

    pub fn apply_theme(&self, theme_id: &str) -> Result<(), GardenError> {
        self.mutate(|s| s.apply_theme(theme_id))
    }

    pub fn balance(&self) -> Balance {
        self.read(|s| s.balance())
    }

    pub fn production_rate(&self) -> u64 {
        self.read(|s| s.production_rate())
    }

    pub fn snapshot(&self) -> GardenSnapshot {
        self.read(|s| s.snapshot())
    }
}
