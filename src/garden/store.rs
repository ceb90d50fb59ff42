//! Harvest economy state and its mutation rules.
//!
//! [`GardenStore`] is a plain single-owner struct: every operation is a
//! synchronous read-modify-write on `&mut self` that either applies fully or
//! returns a [`GardenError`] and leaves the store untouched. Sharing across a
//! tap handler and the ticker goes through [`crate::garden::Garden`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{Catalog, DecorationDef, PurchaseLimit, ThemeDef, UpgradeDef, UpgradeKind};
use super::errors::GardenError;

/// Canvas-local coordinate of a placed decoration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A decoration instance pinned to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub instance_id: String,
    /// Weak reference into the decoration catalog.
    pub decoration_id: String,
    pub position: Position,
}

/// Spendable and lifetime harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub available: u64,
    pub lifetime: u64,
}

/// Result of a successful upgrade purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub upgrade_id: String,
    pub cost: u64,
    /// Times this upgrade is now owned (always 1 for one-time upgrades).
    pub owned: u32,
    pub production_rate: u64,
    pub tap_value: u64,
}

/// Serializable view of the whole store for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    pub revision: u64,
    pub balance: Balance,
    pub production_rate: u64,
    pub tap_value: u64,
    pub upgrades: BTreeMap<String, u32>,
    pub unlocked: BTreeSet<String>,
    pub inventory: BTreeMap<String, u32>,
    pub placements: Vec<Placement>,
    pub owned_themes: BTreeSet<String>,
    pub applied_theme: String,
}

#[derive(Debug, Clone)]
pub struct GardenStore {
    catalog: Arc<Catalog>,
    balance: Balance,
    production_rate: u64,
    tap_value: u64,
    /// Purchase counts for repeatable upgrades.
    upgrades: BTreeMap<String, u32>,
    /// Membership for one-time upgrades.
    unlocked: BTreeSet<String>,
    inventory: BTreeMap<String, u32>,
    placements: Vec<Placement>,
    owned_themes: BTreeSet<String>,
    applied_theme: String,
    revision: u64,
}

impl GardenStore {
    /// Fresh session state with a tap value of 1 and the catalog's starter
    /// themes owned.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_settings(catalog, 1, "classic")
    }

    /// Fresh session state with an explicit base tap value and preferred
    /// starter theme. An unknown or non-starter `starter_theme` falls back to
    /// the first starter in the catalog.
    pub fn with_settings(catalog: Arc<Catalog>, base_tap_value: u64, starter_theme: &str) -> Self {
        let mut owned_themes: BTreeSet<String> =
            catalog.starter_themes().map(|t| t.id.clone()).collect();
        let applied_theme = if owned_themes.contains(starter_theme) {
            starter_theme.to_string()
        } else if let Some(first) = catalog.starter_themes().next() {
            first.id.clone()
        } else {
            // Catalog without starters: own the requested id so the applied
            // theme is always a member of the owned set.
            owned_themes.insert(starter_theme.to_string());
            starter_theme.to_string()
        };
        Self {
            catalog,
            balance: Balance::default(),
            production_rate: 0,
            tap_value: base_tap_value,
            upgrades: BTreeMap::new(),
            unlocked: BTreeSet::new(),
            inventory: BTreeMap::new(),
            placements: Vec::new(),
            owned_themes,
            applied_theme,
            revision: 0,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn available(&self) -> u64 {
        self.balance.available
    }

    pub fn lifetime(&self) -> u64 {
        self.balance.lifetime
    }

    pub fn production_rate(&self) -> u64 {
        self.production_rate
    }

    pub fn tap_value(&self) -> u64 {
        self.tap_value
    }

    /// Bumped once per mutation that changed state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Purchase count for an upgrade; one-time upgrades report 0 or 1.
    pub fn upgrade_count(&self, upgrade_id: &str) -> u32 {
        if self.unlocked.contains(upgrade_id) {
            return 1;
        }
        self.upgrades.get(upgrade_id).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, upgrade_id: &str) -> bool {
        self.unlocked.contains(upgrade_id)
    }

    pub fn inventory_count(&self, decoration_id: &str) -> u32 {
        self.inventory.get(decoration_id).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> &BTreeMap<String, u32> {
        &self.inventory
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn owned_themes(&self) -> &BTreeSet<String> {
        &self.owned_themes
    }

    pub fn owns_theme(&self, theme_id: &str) -> bool {
        self.owned_themes.contains(theme_id)
    }

    pub fn applied_theme(&self) -> &str {
        &self.applied_theme
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn debit(&mut self, cost: u64) -> Result<(), GardenError> {
        if self.balance.available < cost {
            return Err(GardenError::InsufficientFunds {
                cost,
                available: self.balance.available,
            });
        }
        self.balance.available -= cost;
        Ok(())
    }

    /// Add harvest to both the spendable and lifetime totals.
    pub fn credit(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.balance.available = self.balance.available.saturating_add(amount);
        self.balance.lifetime = self.balance.lifetime.saturating_add(amount);
        self.touch();
    }

    /// Manual tap: credit the current tap value. Returns the amount earned.
    pub fn tap(&mut self) -> u64 {
        let earned = self.tap_value;
        self.credit(earned);
        earned
    }

    pub fn purchase_upgrade(&mut self, upgrade_id: &str) -> Result<UpgradeReceipt, GardenError> {
        let upgrade: UpgradeDef = self
            .catalog
            .upgrade(upgrade_id)
            .cloned()
            .ok_or_else(|| GardenError::UnknownUpgrade(upgrade_id.to_string()))?;

        if upgrade.limit == PurchaseLimit::Once && self.unlocked.contains(&upgrade.id) {
            return Err(GardenError::AlreadyOwned(upgrade.id));
        }
        self.debit(upgrade.cost)?;

        let owned = match upgrade.limit {
            PurchaseLimit::Once => {
                self.unlocked.insert(upgrade.id.clone());
                1
            }
            PurchaseLimit::Repeatable => {
                let count = self.upgrades.entry(upgrade.id.clone()).or_insert(0);
                *count = count.saturating_add(1);
                *count
            }
        };
        match upgrade.kind {
            UpgradeKind::Auto => {
                self.production_rate = self.production_rate.saturating_add(upgrade.increment)
            }
            UpgradeKind::Tap => self.tap_value = self.tap_value.saturating_add(upgrade.increment),
        }
        self.touch();
        debug!(
            "bought upgrade {} (#{}) for {}: rate={} tap={}",
            upgrade.id, owned, upgrade.cost, self.production_rate, self.tap_value
        );

        Ok(UpgradeReceipt {
            upgrade_id: upgrade.id,
            cost: upgrade.cost,
            owned,
            production_rate: self.production_rate,
            tap_value: self.tap_value,
        })
    }

    /// Buy one decoration into inventory. Returns the new inventory count.
    pub fn purchase_decoration(&mut self, decoration_id: &str) -> Result<u32, GardenError> {
        let cost = self
            .catalog
            .decoration(decoration_id)
            .map(|d| d.cost)
            .ok_or_else(|| GardenError::UnknownDecoration(decoration_id.to_string()))?;
        self.debit(cost)?;
        let count = self.inventory.entry(decoration_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        self.touch();
        Ok(count)
    }

    /// Move one decoration from inventory onto the canvas. The position is
    /// stored as given; clamping to the canvas is a presentation concern.
    pub fn place_decoration(
        &mut self,
        decoration_id: &str,
        position: Position,
    ) -> Result<Placement, GardenError> {
        match self.inventory.get_mut(decoration_id) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return Err(GardenError::NotInInventory(decoration_id.to_string())),
        }
        let placement = Placement {
            instance_id: Uuid::new_v4().to_string(),
            decoration_id: decoration_id.to_string(),
            position,
        };
        self.placements.push(placement.clone());
        self.touch();
        Ok(placement)
    }

    /// Return a single placed decoration to inventory.
    pub fn remove_placement(&mut self, instance_id: &str) -> Result<Placement, GardenError> {
        let idx = self
            .placements
            .iter()
            .position(|p| p.instance_id == instance_id)
            .ok_or_else(|| GardenError::UnknownPlacement(instance_id.to_string()))?;
        let placement = self.placements.remove(idx);
        *self.inventory.entry(placement.decoration_id.clone()).or_insert(0) += 1;
        self.touch();
        Ok(placement)
    }

    /// Return every placed decoration to inventory. Returns how many were
    /// returned; an empty garden is left untouched.
    pub fn clear_garden(&mut self) -> usize {
        if self.placements.is_empty() {
            return 0;
        }
        let returned = self.placements.len();
        for placement in self.placements.drain(..) {
            let count = self.inventory.entry(placement.decoration_id).or_insert(0);
            *count = count.saturating_add(1);
        }
        self.touch();
        returned
    }

    pub fn purchase_theme(&mut self, theme_id: &str) -> Result<(), GardenError> {
        let cost = self
            .catalog
            .theme(theme_id)
            .map(|t| t.cost)
            .ok_or_else(|| GardenError::UnknownTheme(theme_id.to_string()))?;
        if self.owned_themes.contains(theme_id) {
            return Err(GardenError::AlreadyOwned(theme_id.to_string()));
        }
        self.debit(cost)?;
        self.owned_themes.insert(theme_id.to_string());
        self.touch();
        Ok(())
    }

    pub fn apply_theme(&mut self, theme_id: &str) -> Result<(), GardenError> {
        if !self.owned_themes.contains(theme_id) {
            return Err(GardenError::NotOwned(theme_id.to_string()));
        }
        if self.applied_theme != theme_id {
            self.applied_theme = theme_id.to_string();
            self.touch();
        }
        Ok(())
    }

    pub fn applied_theme_def(&self) -> Option<&ThemeDef> {
        self.catalog.theme(&self.applied_theme)
    }

    /// Placements paired with their catalog entry. Placements whose
    /// decoration is no longer in the catalog are skipped.
    pub fn renderable_placements(&self) -> Vec<(&Placement, &DecorationDef)> {
        self.placements
            .iter()
            .filter_map(|p| match self.catalog.decoration(&p.decoration_id) {
                Some(def) => Some((p, def)),
                None => {
                    debug!(
                        "skipping placement {} with unknown decoration {}",
                        p.instance_id, p.decoration_id
                    );
                    None
                }
            })
            .collect()
    }

    /// Upgrades that could be bought right now.
    pub fn affordable_upgrades(&self) -> Vec<&UpgradeDef> {
        self.catalog
            .upgrades
            .iter()
            .filter(|u| u.cost <= self.balance.available)
            .filter(|u| u.limit == PurchaseLimit::Repeatable || !self.unlocked.contains(&u.id))
            .collect()
    }

    pub fn snapshot(&self) -> GardenSnapshot {
        GardenSnapshot {
            revision: self.revision,
            balance: self.balance,
            production_rate: self.production_rate,
            tap_value: self.tap_value,
            upgrades: self.upgrades.clone(),
            unlocked: self.unlocked.clone(),
            inventory: self.inventory.clone(),
            placements: self.placements.clone(),
            owned_themes: self.owned_themes.clone(),
            applied_theme: self.applied_theme.clone(),
        }
    }
}
