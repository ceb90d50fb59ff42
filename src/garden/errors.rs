use thiserror::Error;

/// Reasons a garden mutation can be refused.
///
/// A refused mutation never changes the store, so callers can surface the
/// `Display` text as a notice and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GardenError {
    /// Upgrade id is not in the catalog.
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),

    /// Decoration id is not in the catalog.
    #[error("unknown decoration: {0}")]
    UnknownDecoration(String),

    /// Theme id is not in the catalog.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// No placement carries this instance id.
    #[error("unknown placement: {0}")]
    UnknownPlacement(String),

    /// Not enough spendable harvest for the purchase.
    #[error("insufficient harvest: need {cost}, have {available}")]
    InsufficientFunds { cost: u64, available: u64 },

    /// One-time upgrade or theme that is already owned.
    #[error("already owned: {0}")]
    AlreadyOwned(String),

    /// Theme must be owned before it can be applied.
    #[error("theme not owned: {0}")]
    NotOwned(String),

    /// No unplaced copies of this decoration left in stock.
    #[error("no {0} left in inventory")]
    NotInInventory(String),
}
