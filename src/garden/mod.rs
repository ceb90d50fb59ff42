//! # Garden Economy Module
//!
//! Everything the player earns, buys and places.
//!
//! ## Components
//!
//! - [`catalog`] - static upgrade, decoration and theme tables
//! - [`emoji`] - decoration table generated from Unicode emoji data
//! - [`store`] - the harvest economy state machine
//! - [`shared`] - the injectable [`Garden`] handle all mutations go through
//! - [`ticker`] - periodic production credits
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lettuce_garden::garden::{start_ticker, Garden, DEFAULT_TICK_INTERVAL};
//!
//! #[tokio::main]
//! async fn main() {
//!     let garden = Garden::standard();
//!     let ticker = start_ticker(garden.clone(), DEFAULT_TICK_INTERVAL);
//!
//!     for _ in 0..15 {
//!         garden.tap();
//!     }
//!     garden.purchase_upgrade("watering_can").expect("15 harvest buys a watering can");
//!
//!     ticker.shutdown().await;
//! }
//! ```

pub mod catalog;
pub mod emoji;
pub mod errors;
pub mod shared;
pub mod store;
pub mod ticker;

pub use catalog::{
    Catalog, DecorationDef, MotionStyle, PurchaseLimit, ThemeDef, UpgradeDef, UpgradeKind,
};
pub use emoji::{load_emoji_catalog, parse_emoji_test, EmojiCostCurve};
pub use errors::GardenError;
pub use shared::{Garden, GardenChange};
pub use store::{Balance, GardenSnapshot, GardenStore, Placement, Position, UpgradeReceipt};
pub use ticker::{start_ticker, TickerHandle, TickerStats, DEFAULT_TICK_INTERVAL};
