//! # Lettuce Garden - headless core of a lettuce clicker
//!
//! Tap the lettuce, bank the harvest, spend it on upgrades that grow
//! automatically, decorate the garden with emoji, and read the garden news
//! while ambient tracks play. This crate holds everything except the screens.
//!
//! ## Features
//!
//! - **Harvest Economy**: taps and production ticks credit one currency; upgrades, decorations and themes spend it.
//! - **Garden Canvas**: bought decorations are placed at canvas coordinates and can be returned to stock.
//! - **Production Ticker**: a tokio task credits the production rate every tick and parks while production is zero.
//! - **Feed Reader**: RSS through an ordered proxy chain with a TTL cache and graceful fallbacks.
//! - **Ambient Audio**: track switching that keeps play/pause intent and volume.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lettuce_garden::config::Config;
//! use lettuce_garden::garden::{start_ticker, Garden};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let garden = Garden::standard();
//!     let ticker = start_ticker(garden.clone(), config.game.tick_interval());
//!
//!     garden.tap();
//!     println!("{:?}", garden.balance());
//!
//!     ticker.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`garden`] - economy store, catalogs, shared handle and ticker
//! - [`feeds`] - proxy strategies, parser and aggregator
//! - [`audio`] - track catalog and playback controller
//! - [`config`] - configuration loading and validation
//! - [`metrics`] - process-wide counters
//! - [`logutil`] - single-line log previews

pub mod audio;
pub mod config;
pub mod feeds;
pub mod garden;
pub mod logutil;
pub mod metrics;
