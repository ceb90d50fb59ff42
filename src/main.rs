//! Binary entrypoint for the Lettuce Garden CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `play [--seconds <n>] [--taps-per-second <n>]` - run a simulated session and print the final garden
//! - `feeds` - fetch every enabled feed and print the merged list
//! - `catalog` - list upgrades, decorations and themes
//! - `tracks` - list ambient tracks by collection
//!
//! See the library crate docs for module-level details: `lettuce_garden::`.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::Rng;

use lettuce_garden::audio::{self, AudioController, LoggingSink, TrackCollection};
use lettuce_garden::config::Config;
use lettuce_garden::garden::{
    load_emoji_catalog, start_ticker, Catalog, EmojiCostCurve, Garden, GardenStore, Position,
};
use lettuce_garden::metrics;

#[derive(Parser)]
#[command(name = "lettuce-garden")]
#[command(about = "Headless core for the Lettuce Garden clicker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Run a simulated play session
    Play {
        /// How long to play
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
        /// Simulated taps per second (1-1000)
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=1000))]
        taps_per_second: u32,
    },
    /// Fetch and print the merged feed list
    Feeds,
    /// List purchasable upgrades, decorations and themes
    Catalog,
    /// List ambient tracks
    Tracks,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Missing config is fine for everything but an explicit load failure; defaults apply.
    let config = match cli.command {
        Commands::Init => None,
        _ => match Config::load(&cli.config).await {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("{e}; using built-in defaults");
                None
            }
        },
    };
    init_logging(&config, cli.verbose);
    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Play {
            seconds,
            taps_per_second,
        } => {
            config.validate()?;
            play(&config, seconds, taps_per_second).await?;
        }
        Commands::Feeds => {
            config.validate()?;
            #[cfg(not(feature = "http"))]
            {
                log::error!("Feeds requires the 'http' feature");
                std::process::exit(2);
            }
            #[cfg(feature = "http")]
            {
                use lettuce_garden::feeds::FeedAggregator;
                let aggregator = Arc::new(FeedAggregator::from_config(&config.feeds));
                let merged = aggregator.fetch_all().await;
                for (feed, outcome) in &merged.outcomes {
                    info!("feed {}: {:?}", feed, outcome);
                }
                for item in &merged.items {
                    println!(
                        "[{}] {} - {} ({})",
                        item.published.format("%Y-%m-%d %H:%M"),
                        item.source,
                        item.title,
                        item.link
                    );
                }
            }
        }
        Commands::Catalog => {
            let catalog = build_catalog(&config).await;
            println!("Upgrades:");
            for u in &catalog.upgrades {
                println!(
                    "  {:<14} {:>7}  +{} {:?} ({:?})  {}",
                    u.id, u.cost, u.increment, u.kind, u.limit, u.name
                );
            }
            println!("Decorations ({}):", catalog.decorations.len());
            for d in catalog.decorations.iter().take(40) {
                println!("  {} {:<28} {:>6}", d.glyph, d.name, d.cost);
            }
            println!("Themes:");
            for t in &catalog.themes {
                println!(
                    "  {:<10} {:>6}  {:?}  {}{}",
                    t.id,
                    t.cost,
                    t.motion,
                    t.preview.join(""),
                    if t.starter { "  (starter)" } else { "" }
                );
            }
        }
        Commands::Tracks => {
            for group in [TrackCollection::Bright, TrackCollection::Muted] {
                println!("{}:", group.label());
                for track in audio::collection(group) {
                    println!("  {:<18} {}", track.id, track.title);
                }
            }
        }
    }

    Ok(())
}

/// Standard catalog, with decorations generated from emoji data when configured.
async fn build_catalog(config: &Config) -> Catalog {
    let catalog = Catalog::standard();
    let Some(path) = &config.game.emoji_data_file else {
        return catalog;
    };
    let curve = EmojiCostCurve {
        base: config.game.emoji_base_cost,
        step: config.game.emoji_cost_step,
    };
    match load_emoji_catalog(path, curve).await {
        Ok(decorations) => catalog.with_decorations(decorations),
        Err(e) => {
            warn!("{} (keeping built-in decorations)", e);
            catalog
        }
    }
}

/// Simulated session: tap at a steady pace, reinvest in the cheapest upgrade,
/// buy and scatter a few decorations, then print the final garden.
async fn play(config: &Config, seconds: u64, taps_per_second: u32) -> Result<()> {
    let catalog = Arc::new(build_catalog(config).await);
    let garden = Garden::new(GardenStore::with_settings(
        catalog.clone(),
        config.game.base_tap_value,
        &config.game.starter_theme,
    ));
    let ticker = start_ticker(garden.clone(), config.game.tick_interval());

    let music = AudioController::new(LoggingSink::default(), config.audio.volume, config.audio.settle_delay());
    if let Err(e) = music.select_track(&config.audio.default_track, config.audio.autoplay).await {
        warn!("ambient audio unavailable: {}", e);
    }

    let mut cadence = tokio::time::interval(tap_period(taps_per_second));
    let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
    let mut rng = rand::thread_rng();

    while tokio::time::Instant::now() < deadline {
        cadence.tick().await;
        garden.tap();

        let cheapest = garden.read(|s| {
            s.affordable_upgrades()
                .into_iter()
                .min_by_key(|u| u.cost)
                .map(|u| u.id.clone())
        });
        if let Some(id) = cheapest {
            match garden.purchase_upgrade(&id) {
                Ok(receipt) => info!(
                    "bought {} (#{}) -> {}/s, {}/tap",
                    receipt.upgrade_id, receipt.owned, receipt.production_rate, receipt.tap_value
                ),
                Err(e) => warn!("purchase refused: {}", e),
            }
        }

        if rng.gen_ratio(1, 10) {
            let Some(decoration) = catalog.decorations.first() else {
                continue;
            };
            if garden.purchase_decoration(&decoration.id).is_ok() {
                let position = Position::new(rng.gen_range(0.0..320.0), rng.gen_range(0.0..480.0));
                if let Err(e) = garden.place_decoration(&decoration.id, position) {
                    warn!("placement refused: {}", e);
                }
            }
        }
    }

    if let Some(stats) = ticker.snapshot().await {
        info!("ticker: {} ticks, {} credited", stats.ticks, stats.credited);
    }
    ticker.shutdown().await;
    if let Err(e) = music.pause() {
        warn!("ambient audio did not pause: {}", e);
    }

    println!("{}", serde_json::to_string_pretty(&garden.snapshot())?);
    println!("{:?}", metrics::snapshot());
    Ok(())
}

/// Interval between simulated taps; never zero.
fn tap_period(taps_per_second: u32) -> Duration {
    Duration::from_millis(1000 / taps_per_second.clamp(1, 1000) as u64)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let file = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_period_is_never_zero() {
        assert_eq!(tap_period(5), Duration::from_millis(200));
        assert_eq!(tap_period(1000), Duration::from_millis(1));
        assert_eq!(tap_period(2000), Duration::from_millis(1));
        assert_eq!(tap_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_taps_per_second_range_enforced() {
        assert!(Cli::try_parse_from(["lettuce-garden", "play", "--taps-per-second", "2000"]).is_err());
        assert!(Cli::try_parse_from(["lettuce-garden", "play", "--taps-per-second", "0"]).is_err());
        let cli = Cli::try_parse_from(["lettuce-garden", "play", "--taps-per-second", "1000"]).unwrap();
        assert!(matches!(cli.command, Commands::Play { taps_per_second: 1000, .. }));
    }

    #[tokio::test]
    async fn test_session_teardown_leaves_stopped_track_stopped() {
        let music = AudioController::new(LoggingSink::default(), 0.5, Duration::ZERO);
        music.select_track("sunny-meadow", false).await.unwrap();
        music.pause().unwrap();
        assert!(!music.snapshot().playing);

        music.select_track("sunny-meadow", true).await.unwrap();
        assert!(music.snapshot().playing);
        music.pause().unwrap();
        assert!(!music.snapshot().playing);
    }
}
