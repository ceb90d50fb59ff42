/// Configuration file round trips and validation failures.
use lettuce_garden::config::{Config, ProxyEnvelope, ProxyRequestStyle};
use tempfile::tempdir;

#[tokio::test]
async fn test_create_default_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path = path.to_str().unwrap();

    Config::create_default(path).await.unwrap();
    let config = Config::load(path).await.unwrap();

    config.validate().unwrap();
    assert_eq!(config.game.tick_interval_ms, 1000);
    assert_eq!(config.game.starter_theme, "classic");
    assert_eq!(config.feeds.proxies.len(), 3);
    assert_eq!(config.feeds.sources[0].id, "garden-news");
    assert_eq!(config.audio.default_track, "sunny-meadow");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_custom_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[game]
tick_interval_ms = 250
base_tap_value = 3

[feeds]
cache_ttl_minutes = 5

[[feeds.sources]]
id = "veg"
name = "Veg Weekly"
url = "https://veg.example/rss"

[[feeds.proxies]]
name = "direct-ish"
base = "https://relay.example/"
request = "path_concat"
response = "raw"

[[feeds.proxies]]
name = "wrapped"
base = "https://wrap.example/get?url="
request = "query_param"
response = { json = "body" }

[audio]
volume = 0.8
autoplay = true
"#,
    )
    .unwrap();

    let config = tokio_test::block_on(Config::load(path.to_str().unwrap())).unwrap();
    config.validate().unwrap();

    assert_eq!(config.game.tick_interval_ms, 250);
    assert_eq!(config.game.base_tap_value, 3);
    assert_eq!(config.game.starter_theme, "classic");
    assert_eq!(config.feeds.cache_ttl_minutes, 5);
    assert_eq!(config.feeds.timeout_seconds, 15);

    let source = &config.feeds.sources[0];
    assert!(source.enabled);
    assert_eq!(source.category, "");

    assert_eq!(config.feeds.proxies[0].request, ProxyRequestStyle::PathConcat);
    assert_eq!(config.feeds.proxies[0].response, ProxyEnvelope::Raw);
    assert_eq!(
        config.feeds.proxies[1].response,
        ProxyEnvelope::Json("body".to_string())
    );
    assert!(config.audio.autoplay);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = tokio_test::block_on(Config::load(path.to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = Config::default();
    config.feeds.proxies.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.feeds.sources.push(config.feeds.sources[0].clone());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate feed id"));

    let mut config = Config::default();
    config.feeds.sources[0].url = "ftp://veg.example/rss".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.audio.volume = 1.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.game.tick_interval_ms = 0;
    assert!(config.validate().is_err());
}
