use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!podplay::config::Config::exists().unwrap());

    // Create and save a config
    let config = podplay::config::Config::new();
    config.save().unwrap();

    // Verify it exists now
    assert!(podplay::config::Config::exists().unwrap());

    // Load and verify defaults
    let loaded = podplay::config::Config::load().unwrap();
    assert_eq!(loaded.date_locale, "pt_BR");
    assert_eq!(loaded.seek_step_secs, 10);
    assert!(loaded.episodes_source.is_none());

    // Test config mutation
    let mut config = podplay::config::Config::load().unwrap();
    config
        .set_value("episodes_source", "~/podcasts/episodes.json")
        .unwrap();
    config.set_value("volume", "0.8").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = podplay::config::Config::load().unwrap();
    assert_eq!(
        reloaded.episodes_source.as_deref(),
        Some("~/podcasts/episodes.json")
    );
    assert_eq!(reloaded.volume, 0.8);
    assert_eq!(
        reloaded.resolve_source(None).unwrap(),
        "~/podcasts/episodes.json"
    );

    // Test invalid key
    let mut config = podplay::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
}
