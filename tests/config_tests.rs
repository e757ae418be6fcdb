use netmon_dashboard::cli::{handle_init_command, sample_report};
use netmon_dashboard::config::settings::MAX_WINDOW_SPAN_SECS;
use netmon_dashboard::config::{Settings, SignalAlertPolicy};
use netmon_dashboard::errors::ConfigError;
use std::fs;

#[test]
fn defaults_match_the_documented_values() {
    let settings = Settings::default();
    assert_eq!(settings.monitoring.interval_ms, 3000);
    assert_eq!(settings.thresholds.latency_high, 25.0);
    assert_eq!(settings.thresholds.download_low, 40.0);
    assert_eq!(settings.thresholds.upload_low, 15.0);
    assert_eq!(settings.thresholds.speed_low, 5.0);
    assert_eq!(settings.thresholds.ping_high, 100.0);
    assert_eq!(settings.thresholds.speed_excellent, 100.0);
    assert_eq!(settings.thresholds.signal_weak, 30.0);
    assert!(settings.validate().is_ok());
}

#[test]
fn partial_file_overrides_only_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[monitoring]\ninterval_ms = 1000\n\n[notifications]\nsignal_policy = \"on_transition\"\n",
    )
    .unwrap();

    let settings = Settings::load_from(dir.path()).unwrap();
    assert_eq!(settings.monitoring.interval_ms, 1000);
    assert_eq!(settings.monitoring.history_size, 20);
    assert_eq!(settings.notifications.signal_policy, SignalAlertPolicy::OnTransition);
    assert_eq!(settings.thresholds.ping_high, 100.0);
}

#[test]
fn local_file_wins_over_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.toml"), "[thresholds]\nping_high = 80.0\n").unwrap();
    fs::write(dir.path().join("local.toml"), "[thresholds]\nping_high = 60.0\n").unwrap();

    let settings = Settings::load_from(dir.path()).unwrap();
    assert_eq!(settings.thresholds.ping_high, 60.0);
}

#[test]
fn missing_directory_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(&dir.path().join("nowhere")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn zero_period_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.toml"), "[monitoring]\ninterval_ms = 0\n").unwrap();

    match Settings::load_from(dir.path()) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "monitoring.interval_ms"),
        other => panic!("expected invalid interval, got {:?}", other),
    }
}

#[test]
fn init_writes_a_loadable_file_and_respects_force() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");

    handle_init_command(&config_dir, false).unwrap();
    let written = fs::read_to_string(config_dir.join("default.toml")).unwrap();
    assert!(written.contains("interval_ms = 3000"));
    assert_eq!(Settings::load_from(&config_dir).unwrap(), Settings::default());

    fs::write(config_dir.join("default.toml"), "[monitoring]\ninterval_ms = 500\n").unwrap();
    handle_init_command(&config_dir, false).unwrap();
    assert_eq!(Settings::load_from(&config_dir).unwrap().monitoring.interval_ms, 500);

    handle_init_command(&config_dir, true).unwrap();
    assert_eq!(Settings::load_from(&config_dir).unwrap().monitoring.interval_ms, 3000);
}

#[test]
fn sample_report_honours_window_override() {
    let report = sample_report(&Settings::default(), Some(5), Some(8)).unwrap();
    assert_eq!(report.samples.len(), 8);
    assert!(report.anomalies.iter().all(|a| a.value > 25.0));
}

#[test]
fn sample_window_span_is_bounded() {
    let mut settings = Settings::default();

    settings.samples.spacing_secs = 10_000_000_000_000;
    match settings.validate() {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "samples.spacing_secs"),
        other => panic!("expected invalid spacing, got {:?}", other),
    }

    settings.samples.spacing_secs = u64::MAX;
    assert!(settings.validate().is_err());

    settings.samples.window_size = 2;
    settings.samples.spacing_secs = MAX_WINDOW_SPAN_SECS;
    assert!(settings.validate().is_ok());
    settings.samples.spacing_secs = MAX_WINDOW_SPAN_SECS + 1;
    assert!(settings.validate().is_err());
}

#[test]
fn oversized_spacing_in_a_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[samples]\nspacing_secs = 10000000000000\n",
    )
    .unwrap();

    assert!(matches!(
        Settings::load_from(dir.path()),
        Err(ConfigError::Invalid { field: "samples.spacing_secs", .. })
    ));
}
