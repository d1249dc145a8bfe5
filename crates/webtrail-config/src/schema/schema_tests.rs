use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.browser.debug_port, 9222);
    assert_eq!(config.recorder.typing_debounce_ms, 800);
    assert_eq!(config.compiler.default_resolution_mode, "selectorFirst");
    assert_eq!(config.replay.max_retries, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_browser_config_default() {
    let browser = BrowserConfig::default();
    assert!(!browser.headless);
    assert_eq!(browser.viewport_width, 1280);
    assert_eq!(browser.viewport_height, 720);
    assert!(browser.chrome_path.is_none());
    assert!(browser.profile_dir.ends_with(".webtrail/browser-profile"));
}

#[test]
fn test_recorder_config_durations() {
    let recorder = RecorderConfig::default();
    assert_eq!(recorder.typing_debounce().as_millis(), 800);
    assert_eq!(recorder.backup_interval().as_millis(), 2000);
    assert_eq!(recorder.navigation_click_window().as_millis(), 1500);
    assert_eq!(recorder.injection_retries, 3);
    assert!(recorder.capture_screenshots);
}

#[test]
fn test_compiler_config_default() {
    let compiler = CompilerConfig::default();
    assert_eq!(compiler.wait_gap_ms, 2000);
    assert_eq!(compiler.wait_min_ms, 1000);
    assert_eq!(compiler.wait_max_ms, 2000);
    assert!(RESOLUTION_MODES.contains(&compiler.default_resolution_mode.as_str()));
}

#[test]
fn test_replay_config_default() {
    let replay = ReplayConfig::default();
    assert_eq!(replay.retry_delay().as_millis(), 1000);
    assert!(!replay.stop_on_error);
    assert!(!replay.debug);
    assert!(replay.timeout().is_none());
}

#[test]
fn test_relaxation_config_default() {
    let relaxation = RelaxationConfig::default();
    assert_eq!(relaxation.base_tolerance, 5.0);
    assert_eq!(relaxation.tolerance_step, 7.5);
    assert_eq!(relaxation.max_tolerance, 50.0);
    assert_eq!(relaxation.base_min_confidence, 0.8);
    assert_eq!(relaxation.min_confidence_floor, 0.4);
}

#[test]
fn test_partial_section_keeps_defaults() {
    let json = r#"{"max_retries": 7}"#;
    let replay: ReplayConfig = serde_json::from_str(json).unwrap();
    assert_eq!(replay.max_retries, 7);
    assert_eq!(replay.retry_delay_ms, 1000);
}

#[test]
fn test_logging_dir_override() {
    let logging: LoggingConfig = serde_json::from_str(r#"{"dir": "/var/log/webtrail"}"#).unwrap();
    assert_eq!(logging.log_dir(), std::path::PathBuf::from("/var/log/webtrail"));
    assert!(LoggingConfig::default().log_dir().ends_with("logs"));
}
