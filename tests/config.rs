use std::env;
use std::fs;
use std::path::PathBuf;

use glsamples::AppConfig;

fn temp_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("glsamples-{}-{}", std::process::id(), name));
    path
}

#[test]
fn defaults() {
    let config = AppConfig::default();
    assert_eq!(config.title, "");
    assert_eq!(config.width, 800);
    assert_eq!(config.height, 600);
    assert_eq!(config.multisample, 0);
    assert!(config.vsync);
    assert!(!config.fullscreen);
}

#[test]
fn builders() {
    let config = AppConfig::new("cube").with_size(1280, 720).with_multisample(8);
    assert_eq!(config.title, "cube");
    assert_eq!(config.width, 1280);
    assert_eq!(config.height, 720);
    assert_eq!(config.multisample, 8);
}

#[test]
fn round_trips_through_a_file() {
    let path = temp_path("round-trip.json");
    let config = AppConfig::new("demo").with_size(1024, 768);
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = AppConfig::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn partial_files_use_defaults() {
    let path = temp_path("partial.json");
    fs::write(&path, r#"{"width": 2560, "height": 1440}"#).unwrap();

    let loaded = AppConfig::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded.width, 2560);
    assert_eq!(loaded.height, 1440);
    assert_eq!(loaded.title, "");
    assert!(loaded.vsync);
}

#[test]
fn missing_files_are_an_error() {
    let err = AppConfig::from_file("/nonexistent/glsamples.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/glsamples.json"));
}

#[test]
fn broken_files_are_an_error() {
    let path = temp_path("broken.json");
    fs::write(&path, "{not json").unwrap();

    let result = AppConfig::from_file(&path);
    fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}

#[test]
fn settings_file_overrides_the_sample_config() {
    let path = temp_path("settings.json");
    fs::write(&path, r#"{"width": 320, "height": 200}"#).unwrap();

    env::set_var("GLSAMPLES_SETTINGS", &path);
    let config = AppConfig::for_sample("stars");
    env::remove_var("GLSAMPLES_SETTINGS");
    fs::remove_file(&path).unwrap();

    assert_eq!(config.width, 320);
    assert_eq!(config.height, 200);
    assert_eq!(config.title, "stars");
}
