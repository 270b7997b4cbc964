//! Loading progression configs from disk.

use onslaught::{
    Collaborators, LevelTypeTag, OnslaughtError, ProgressionConfig, ProgressionController,
    SequenceScheduler,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_config_file() {
    let file = write_config(
        r#"{
            "seed": 77,
            "starting_tier": 15,
            "comet_round_seconds": 45.0,
            "forced_level_type": "Comet"
        }"#,
    );

    let config = ProgressionConfig::load_from_json(file.path()).unwrap();
    assert_eq!(config.seed, Some(77));
    assert_eq!(config.starting_tier.get(), 15);
    assert_eq!(config.comet_round_seconds, 45.0);
    assert_eq!(config.forced_level_type().unwrap(), Some(LevelTypeTag::Comet));

    let mut controller =
        ProgressionController::new(config, SequenceScheduler::new(), Collaborators::headless()).unwrap();
    let level = controller.generate_next_level().unwrap();
    assert_eq!(level.tag(), LevelTypeTag::Comet);
    assert_eq!(level.tier().get(), 15);
}

#[test]
fn test_saved_config_reloads() {
    let config = ProgressionConfig::new(5).with_forced_level_type(LevelTypeTag::Invasion);
    let file = write_config(&config.to_json().unwrap());
    assert_eq!(ProgressionConfig::load_from_json(file.path()).unwrap(), config);
}

#[test]
fn test_zero_tier_in_file_is_rejected() {
    let file = write_config(r#"{"starting_tier": 0}"#);
    let err = ProgressionConfig::load_from_json(file.path()).unwrap_err();
    assert!(matches!(err, OnslaughtError::Serde(_)));
}

#[test]
fn test_unknown_level_type_in_file_is_rejected() {
    let file = write_config(r#"{"forced_level_type": "dreadnought"}"#);
    let err = ProgressionConfig::load_from_json(file.path()).unwrap_err();
    assert!(matches!(err, OnslaughtError::Configuration(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProgressionConfig::load_from_json(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, OnslaughtError::Io(_)));
}
