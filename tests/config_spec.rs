use std::fs;
use std::path::{Path, PathBuf};

use habitkeep::config::AppConfig;
use habitkeep_core::DEFAULT_SLOT_CAPACITY;
use speculate2::speculate;

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("habitkeep").join("config.json");
    }

    describe "load_from" {
        it "returns defaults when the file is missing" {
            let config = AppConfig::load_from(&config_path).expect("load");

            assert_eq!(config, AppConfig::default());
            assert_eq!(config.slot_capacity, DEFAULT_SLOT_CAPACITY);
        }

        it "fills missing fields with defaults" {
            fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
            fs::write(&config_path, r#"{ "log_filter": "habitkeep=debug" }"#).expect("seed");

            let config = AppConfig::load_from(&config_path).expect("load");

            assert_eq!(config.log_filter.as_deref(), Some("habitkeep=debug"));
            assert_eq!(config.slot_capacity, DEFAULT_SLOT_CAPACITY);
        }

        it "rejects a zero slot capacity" {
            fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
            fs::write(&config_path, r#"{ "slot_capacity": 0 }"#).expect("seed");

            assert!(AppConfig::load_from(&config_path).is_err());
        }

        it "rejects malformed JSON" {
            fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
            fs::write(&config_path, "slot_capacity = 3").expect("seed");

            assert!(AppConfig::load_from(&config_path).is_err());
        }
    }

    describe "save_to" {
        it "round-trips through disk" {
            let config = AppConfig {
                data_file: Some(PathBuf::from("/var/lib/habits.json")),
                slot_capacity: 3,
                log_filter: None,
            };

            config.save_to(&config_path).expect("save");
            let loaded = AppConfig::load_from(&config_path).expect("load");

            assert_eq!(loaded, config);
        }
    }

    describe "resolve_data_file" {
        it "prefers the explicit flag" {
            let config = AppConfig {
                data_file: Some(PathBuf::from("/configured.json")),
                ..AppConfig::default()
            };

            let resolved = config.resolve_data_file(Some(Path::new("/flag.json"))).expect("resolve");

            assert_eq!(resolved, PathBuf::from("/flag.json"));
        }

        it "ends in habits.json by default" {
            if std::env::var_os(habitkeep::config::DATA_ENV).is_some() {
                return;
            }
            let resolved = AppConfig::default().resolve_data_file(None).expect("resolve");
            assert_eq!(resolved.file_name().and_then(|n| n.to_str()), Some("habits.json"));
        }
    }
}
