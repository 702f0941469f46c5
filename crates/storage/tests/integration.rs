//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use std::sync::Arc;
use veil_overlay::{OverlaySettings, SettingsStore, MAX_MARGIN};
use veil_storage::{keys, Database, SettingsRepository, SqliteSettingsStore, StorageError};

fn create_test_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn custom_settings() -> OverlaySettings {
    OverlaySettings {
        top_margin_feed: 120,
        top_margin_search: 180,
        bottom_margin: 90,
    }
}

// =============================================================================
// Database Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(&db_path);
        assert!(db.is_ok(), "Should create file-based database");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.save_overlay_settings(&custom_settings()).unwrap();
        }

        {
            let db = Database::open(&db_path).unwrap();
            let settings = db.load_overlay_settings().unwrap();
            assert_eq!(settings, custom_settings(), "Settings should persist after reopen");
        }
    }

    #[test]
    fn test_default_path_is_namespaced() {
        if let Some(path) = veil_storage::default_database_path() {
            assert!(path.ends_with("veil/settings.db"));
        }
    }
}

// =============================================================================
// Key/Value Settings Tests
// =============================================================================

mod key_value {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let db = create_test_db();
        assert_eq!(db.get_setting("nope").unwrap(), None);
    }

    #[test]
    fn test_set_and_overwrite() {
        let db = create_test_db();
        db.set_setting("theme", "dark").unwrap();
        db.set_setting("theme", "light").unwrap();
        assert_eq!(db.get_setting("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_delete_setting() {
        let db = create_test_db();
        db.set_setting("theme", "dark").unwrap();
        db.delete_setting("theme").unwrap();
        assert_eq!(db.get_setting("theme").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_setting_fails() {
        let db = create_test_db();
        let result = db.delete_setting("nope");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}

// =============================================================================
// Overlay Settings Tests
// =============================================================================

mod overlay_settings {
    use super::*;

    #[test]
    fn test_empty_database_yields_defaults() {
        let db = create_test_db();
        assert_eq!(db.load_overlay_settings().unwrap(), OverlaySettings::default());
    }

    #[test]
    fn test_roundtrip_uses_documented_keys() {
        let db = create_test_db();
        db.save_overlay_settings(&custom_settings()).unwrap();

        assert_eq!(db.get_setting(keys::TOP_MARGIN_FEED).unwrap().as_deref(), Some("120"));
        assert_eq!(db.get_setting(keys::TOP_MARGIN_SEARCH).unwrap().as_deref(), Some("180"));
        assert_eq!(db.get_setting(keys::BOTTOM_MARGIN).unwrap().as_deref(), Some("90"));
        assert_eq!(db.load_overlay_settings().unwrap(), custom_settings());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let db = create_test_db();
        db.set_setting(keys::TOP_MARGIN_FEED, "-40").unwrap();
        db.set_setting(keys::BOTTOM_MARGIN, "12000").unwrap();

        let settings = db.load_overlay_settings().unwrap();
        assert_eq!(settings.top_margin_feed, 0);
        assert_eq!(settings.bottom_margin, MAX_MARGIN);
    }

    #[test]
    fn test_malformed_value_falls_back_to_default() {
        let db = create_test_db();
        db.set_setting(keys::TOP_MARGIN_SEARCH, "wide").unwrap();

        let settings = db.load_overlay_settings().unwrap();
        assert_eq!(settings.top_margin_search, OverlaySettings::default().top_margin_search);
    }
}

// =============================================================================
// Settings Store Tests
// =============================================================================

mod store {
    use super::*;

    fn create_store() -> (Arc<Database>, SqliteSettingsStore) {
        let db = Arc::new(create_test_db());
        let store = SqliteSettingsStore::new(Arc::clone(&db)).unwrap();
        (db, store)
    }

    #[test]
    fn test_load_reflects_database() {
        let db = Arc::new(create_test_db());
        db.save_overlay_settings(&custom_settings()).unwrap();

        let store = SqliteSettingsStore::new(db).unwrap();
        assert_eq!(store.load(), custom_settings());
    }

    #[test]
    fn test_save_persists_and_notifies() {
        let (db, store) = create_store();
        let mut rx = store.subscribe();

        let stored = store
            .save(OverlaySettings {
                top_margin_feed: 999,
                ..custom_settings()
            })
            .unwrap();

        assert_eq!(stored.top_margin_feed, MAX_MARGIN);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), stored);
        assert_eq!(db.load_overlay_settings().unwrap(), stored);
        assert_eq!(store.load(), stored);
    }

    #[test]
    fn test_reload_only_notifies_on_change() {
        let (db, store) = create_store();
        let mut rx = store.subscribe();

        store.reload().unwrap();
        assert!(!rx.has_changed().unwrap());

        db.save_overlay_settings(&custom_settings()).unwrap();
        assert_eq!(store.reload().unwrap(), custom_settings());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), custom_settings());
    }

    #[test]
    fn test_json_import_export() {
        let (_db, store) = create_store();

        let imported = store
            .import_json(r#"{"top_margin_feed": 60, "bottom_margin": -3}"#)
            .unwrap();
        assert_eq!(imported.top_margin_feed, 60);
        assert_eq!(imported.bottom_margin, 0);
        assert_eq!(imported.top_margin_search, OverlaySettings::default().top_margin_search);

        let exported = store.export_json().unwrap();
        assert!(exported.contains("\"top_margin_feed\":60"));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let (_db, store) = create_store();
        let result = store.import_json("not json");
        assert!(matches!(result, Err(StorageError::SerializationError(_))));
        assert_eq!(store.load(), OverlaySettings::default());
    }
}
