use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use veil_overlay::{OverlaySettings, SettingsStore};

/// Setting keys for the overlay margins.
pub mod keys {
    pub const TOP_MARGIN_FEED: &str = "top_margin_feed";
    pub const TOP_MARGIN_SEARCH: &str = "top_margin_search";
    pub const BOTTOM_MARGIN: &str = "bottom_margin";
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Default on-disk location, under the platform's local data directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("veil").join("settings.db"))
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

/// Repository for key/value settings persistence.
pub trait SettingsRepository {
    type Error;
    fn get_setting(&self, key: &str) -> std::result::Result<Option<String>, Self::Error>;
    fn set_setting(&self, key: &str, value: &str) -> std::result::Result<(), Self::Error>;
    fn delete_setting(&self, key: &str) -> std::result::Result<(), Self::Error>;
    fn load_overlay_settings(&self) -> std::result::Result<OverlaySettings, Self::Error>;
    fn save_overlay_settings(
        &self,
        settings: &OverlaySettings,
    ) -> std::result::Result<(), Self::Error>;
}

impl SettingsRepository for Database {
    type Error = StorageError;

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("setting {key}")));
        }
        Ok(())
    }

    /// Missing or malformed values fall back to the defaults; all values are
    /// clamped into range.
    fn load_overlay_settings(&self) -> Result<OverlaySettings> {
        let defaults = OverlaySettings::default();
        let top_feed = self.read_margin(keys::TOP_MARGIN_FEED, defaults.top_margin_feed)?;
        let top_search = self.read_margin(keys::TOP_MARGIN_SEARCH, defaults.top_margin_search)?;
        let bottom = self.read_margin(keys::BOTTOM_MARGIN, defaults.bottom_margin)?;
        Ok(OverlaySettings::clamped_from(top_feed, top_search, bottom))
    }

    fn save_overlay_settings(&self, settings: &OverlaySettings) -> Result<()> {
        let settings = settings.clamped();
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;
        for (key, value) in [
            (keys::TOP_MARGIN_FEED, settings.top_margin_feed),
            (keys::TOP_MARGIN_SEARCH, settings.top_margin_search),
            (keys::BOTTOM_MARGIN, settings.bottom_margin),
        ] {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                (key, value.to_string()),
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl Database {
    fn read_margin(&self, key: &str, default: u32) -> Result<i64> {
        let Some(raw) = self.get_setting(key)? else {
            return Ok(default.into());
        };
        match raw.trim().parse::<i64>() {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(key, value = %raw, error = %err, "malformed setting, using default");
                Ok(default.into())
            }
        }
    }
}

/// [`SettingsStore`] persisted in SQLite.
///
/// Saves are clamped, written, then broadcast to subscribers.
pub struct SqliteSettingsStore {
    db: Arc<Database>,
    tx: watch::Sender<OverlaySettings>,
}

impl SqliteSettingsStore {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let settings = db.load_overlay_settings()?;
        tracing::info!(
            top_feed = settings.top_margin_feed,
            top_search = settings.top_margin_search,
            bottom = settings.bottom_margin,
            "overlay settings loaded"
        );
        let (tx, _rx) = watch::channel(settings);
        Ok(Self { db, tx })
    }

    /// Persist `settings` and notify subscribers. Returns the stored value.
    pub fn save(&self, settings: OverlaySettings) -> Result<OverlaySettings> {
        let settings = settings.clamped();
        self.db.save_overlay_settings(&settings)?;
        self.tx.send_replace(settings);
        Ok(settings)
    }

    /// Reread the database, e.g. after another process wrote to it.
    pub fn reload(&self) -> Result<OverlaySettings> {
        let settings = self.db.load_overlay_settings()?;
        self.tx.send_if_modified(|current| {
            let changed = *current != settings;
            *current = settings;
            changed
        });
        Ok(settings)
    }

    /// Export the current settings as JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.load())?)
    }

    /// Import settings from JSON; fields are clamped, missing ones default.
    pub fn import_json(&self, json: &str) -> Result<OverlaySettings> {
        let settings: OverlaySettings = serde_json::from_str(json)?;
        self.save(settings)
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> OverlaySettings {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<OverlaySettings> {
        self.tx.subscribe()
    }
}
