//! Overlay margin settings and the store abstraction.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Upper bound for every margin, in pixels.
pub const MAX_MARGIN: u32 = 500;

pub const DEFAULT_TOP_MARGIN_FEED: u32 = 100;
pub const DEFAULT_TOP_MARGIN_SEARCH: u32 = 150;
pub const DEFAULT_BOTTOM_MARGIN: u32 = 100;

/// Margins applied to the feed and search bands.
///
/// Values are clamped to `[0, MAX_MARGIN]` on construction and on
/// deserialization; out-of-range input is never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOverlaySettings")]
pub struct OverlaySettings {
    pub top_margin_feed: u32,
    pub top_margin_search: u32,
    pub bottom_margin: u32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            top_margin_feed: DEFAULT_TOP_MARGIN_FEED,
            top_margin_search: DEFAULT_TOP_MARGIN_SEARCH,
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
        }
    }
}

impl OverlaySettings {
    /// Build from unchecked integers, clamping each into range.
    pub fn clamped_from(top_margin_feed: i64, top_margin_search: i64, bottom_margin: i64) -> Self {
        Self {
            top_margin_feed: clamp_margin(top_margin_feed),
            top_margin_search: clamp_margin(top_margin_search),
            bottom_margin: clamp_margin(bottom_margin),
        }
    }

    pub fn clamped(self) -> Self {
        Self::clamped_from(
            self.top_margin_feed.into(),
            self.top_margin_search.into(),
            self.bottom_margin.into(),
        )
    }
}

pub fn clamp_margin(value: i64) -> u32 {
    value.clamp(0, MAX_MARGIN as i64) as u32
}

#[derive(Deserialize)]
struct RawOverlaySettings {
    #[serde(default = "raw_top_feed")]
    top_margin_feed: i64,
    #[serde(default = "raw_top_search")]
    top_margin_search: i64,
    #[serde(default = "raw_bottom")]
    bottom_margin: i64,
}

fn raw_top_feed() -> i64 {
    DEFAULT_TOP_MARGIN_FEED.into()
}

fn raw_top_search() -> i64 {
    DEFAULT_TOP_MARGIN_SEARCH.into()
}

fn raw_bottom() -> i64 {
    DEFAULT_BOTTOM_MARGIN.into()
}

impl From<RawOverlaySettings> for OverlaySettings {
    fn from(raw: RawOverlaySettings) -> Self {
        Self::clamped_from(raw.top_margin_feed, raw.top_margin_search, raw.bottom_margin)
    }
}

/// Source of [`OverlaySettings`] with change notification.
pub trait SettingsStore: Send + Sync {
    /// Current settings.
    fn load(&self) -> OverlaySettings;

    /// Receiver that observes every subsequent update.
    fn subscribe(&self) -> watch::Receiver<OverlaySettings>;
}

/// Shared reference to a settings store.
pub type SettingsStoreRef = std::sync::Arc<dyn SettingsStore>;

/// Non-persistent store for tests and headless runs.
pub struct InMemorySettingsStore {
    tx: watch::Sender<OverlaySettings>,
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new(OverlaySettings::default())
    }
}

impl InMemorySettingsStore {
    pub fn new(settings: OverlaySettings) -> Self {
        let (tx, _rx) = watch::channel(settings.clamped());
        Self { tx }
    }

    /// Replace the settings and notify subscribers.
    pub fn update(&self, settings: OverlaySettings) {
        self.tx.send_replace(settings.clamped());
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> OverlaySettings {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<OverlaySettings> {
        self.tx.subscribe()
    }
}
