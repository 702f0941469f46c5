//! Replays a scripted session through the monitor and prints the outcome.
//!
//! ```text
//! veil-replay <scenario.json> [--db [path]]
//! ```
//!
//! Without `--db` settings live in memory and start from the scenario's
//! `settings`. With `--db` they are read from and saved to SQLite, at the
//! given path or the default location.

mod host;
mod scenario;

use anyhow::{bail, Context, Result};
use host::TracingSurfaceHost;
use scenario::{Scenario, Step};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use veil_context::SnapshotProvider;
use veil_events::TracingEventBus;
use veil_monitor::{Monitor, TreeChangeEvent, TreeEventCategory};
use veil_overlay::{InMemorySettingsStore, OverlaySettings, SettingsStoreRef};
use veil_storage::{default_database_path, Database, SqliteSettingsStore};

const USAGE: &str = "usage: veil-replay <scenario.json> [--db [path]]";

#[derive(Debug, PartialEq)]
struct Args {
    scenario: PathBuf,
    database: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter().peekable();
        let mut scenario = None;
        let mut database = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let path = match args.next_if(|next| !next.starts_with('-')) {
                        Some(path) => PathBuf::from(path),
                        None => default_database_path()
                            .context("no local data directory for the default database")?,
                    };
                    database = Some(path);
                }
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
                _ if scenario.is_none() => scenario = Some(PathBuf::from(arg)),
                _ => bail!("unexpected argument {arg}\n{USAGE}"),
            }
        }

        Ok(Self {
            scenario: scenario.context(USAGE)?,
            database,
        })
    }
}

enum SettingsBackend {
    Memory(Arc<InMemorySettingsStore>),
    Sqlite(Arc<SqliteSettingsStore>),
}

impl SettingsBackend {
    fn open(database: Option<&Path>, initial: Option<OverlaySettings>) -> Result<Self> {
        let Some(path) = database else {
            let store = InMemorySettingsStore::new(initial.unwrap_or_default());
            return Ok(Self::Memory(Arc::new(store)));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let db = Database::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        tracing::info!(path = %path.display(), "using settings database");
        if initial.is_some() {
            tracing::warn!("scenario settings ignored in favour of the database");
        }
        Ok(Self::Sqlite(Arc::new(SqliteSettingsStore::new(Arc::new(db))?)))
    }

    fn store(&self) -> SettingsStoreRef {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Sqlite(store) => store.clone(),
        }
    }

    fn apply(&self, settings: OverlaySettings) -> Result<()> {
        match self {
            Self::Memory(store) => store.update(settings),
            Self::Sqlite(store) => {
                store.save(settings)?;
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,veil=debug")),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let json = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read {}", args.scenario.display()))?;
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("invalid scenario {}", args.scenario.display()))?;

    tracing::info!(
        steps = scenario.steps.len(),
        duration_ms = scenario.duration_ms(),
        "starting replay"
    );

    let settings = SettingsBackend::open(args.database.as_deref(), scenario.settings)?;
    let provider = Arc::new(SnapshotProvider::new());
    let host = TracingSurfaceHost::new(scenario.display);
    let target = scenario.config.packages.first().cloned().unwrap_or_default();

    let (handle, task) = Monitor::spawn(
        scenario.config,
        provider.clone(),
        provider.clone(),
        Box::new(host.clone()),
        settings.store(),
        Arc::new(TracingEventBus),
    );

    for step in scenario.steps {
        match step {
            Step::Foreground(package) => {
                provider.set_foreground(package.as_deref());
                handle.poll_now()?;
            }
            Step::Tree(tree) => {
                provider.set_tree(tree);
                handle.notify_tree_changed(TreeChangeEvent::new(
                    target.clone(),
                    TreeEventCategory::WindowContentChanged,
                ))?;
            }
            Step::TreeEvent(event) => handle.notify_tree_changed(event)?,
            Step::Settings(update) => settings.apply(update)?,
            Step::WaitMs(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    println!("{}", handle.status());
    for spec in host.live() {
        println!("  {:<12} {}", spec.kind, spec.geometry);
    }

    handle.shutdown();
    task.await.context("monitor task failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_scenario_only() {
        let args = parse(&["session.json"]).unwrap();
        assert_eq!(args.scenario, PathBuf::from("session.json"));
        assert!(args.database.is_none());
    }

    #[test]
    fn test_explicit_database() {
        let args = parse(&["session.json", "--db", "/tmp/veil.db"]).unwrap();
        assert_eq!(args.database, Some(PathBuf::from("/tmp/veil.db")));
    }

    #[test]
    fn test_missing_scenario() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--verbose", "session.json"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_memory_backend_applies_updates() {
        let backend = SettingsBackend::open(None, None).unwrap();
        backend
            .apply(OverlaySettings {
                bottom_margin: 42,
                ..OverlaySettings::default()
            })
            .unwrap();
        assert_eq!(backend.store().load().bottom_margin, 42);
    }
}
