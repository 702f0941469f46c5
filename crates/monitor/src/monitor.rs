//! The monitor event loop.
//!
//! One task owns every piece of mutable state: the poll session, the
//! detection tracker and the orchestrator. Tree-change notifications,
//! settings updates and timer firings are all messages handled one at a time,
//! so nothing here needs a lock.

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::filter::{EventFilter, TreeChangeEvent};
use crate::scheduler::{Scheduler, TimerFired, TimerKey};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use veil_context::{
    detect, DetectionStateTracker, ForegroundAppProvider, PollSession, PollingController,
    Transition, UiTreeProvider,
};
use veil_events::{EventBusRef, MonitorEvent};
use veil_overlay::{
    BlockingSummary, OverlayOrchestrator, OverlaySettings, ReconcileOutcome, SettingsStoreRef,
    SurfaceHost,
};

#[derive(Debug)]
enum Command {
    TreeChanged(TreeChangeEvent),
    PollNow,
}

/// Cloneable handle for talking to a running [`Monitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<BlockingSummary>,
    session: watch::Receiver<PollSession>,
    cancel: CancellationToken,
}

impl MonitorHandle {
    /// Deliver a tree-change notification from the platform.
    pub fn notify_tree_changed(&self, event: TreeChangeEvent) -> Result<(), MonitorError> {
        self.send(Command::TreeChanged(event))
    }

    /// Run a foreground poll now instead of waiting for the next tick.
    pub fn poll_now(&self) -> Result<(), MonitorError> {
        self.send(Command::PollNow)
    }

    fn send(&self, command: Command) -> Result<(), MonitorError> {
        if self.cancel.is_cancelled() {
            return Err(MonitorError::Stopped);
        }
        self.commands.send(command).map_err(|_| MonitorError::Stopped)
    }

    /// Latest blocking summary.
    pub fn status(&self) -> BlockingSummary {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<BlockingSummary> {
        self.status.clone()
    }

    pub fn poll_session(&self) -> PollSession {
        *self.session.borrow()
    }

    /// Stop the loop. Pending timers are cancelled and all surfaces removed.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.commands.is_closed()
    }
}

/// Owns detection, orchestration and timing for one monitoring service.
pub struct Monitor<T: UiTreeProvider> {
    config: MonitorConfig,
    foreground: Arc<dyn ForegroundAppProvider>,
    tree: Arc<T>,
    events: EventBusRef,
    settings: watch::Receiver<OverlaySettings>,
    filter: EventFilter,
    polling: PollingController,
    tracker: DetectionStateTracker,
    orchestrator: OverlayOrchestrator,
    scheduler: Scheduler,
    timers: mpsc::UnboundedReceiver<TimerFired>,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<BlockingSummary>,
    session: watch::Sender<PollSession>,
    cancel: CancellationToken,
    last_pass: Option<Instant>,
    force_reconcile: bool,
}

impl<T> Monitor<T>
where
    T: UiTreeProvider + 'static,
{
    pub fn new(
        config: MonitorConfig,
        foreground: Arc<dyn ForegroundAppProvider>,
        tree: Arc<T>,
        host: Box<dyn SurfaceHost>,
        settings: SettingsStoreRef,
        events: EventBusRef,
    ) -> (Self, MonitorHandle) {
        let (scheduler, timers) = Scheduler::new();
        let (command_tx, commands) = mpsc::unbounded_channel();
        let settings_rx = settings.subscribe();
        let orchestrator = OverlayOrchestrator::new(host, settings.load());
        let polling = PollingController::with_intervals(
            config.packages.iter().cloned(),
            config.open_poll_interval(),
            config.closed_poll_interval(),
        );
        let (status_tx, status_rx) = watch::channel(orchestrator.summary());
        let (session_tx, session_rx) = watch::channel(polling.session());
        let cancel = CancellationToken::new();

        let handle = MonitorHandle {
            commands: command_tx,
            status: status_rx,
            session: session_rx,
            cancel: cancel.clone(),
        };

        let monitor = Self {
            filter: EventFilter::from_config(&config),
            config,
            foreground,
            tree,
            events,
            settings: settings_rx,
            polling,
            tracker: DetectionStateTracker::new(),
            orchestrator,
            scheduler,
            timers,
            commands,
            status: status_tx,
            session: session_tx,
            cancel,
            last_pass: None,
            force_reconcile: false,
        };

        (monitor, handle)
    }

    /// Build and spawn onto the current runtime.
    pub fn spawn(
        config: MonitorConfig,
        foreground: Arc<dyn ForegroundAppProvider>,
        tree: Arc<T>,
        host: Box<dyn SurfaceHost>,
        settings: SettingsStoreRef,
        events: EventBusRef,
    ) -> (MonitorHandle, JoinHandle<()>) {
        let (monitor, handle) = Self::new(config, foreground, tree, host, settings, events);
        (handle, tokio::spawn(monitor.run()))
    }

    /// Run until shut down or every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(packages = ?self.config.packages, "monitor started");
        let cancel = self.cancel.clone();
        let mut settings_live = true;

        self.poll_tick();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(fired) = self.timers.recv() => self.handle_timer(fired),
                changed = self.settings.changed(), if settings_live => match changed {
                    Ok(()) => self.settings_changed(),
                    Err(_) => {
                        tracing::warn!("settings source dropped; keeping current settings");
                        settings_live = false;
                    }
                },
            }
        }

        self.teardown();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::TreeChanged(event) => self.tree_changed(event),
            Command::PollNow => self.poll_tick(),
        }
    }

    fn handle_timer(&mut self, fired: TimerFired) {
        if !self.scheduler.accept(fired) {
            return;
        }
        match fired.key {
            TimerKey::Poll => self.poll_tick(),
            TimerKey::Detection => self.request_detection(),
            TimerKey::Reconcile => self.reconcile(),
            TimerKey::Transition => {
                self.orchestrator.complete_transition();
                self.publish_status();
            }
        }
    }

    fn poll_tick(&mut self) {
        let foreground = self.foreground.current_foreground_package();
        match self.polling.tick(foreground.as_deref()) {
            Some(Transition::Opened { package }) => self.opened(package),
            Some(Transition::Closed) => self.closed(),
            None => {}
        }
        self.session.send_replace(self.polling.session());
        self.scheduler.schedule(TimerKey::Poll, self.polling.next_interval());
    }

    fn opened(&mut self, package: String) {
        self.events.emit(MonitorEvent::TargetOpened { package });
        self.orchestrator.on_open();
        self.force_reconcile = true;
        self.scheduler.schedule(TimerKey::Detection, self.config.detection_delay());
        self.publish_status();
    }

    fn closed(&mut self) {
        self.scheduler.cancel(TimerKey::Detection);
        self.scheduler.cancel(TimerKey::Reconcile);
        self.scheduler.cancel(TimerKey::Transition);
        self.orchestrator.on_close();
        self.tracker.clear();
        self.force_reconcile = false;
        self.last_pass = None;
        self.events.emit(MonitorEvent::TargetClosed);
        self.publish_status();
    }

    fn tree_changed(&mut self, event: TreeChangeEvent) {
        if !self.polling.is_open() {
            tracing::trace!(?event, "tree change while closed");
            return;
        }
        if !self.filter.accepts(&event) {
            tracing::trace!(?event, "tree change filtered");
            return;
        }
        self.request_detection();
    }

    /// Run a pass now, or defer one to the end of the rate-limit window.
    /// Requests inside the window collapse into that single deferred pass.
    fn request_detection(&mut self) {
        let min_interval = self.config.min_detection_interval();
        if let Some(last) = self.last_pass {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                if !self.scheduler.is_scheduled(TimerKey::Detection) {
                    self.scheduler.schedule(TimerKey::Detection, min_interval - elapsed);
                }
                return;
            }
        }
        self.detection_pass();
    }

    fn detection_pass(&mut self) {
        self.scheduler.cancel(TimerKey::Detection);
        self.last_pass = Some(Instant::now());
        let forced = std::mem::take(&mut self.force_reconcile);

        let Some(root) = self.tree.root_node() else {
            tracing::debug!("no UI tree available");
            if forced {
                self.scheduler
                    .schedule(TimerKey::Reconcile, self.config.reconcile_debounce());
            }
            return;
        };
        let state = detect(&root);
        self.tree.release(root);

        let observation = self.tracker.observe(state);

        if observation.back_button_appeared {
            tracing::debug!("back button appeared");
            self.orchestrator.on_back_button_detected();
            self.events.emit(MonitorEvent::BackButtonDetected);
            self.publish_status();
        }

        if observation.changed {
            self.events.emit(MonitorEvent::StateChanged {
                state: *self.tracker.current(),
            });
        }

        if observation.changed || forced {
            self.scheduler
                .schedule(TimerKey::Reconcile, self.config.reconcile_debounce());
        }
    }

    fn reconcile(&mut self) {
        let state = *self.tracker.current();
        match self.orchestrator.reconcile(&state) {
            ReconcileOutcome::Settled => self.scheduler.cancel(TimerKey::Transition),
            ReconcileOutcome::Transition(delay) => {
                self.scheduler.schedule(TimerKey::Transition, delay)
            }
        }
        self.publish_status();
    }

    fn settings_changed(&mut self) {
        let settings = *self.settings.borrow_and_update();
        if !self.orchestrator.update_settings(settings) {
            return;
        }
        if self.polling.is_open() && self.orchestrator.bands_relevant() {
            self.scheduler
                .schedule(TimerKey::Reconcile, self.config.reconcile_debounce());
        }
        self.publish_status();
    }

    fn publish_status(&mut self) {
        let summary = self.orchestrator.summary();
        let changed = self.status.send_if_modified(|current| {
            if *current == summary {
                return false;
            }
            *current = summary.clone();
            true
        });
        if changed {
            tracing::debug!(status = %summary, "status changed");
            self.events.emit(MonitorEvent::StatusChanged { summary });
        }
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if self.polling.is_open() {
            self.events.emit(MonitorEvent::TargetClosed);
        }
        self.orchestrator.on_close();
        self.tracker.clear();
        self.polling.reset();
        self.session.send_replace(self.polling.session());
        self.publish_status();
        self.cancel.cancel();
        tracing::info!("monitor stopped");
    }
}
