// ── Refresh coordinator ──
//
// Full lifecycle management for one router: connection, periodic and
// on-demand refresh cycles, command routing, and configuration
// updates. Cycles are single-flight; a request that arrives while one
// is running shares its outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{BboxConnector, Connector, RouterApi};
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::CoordinatorConfig;
use crate::diagnostics;
use crate::domain::{DEFAULT_DOMAINS, DomainSpec};
use crate::error::CoreError;
use crate::isolate::call_isolated;
use crate::normalize::normalize_domain;
use crate::snapshot::Snapshot;
use crate::store::{RefreshStatus, SnapshotStore};
use crate::stream::SnapshotStream;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The router rejected the credential; a new password is needed.
    ReauthRequired,
    Failed,
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Owns the refresh
/// timer, the command processor, and the snapshot store.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: watch::Sender<Arc<CoordinatorConfig>>,
    connector: Arc<dyn Connector>,
    domains: Arc<[DomainSpec]>,
    periodic: bool,
    store: Arc<SnapshotStore>,
    api: Mutex<Option<Arc<dyn RouterApi>>>,
    /// Held for the whole of a cycle. Nothing else talks to the router
    /// through a read endpoint while it is held.
    cycle_lock: Mutex<()>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Per-connection token, replaced on every `connect()`.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator that talks HTTP to the router. Does NOT
    /// connect; call [`connect()`](Self::connect).
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_connector(config, Arc::new(BboxConnector))
    }

    /// Create a coordinator with a custom connector and the default
    /// domain table.
    pub fn with_connector(config: CoordinatorConfig, connector: Arc<dyn Connector>) -> Self {
        Self::build(config, connector, DEFAULT_DOMAINS.into(), true)
    }

    /// Create a coordinator polling a custom domain table.
    pub fn with_domains(
        config: CoordinatorConfig,
        connector: Arc<dyn Connector>,
        domains: Vec<DomainSpec>,
    ) -> Self {
        Self::build(config, connector, domains.into(), true)
    }

    fn build(
        config: CoordinatorConfig,
        connector: Arc<dyn Connector>,
        domains: Arc<[DomainSpec]>,
        periodic: bool,
    ) -> Self {
        let (config, _) = watch::channel(Arc::new(config));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                connector,
                domains,
                periodic,
                store: Arc::new(SnapshotStore::new()),
                api: Mutex::new(None),
                cycle_lock: Mutex::new(()),
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The configuration currently in force.
    pub fn config(&self) -> Arc<CoordinatorConfig> {
        self.inner.config.borrow().clone()
    }

    /// Access the underlying snapshot store.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    /// The domains polled on every cycle, in call order.
    pub fn domains(&self) -> &[DomainSpec] {
        &self.inner.domains
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the router.
    ///
    /// Logs in, runs a first refresh cycle (its failure fails the
    /// connect), then spawns the periodic refresh task and the command
    /// processor. A no-op while a session is open or being opened.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.api.lock().await.is_some() {
            debug!("connect ignored, session already open");
            return Ok(());
        }
        let mut claimed = false;
        self.inner.connection_state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                return false;
            }
            *state = ConnectionState::Connecting;
            claimed = true;
            true
        });
        if !claimed {
            debug!("connect ignored, already connecting");
            return Ok(());
        }

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = self.config();
        if let Err(e) = self.open(&config).await {
            self.mark_failed(&e);
            return Err(e);
        }

        if let Err(e) = self.refresh().await {
            if let Some(api) = self.inner.api.lock().await.take() {
                api.close().await;
            }
            self.mark_failed(&e);
            return Err(e);
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let coordinator = self.clone();
            handles.push(tokio::spawn(command_processor_task(
                coordinator,
                rx,
                child.clone(),
            )));
        }

        if self.inner.periodic {
            let coordinator = self.clone();
            let config_rx = self.inner.config.subscribe();
            handles.push(tokio::spawn(refresh_task(coordinator, config_rx, child)));
        }

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(host = %config.host, "connected to router");
        Ok(())
    }

    /// Disconnect from the router.
    ///
    /// Cancels background tasks, closes the session, and resets the
    /// connection state. The last published snapshot stays readable.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, so reconnect works).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Some(api) = self.inner.api.lock().await.take() {
            api.close().await;
        }

        // Recreate the command channel so a reconnect can spawn a fresh
        // processor. The previous receiver was consumed by the old one.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner.connection_state.send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Replace the configuration.
    ///
    /// Opens a session with the new configuration first; if that fails
    /// the old configuration and session stay in force. Otherwise the
    /// old session is closed, one refresh cycle runs immediately, and
    /// the timer restarts at the new interval. The outcome of that
    /// cycle is reported to subscribers, not returned.
    ///
    /// While disconnected only the stored configuration changes.
    pub async fn update_configuration(&self, config: CoordinatorConfig) -> Result<(), CoreError> {
        config.validate()?;

        if self.inner.api.lock().await.is_none() {
            self.inner.config.send_replace(Arc::new(config));
            debug!("configuration replaced while disconnected");
            return Ok(());
        }

        let api = self.inner.connector.connect(&config).await?;

        let guard = self.inner.cycle_lock.lock().await;
        let previous = self.inner.api.lock().await.replace(api);
        self.inner.config.send_replace(Arc::new(config));
        if let Some(old) = previous {
            old.close().await;
        }
        info!("configuration updated, refreshing");

        let cycle = self.inner.store.status().cycle + 1;
        if let Err(e) = self.run_cycle(cycle).await {
            debug!(error = %e, "refresh after configuration update failed");
        }
        drop(guard);
        Ok(())
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run a refresh cycle now and return the snapshot it published.
    ///
    /// If a cycle is already in flight this waits for it and returns its
    /// outcome instead of starting another one.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let seen = self.inner.store.status().cycle;
        let _guard = self.inner.cycle_lock.lock().await;

        let status = self.inner.store.status();
        if status.cycle > seen {
            debug!(cycle = status.cycle, "refresh coalesced into completed cycle");
            return outcome(&status);
        }
        self.run_cycle(status.cycle + 1).await
    }

    /// One cycle. Callers hold `cycle_lock`.
    ///
    /// A rejected session gets one fresh login and a second attempt;
    /// only a refused login or a second rejection reports the
    /// credential as expired.
    async fn run_cycle(&self, cycle: u64) -> Result<Arc<Snapshot>, CoreError> {
        let api = self.api().await?;
        debug!(cycle, "refresh cycle started");

        let mut result = collect_domains(api.as_ref(), &self.inner.domains).await;
        if result.as_ref().is_err_and(CoreError::is_auth_expired) {
            result = match self.reopen().await {
                Ok(api) => collect_domains(api.as_ref(), &self.inner.domains).await,
                Err(e) => Err(e),
            };
        }

        match result {
            Ok(domains) => {
                let snapshot = self
                    .inner
                    .store
                    .publish(Snapshot::new(cycle, Utc::now(), domains));
                self.inner.connection_state.send_if_modified(|state| {
                    if *state == ConnectionState::ReauthRequired {
                        *state = ConnectionState::Connected;
                        true
                    } else {
                        false
                    }
                });
                Ok(snapshot)
            }
            Err(e) => {
                warn!(cycle, error = %e, "refresh cycle failed");
                if e.is_auth_expired() {
                    self.inner.connection_state.send_replace(ConnectionState::ReauthRequired);
                }
                self.inner.store.report_failure(cycle, e.clone());
                Err(e)
            }
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the router.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        let state = *self.inner.connection_state.borrow();
        if !matches!(
            state,
            ConnectionState::Connected | ConnectionState::ReauthRequired
        ) {
            return Err(CoreError::CoordinatorStopped);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;

        rx.await.map_err(|_| CoreError::CoordinatorStopped)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// No periodic refresh task is spawned, since a single invocation
    /// only needs the first cycle.
    pub async fn oneshot<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        Self::oneshot_with(config, Arc::new(BboxConnector), f).await
    }

    /// [`oneshot`](Self::oneshot) with a custom connector.
    pub async fn oneshot_with<F, Fut, T>(
        config: CoordinatorConfig,
        connector: Arc<dyn Connector>,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let coordinator = Self::build(config, connector, DEFAULT_DOMAINS.into(), false);
        coordinator.connect().await?;
        let result = f(coordinator.clone()).await;
        coordinator.disconnect().await;
        result
    }

    // ── Diagnostics ──────────────────────────────────────────────

    /// Redacted configuration, redacted current snapshot, and a raw
    /// dump of every polled endpoint.
    pub async fn diagnostics(&self) -> Result<Value, CoreError> {
        let api = self.api().await?;
        let _guard = self.inner.cycle_lock.lock().await;
        let raw = diagnostics::raw_dump(api.as_ref(), &self.inner.domains).await;
        Ok(diagnostics::report(
            &self.config(),
            self.snapshot().as_deref(),
            raw,
        ))
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// The current snapshot, if any cycle has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.current()
    }

    /// Outcome of the last completed cycle.
    pub fn status(&self) -> RefreshStatus {
        self.inner.store.status()
    }

    /// Subscribe to cycle outcomes.
    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────

    async fn open(&self, config: &CoordinatorConfig) -> Result<(), CoreError> {
        config.validate()?;
        let api = self.inner.connector.connect(config).await?;
        *self.inner.api.lock().await = Some(api);
        Ok(())
    }

    /// Log in again with the configuration in force and swap the
    /// session. Callers hold `cycle_lock`.
    async fn reopen(&self) -> Result<Arc<dyn RouterApi>, CoreError> {
        info!("session rejected, logging in again");
        let api = self.inner.connector.connect(&self.config()).await?;
        let previous = self.inner.api.lock().await.replace(Arc::clone(&api));
        if let Some(old) = previous {
            old.close().await;
        }
        Ok(api)
    }

    async fn api(&self) -> Result<Arc<dyn RouterApi>, CoreError> {
        self.inner
            .api
            .lock()
            .await
            .clone()
            .ok_or(CoreError::CoordinatorStopped)
    }

    fn mark_failed(&self, error: &CoreError) {
        let state = if error.is_auth_expired() {
            ConnectionState::ReauthRequired
        } else {
            ConnectionState::Failed
        };
        self.inner.connection_state.send_replace(state);
    }
}

/// Translate a completed cycle's status into a `refresh()` result.
fn outcome(status: &RefreshStatus) -> Result<Arc<Snapshot>, CoreError> {
    if let Some(ref e) = status.last_failure {
        return Err(e.clone());
    }
    status
        .snapshot
        .clone()
        .ok_or_else(|| CoreError::Internal("completed cycle left no snapshot".into()))
}

/// Issue every domain's call through the isolator and assemble the
/// results. Calls are started in table order and run concurrently.
pub(crate) async fn collect_domains(
    api: &dyn RouterApi,
    domains: &[DomainSpec],
) -> Result<Map<String, Value>, CoreError> {
    let calls = domains.iter().map(|spec| {
        call_isolated(spec.name, spec.critical, async move {
            let raw = api.fetch(spec.endpoint).await.map_err(CoreError::from)?;
            normalize_domain(spec, raw)
        })
    });
    let results = join_all(calls).await;

    let mut assembled = Map::new();
    for (spec, result) in domains.iter().zip(results) {
        assembled.insert(spec.name.to_owned(), Value::Object(result?));
    }
    Ok(assembled)
}

// ── Background tasks ─────────────────────────────────────────────

fn schedule(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Periodically refresh, restarting the timer whenever the
/// configuration changes.
async fn refresh_task(
    coordinator: Coordinator,
    mut config_rx: watch::Receiver<Arc<CoordinatorConfig>>,
    cancel: CancellationToken,
) {
    let mut interval = schedule(config_rx.borrow_and_update().refresh_interval);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = config_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = config_rx.borrow_and_update().refresh_interval;
                interval = schedule(period);
                debug!(?period, "refresh timer restarted");
            }
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    debug!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    coordinator: Coordinator,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(CommandEnvelope { command, response_tx }) = envelope else { break };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        let _ = response_tx.send(Err(CoreError::CoordinatorStopped));
                        break;
                    }
                    result = route_command(&coordinator, command) => {
                        let _ = response_tx.send(result);
                    }
                }
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Run a command, then give the router the settle delay to apply it
/// and refresh. A failing refresh does not fail the command.
async fn route_command(
    coordinator: &Coordinator,
    command: Command,
) -> Result<CommandResult, CoreError> {
    let api = coordinator.api().await?;
    api.execute(&command).await?;
    info!(?command, "command accepted");

    if !command.refreshes_after() {
        return Ok(CommandResult::Ok);
    }

    tokio::time::sleep(coordinator.config().settle_delay).await;
    match coordinator.refresh().await {
        Ok(snapshot) => Ok(CommandResult::Refreshed {
            cycle: snapshot.cycle(),
        }),
        Err(e) => {
            warn!(error = %e, "refresh after command failed");
            Ok(CommandResult::Ok)
        }
    }
}
