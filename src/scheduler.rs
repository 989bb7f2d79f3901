// Copyright (c) 2025 - Cowboy AI, Inc.
//! Collection Scheduler
//!
//! Each provider collector runs its own loop: one pass immediately, then
//! one pass per tick of a fixed-period timer, until the shared shutdown
//! signal fires.
//!
//! A pass is a set of independent [`CollectionTask`]s, one per enabled asset
//! type (and per region where the provider is regional). Tasks are spawned
//! onto the runtime and never joined by the loop, so a slow or failing
//! task cannot delay the next tick or a sibling task. Passes may overlap in
//! time when a fetch outlasts the period; the cross-reference caches are
//! safe for that.
//!
//! Shutdown stops new passes and aborts provider calls still in flight
//! (see [`Shutdown::guard`]). Records from listings that already resolved
//! are still published.
//!
//! ```text
//! run_collector
//!   ├─ start()            watchers, one-time setup
//!   ├─ pass #1            immediately
//!   ├─ tick → pass #2
//!   ├─ tick → pass #3 ...
//!   └─ shutdown → stop()
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::asset::{AssetType, CloudProvider};
use crate::errors::{CollectorError, CollectorResult};
use crate::state_machine::{
    SchedulerAction, SchedulerInput, SchedulerState, StateMachineWithHistory, TransitionError,
};

/// Sending half of the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Signal every [`Shutdown`] handle; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Cooperative cancellation signal shared by every collector and task
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A signal that never fires
    pub fn never() -> Self {
        shutdown_channel().1
    }

    /// Resolves once cancellation is signalled. Pends forever when the
    /// trigger was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Await a provider call unless cancellation comes first, in which case
    /// the call is dropped and [`CollectorError::Cancelled`] returned
    pub async fn guard<F, T>(&self, call: F) -> CollectorResult<T>
    where
        F: Future<Output = CollectorResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CollectorError::Cancelled),
            result = call => result,
        }
    }
}

/// Create a linked trigger and signal
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// One unit of work in a pass: collect one asset type for one scope
pub struct CollectionTask {
    pub asset_type: AssetType,
    /// Region, project or subscription the task covers; `"*"` for all
    pub scope: String,
    /// Resolves to the number of records published
    pub work: BoxFuture<'static, CollectorResult<usize>>,
}

impl CollectionTask {
    pub fn new(
        asset_type: AssetType,
        scope: impl Into<String>,
        work: BoxFuture<'static, CollectorResult<usize>>,
    ) -> Self {
        Self {
            asset_type,
            scope: scope.into(),
            work,
        }
    }
}

impl std::fmt::Debug for CollectionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionTask")
            .field("asset_type", &self.asset_type)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A provider module driven by the scheduler
#[async_trait]
pub trait Collector: Send + Sync {
    fn provider(&self) -> CloudProvider;

    /// Timer interval between passes
    fn period(&self) -> Duration;

    /// One-time setup before the first pass. An error aborts this
    /// collector's run only.
    async fn start(&self, _shutdown: &Shutdown) -> CollectorResult<()> {
        Ok(())
    }

    /// The tasks making up one pass. Tasks guard their provider calls with
    /// `shutdown`.
    fn pass(&self, shutdown: &Shutdown) -> Vec<CollectionTask>;

    /// Teardown after the loop exits
    async fn stop(&self) {}
}

/// Launches pass tasks without joining them
pub struct TaskGroup {
    pass_id: Uuid,
    provider: CloudProvider,
    handles: Vec<JoinHandle<()>>,
}

impl TaskGroup {
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            pass_id: Uuid::now_v7(),
            provider,
            handles: Vec::new(),
        }
    }

    pub fn pass_id(&self) -> Uuid {
        self.pass_id
    }

    /// Spawn `task`; its outcome is logged, never returned
    pub fn spawn(&mut self, task: CollectionTask) {
        let span = info_span!(
            "collect",
            provider = %self.provider,
            asset_type = %task.asset_type,
            scope = %task.scope,
            pass_id = %self.pass_id,
        );
        let work = task.work;

        let handle = tokio::spawn(
            async move {
                match work.await {
                    Ok(count) => info!(count, "asset type collected"),
                    Err(CollectorError::Cancelled) => info!("collection task cancelled"),
                    Err(e) => error!(error = %e, "asset type collection failed"),
                }
            }
            .instrument(span),
        );
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn into_handle(self) -> PassHandle {
        PassHandle {
            pass_id: self.pass_id,
            handles: self.handles,
        }
    }
}

/// Detached tasks of one pass
#[derive(Debug)]
pub struct PassHandle {
    pass_id: Uuid,
    handles: Vec<JoinHandle<()>>,
}

impl PassHandle {
    pub fn pass_id(&self) -> Uuid {
        self.pass_id
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every task of the pass to finish
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(pass_id = %self.pass_id, error = %e, "collection task panicked");
            }
        }
    }
}

/// Launch one pass of `collector`
pub fn launch_pass<C>(collector: &C, shutdown: &Shutdown, pass: u64) -> PassHandle
where
    C: Collector + ?Sized,
{
    let mut group = TaskGroup::new(collector.provider());
    let span = info_span!(
        "collection_pass",
        provider = %collector.provider(),
        pass_id = %group.pass_id(),
        pass,
    );
    let _entered = span.enter();

    for task in collector.pass(shutdown) {
        group.spawn(task);
    }
    info!(tasks = group.len(), "collection pass launched");
    group.into_handle()
}

/// How a collector's run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub provider: CloudProvider,
    pub passes: u64,
    pub final_state: SchedulerState,
}

fn step(
    fsm: &mut StateMachineWithHistory<SchedulerState>,
    input: SchedulerInput,
) -> Result<SchedulerAction, TransitionError> {
    fsm.transition_with_history(input, chrono::Utc::now())
}

fn summary(provider: CloudProvider, fsm: &StateMachineWithHistory<SchedulerState>) -> RunSummary {
    let passes = match fsm.current_state() {
        SchedulerState::Running { passes } => *passes,
        _ => fsm
            .get_history()
            .iter()
            .filter_map(|t| match t.to {
                SchedulerState::Running { passes } => Some(passes),
                _ => None,
            })
            .max()
            .unwrap_or(0),
    };
    RunSummary {
        provider,
        passes,
        final_state: *fsm.current_state(),
    }
}

/// Drive `collector` until `shutdown` fires.
///
/// Returns an error only when the collector cannot start or its period is
/// zero; collection errors are logged inside the pass.
pub async fn run_collector<C>(collector: Arc<C>, shutdown: Shutdown) -> CollectorResult<RunSummary>
where
    C: Collector + ?Sized,
{
    let provider = collector.provider();
    let period = collector.period();
    let mut fsm = StateMachineWithHistory::new(SchedulerState::Idle);

    if period.is_zero() {
        return Err(TransitionError::PreconditionFailed(format!(
            "{provider} collector period must be greater than zero"
        ))
        .into());
    }

    if shutdown.is_cancelled() {
        step(&mut fsm, SchedulerInput::Cancel)?;
        return Ok(summary(provider, &fsm));
    }

    info!(provider = %provider, period_secs = period.as_secs(), "asset collector run started");

    if let Err(e) = collector.start(&shutdown).await {
        error!(provider = %provider, error = %e, "asset collector failed to start");
        step(&mut fsm, SchedulerInput::Start)?;
        step(&mut fsm, SchedulerInput::Stop)?;
        collector.stop().await;
        return Err(e);
    }

    if step(&mut fsm, SchedulerInput::Start)? == SchedulerAction::RunPass {
        launch_pass(collector.as_ref(), &shutdown, 1);
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                step(&mut fsm, SchedulerInput::Cancel)?;
                break;
            }
            _ = ticker.tick() => {
                if step(&mut fsm, SchedulerInput::Tick)? == SchedulerAction::RunPass {
                    let pass = match fsm.current_state() {
                        SchedulerState::Running { passes } => *passes,
                        _ => 0,
                    };
                    launch_pass(collector.as_ref(), &shutdown, pass);
                }
            }
        }
    }

    collector.stop().await;
    let summary = summary(provider, &fsm);
    info!(provider = %provider, passes = summary.passes, "asset collector run stopped");
    Ok(summary)
}

/// Run every collector concurrently until shutdown; one collector failing
/// to start does not affect the others
pub async fn run_all(
    collectors: Vec<Arc<dyn Collector>>,
    shutdown: Shutdown,
) -> Vec<(CloudProvider, CollectorResult<RunSummary>)> {
    let handles: Vec<_> = collectors
        .into_iter()
        .map(|collector| {
            let provider = collector.provider();
            let shutdown = shutdown.clone();
            (provider, tokio::spawn(run_collector(collector, shutdown)))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (provider, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(CollectorError::Watcher(format!(
                "{provider} collector task failed: {e}"
            ))),
        };
        results.push((provider, result));
    }
    results
}
