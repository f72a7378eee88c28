use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::time::{self, Instant};
use tracing::Instrument;

use crate::persistence::{now_timestamp, JsonBlobStore};
use crate::progress::{ProgressLedger, ProgressState};

use super::commands::SessionCommand;
use super::events::SessionEvent;
use super::state::TrainingSession;
use super::timers::ScheduledTask;

/// Where completed runs are recorded. The store mutex serializes writes
/// from every session sharing the ledger.
#[derive(Clone)]
pub(crate) struct ProgressSink {
    pub ledger: Arc<RwLock<ProgressLedger>>,
    pub store: Option<Arc<Mutex<JsonBlobStore<ProgressState>>>>,
}

struct ActorState {
    session: TrainingSession,
    /// Scheduled tasks with their absolute deadlines, in scheduling order.
    pending: Vec<(Instant, ScheduledTask)>,
    /// Generation whose completion has already been reported.
    reported: Option<u64>,
    event_tx: broadcast::Sender<SessionEvent>,
    sink: ProgressSink,
}

/// The training actor loop.
/// Owns the session. Processes commands and timer deadlines sequentially.
pub(crate) async fn run_trainer_actor(
    session: TrainingSession,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
    sink: ProgressSink,
) {
    let session_id = session.session_id().to_string();
    let variation = session.line().variation_id.clone();
    let state = ActorState {
        session,
        pending: Vec::new(),
        reported: None,
        event_tx,
        sink,
    };
    run_trainer_actor_inner(state, cmd_rx)
        .instrument(tracing::info_span!("training", id = %session_id, %variation))
        .await;
}

async fn run_trainer_actor_inner(
    mut state: ActorState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
) {
    tracing::info!("Training actor started");

    loop {
        let deadline = state.pending.iter().map(|(at, _)| *at).min();

        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Training actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd).await,
                }
            }

            _ = sleep_until(deadline) => {
                fire_due(&mut state).await;
            }
        }
    }

    tracing::info!("Training actor exited");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn handle_command(state: &mut ActorState, cmd: SessionCommand) {
    match cmd {
        SessionCommand::Start { mode, reply } => {
            state.session.start(mode);
            let snapshot = after_change(state).await;
            let _ = reply.send(snapshot);
        }
        SessionCommand::SubmitMove { intent, reply } => {
            let outcome = state.session.submit_move(&intent);
            let snapshot = if outcome.is_rejected() {
                tracing::debug!(mv = %intent.to_uci(), ?outcome, "Move rejected");
                state.session.snapshot()
            } else {
                after_change(state).await
            };
            let _ = reply.send((outcome, snapshot));
        }
        SessionCommand::Hint { reply } => {
            let snapshot = if state.session.request_hint() {
                after_change(state).await
            } else {
                state.session.snapshot()
            };
            let _ = reply.send(snapshot);
        }
        SessionCommand::Reset { reply } => {
            state.session.reset();
            let snapshot = after_change(state).await;
            let _ = reply.send(snapshot);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.session.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.session.snapshot();
            let rx = state.event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => {}
    }
}

/// Fire every task whose deadline has passed, earliest first.
async fn fire_due(state: &mut ActorState) {
    let now = Instant::now();
    let (mut due, rest): (Vec<_>, Vec<_>) = state
        .pending
        .drain(..)
        .partition(|(at, _)| *at <= now);
    state.pending = rest;
    due.sort_by_key(|(at, task)| (*at, task.token.seq));

    let mut changed = false;
    for (_, task) in &due {
        changed |= state.session.fire(task);
    }
    if changed {
        after_change(state).await;
    } else {
        collect_scheduled(state);
    }
}

/// Pick up newly scheduled work, broadcast the new state and report a
/// completion once per generation.
async fn after_change(state: &mut ActorState) -> super::snapshot::SessionSnapshot {
    collect_scheduled(state);
    let snapshot = state.session.snapshot();
    let _ = state
        .event_tx
        .send(SessionEvent::StateChanged(snapshot.clone()));

    if let Some(stats) = state.session.completion() {
        let generation = state.session.generation();
        if state.reported != Some(generation) {
            state.reported = Some(generation);
            record_completion(&state.sink, &stats).await;
            let _ = state.event_tx.send(SessionEvent::Completed(stats));
        }
    }
    snapshot
}

fn collect_scheduled(state: &mut ActorState) {
    let generation = state.session.generation();
    state
        .pending
        .retain(|(_, task)| task.token.generation == generation);

    let now = Instant::now();
    for task in state.session.take_scheduled() {
        state.pending.push((now + task.delay, task));
    }
}

async fn record_completion(sink: &ProgressSink, stats: &super::mode::CompletionStats) {
    sink.ledger.write().await.apply(stats, now_timestamp());
    tracing::info!(
        opening = %stats.opening_id,
        variation = %stats.variation_id,
        accuracy = stats.accuracy,
        "Recorded training result"
    );

    if let Some(store) = sink.store.clone() {
        tokio::spawn(save_progress(sink.ledger.clone(), store).in_current_span());
    }
}

/// Write the ledger to disk off the actor. The newest state is read once the
/// store is free, so the last write to land is never an older one.
async fn save_progress(
    ledger: Arc<RwLock<ProgressLedger>>,
    store: Arc<Mutex<JsonBlobStore<ProgressState>>>,
) {
    let store = store.lock_owned().await;
    let snapshot = ledger.read().await.state().clone();
    let result = tokio::task::spawn_blocking(move || store.save(&snapshot)).await;
    match result {
        Ok(Ok(())) => tracing::debug!("Progress saved"),
        Ok(Err(e)) => tracing::warn!("Failed to save progress: {}", e),
        Err(e) => tracing::warn!("Progress save task failed: {}", e),
    }
}
