use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eventbuf_core::{AssignmentPolicy, Buffer, MonitoredBuffer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::{BatchingConfig, DispatcherConfig};
use crate::delivery::{next_dispatcher_id, DeliveryHook, DispatcherId};
use crate::error::DispatchError;
use crate::mailbox::{Command, Stats};

const MAILBOX_CAPACITY: usize = 256;

/// Identifies one scheduled deferred flush. A stale timer firing after its
/// schedule was superseded carries a token that no longer matches the
/// actor's stored pending token and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FlushToken(u64);

enum BatchCommand<S, T> {
    Core(Command<S, T>),
    /// A deferred flush timer firing; may be stale.
    Flush(FlushToken),
}

/// A handle to a running batching dispatcher actor: events are held
/// until `batch_size` accumulates or `max_delay` elapses, whichever comes
/// first. Cheap to clone, like [`crate::ImmediateDispatcher`].
#[derive(Clone)]
pub struct BatchingDispatcher<S, T> {
    tx: mpsc::Sender<BatchCommand<S, T>>,
}

impl<S, T> BatchingDispatcher<S, T>
where
    S: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    pub fn spawn(
        config: DispatcherConfig,
        batching: BatchingConfig,
        policy: Box<dyn AssignmentPolicy<S>>,
        hook: Arc<dyn DeliveryHook<S, T>>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let buffer = Buffer::new(policy, config.capacity, config.drop_strategy);
        let id = next_dispatcher_id();
        let join = tokio::spawn(run(rx, tx.clone(), buffer, hook, id, batching));
        (Self { tx }, join)
    }

    pub async fn append(&self, events: Vec<T>) -> Result<usize, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BatchCommand::Core(Command::Append {
                events,
                reply: reply_tx,
            }))
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)
    }

    pub async fn ask(&self, sub: S, n: usize) -> Result<(), DispatchError> {
        self.tx
            .send(BatchCommand::Core(Command::Ask { sub, n }))
            .await
            .map_err(|_| DispatchError::ShutDown)
    }

    pub async fn unsubscribe(&self, sub: S) -> Result<(), DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BatchCommand::Core(Command::Unsubscribe {
                sub,
                reply: reply_tx,
            }))
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)?
    }

    pub async fn stats(&self) -> Result<Stats, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BatchCommand::Core(Command::Stats { reply: reply_tx }))
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)
    }

    pub async fn notify_down(
        &self,
        sub: S,
        token: eventbuf_core::LivenessToken,
    ) -> Result<(), DispatchError> {
        self.tx
            .send(BatchCommand::Core(Command::Down { sub, token }))
            .await
            .map_err(|_| DispatchError::ShutDown)
    }
}

async fn run<S, T>(
    mut rx: mpsc::Receiver<BatchCommand<S, T>>,
    self_tx: mpsc::Sender<BatchCommand<S, T>>,
    buffer: Buffer<S, T>,
    hook: Arc<dyn DeliveryHook<S, T>>,
    id: DispatcherId,
    config: BatchingConfig,
) where
    S: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    let mut mb = MonitoredBuffer::new(buffer);
    let mut rng = StdRng::from_entropy();
    let mut pending: Option<FlushToken> = None;
    let next_token = AtomicU64::new(0);

    while let Some(cmd) = rx.recv().await {
        match cmd {
            BatchCommand::Core(Command::Append { events, reply }) => {
                let dropped = mb.append(events);
                if dropped > 0 {
                    debug!(dropped, "batching dispatcher dropped events on overflow");
                }
                let _ = reply.send(dropped);
                schedule_flush(
                    &mut mb, &mut rng, &hook, id, &config, &self_tx, &next_token, &mut pending,
                );
            }
            BatchCommand::Core(Command::Ask { sub, n }) => {
                mb.ask(sub, n);
                schedule_flush(
                    &mut mb, &mut rng, &hook, id, &config, &self_tx, &next_token, &mut pending,
                );
            }
            BatchCommand::Core(Command::Unsubscribe { sub, reply }) => {
                let result = mb.delete(&sub).map_err(DispatchError::from);
                let _ = reply.send(result);
            }
            BatchCommand::Core(Command::Stats { reply }) => {
                let stats = mb.stats();
                let _ = reply.send(Stats {
                    buffered: stats.buffered,
                    subscribed: mb.subscribed(),
                    demand: stats.demand,
                });
            }
            BatchCommand::Core(Command::Down { sub, token }) => {
                if mb.on_down(&sub, token).is_err() {
                    trace!("ignored stale or unknown liveness notification");
                }
            }
            BatchCommand::Flush(token) => {
                if pending == Some(token) {
                    pending = None;
                    deliver_assignments(&mut mb, &mut rng, &hook, id);
                } else {
                    trace!("ignored stale deferred-flush timer");
                }
            }
        }
    }
}

/// Checked in order: flush immediately if occupancy already meets
/// `batch_size`; otherwise leave an already-scheduled flush alone;
/// otherwise schedule a fresh one.
#[allow(clippy::too_many_arguments)]
fn schedule_flush<S, T>(
    mb: &mut MonitoredBuffer<S, T>,
    rng: &mut StdRng,
    hook: &Arc<dyn DeliveryHook<S, T>>,
    id: DispatcherId,
    config: &BatchingConfig,
    self_tx: &mpsc::Sender<BatchCommand<S, T>>,
    next_token: &AtomicU64,
    pending: &mut Option<FlushToken>,
) where
    S: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    if mb.stats().buffered >= config.batch_size {
        *pending = None;
        deliver_assignments(mb, rng, hook, id);
        return;
    }

    if pending.is_some() {
        return;
    }

    let token = FlushToken(next_token.fetch_add(1, Ordering::Relaxed));
    *pending = Some(token);

    let tx = self_tx.clone();
    let delay = config.max_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(BatchCommand::Flush(token)).await;
    });
}

fn deliver_assignments<S, T>(
    mb: &mut MonitoredBuffer<S, T>,
    rng: &mut StdRng,
    hook: &Arc<dyn DeliveryHook<S, T>>,
    id: DispatcherId,
) where
    S: Eq + Hash + Clone,
{
    for (sub, events) in mb.assign_events(rng) {
        hook.deliver(&sub, events, id);
    }
}
