use std::hash::Hash;
use std::sync::Arc;

use eventbuf_core::{AssignmentPolicy, Buffer, MonitoredBuffer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::DispatcherConfig;
use crate::delivery::{next_dispatcher_id, DeliveryHook, DispatcherId};
use crate::error::DispatchError;
use crate::mailbox::{Command, Stats};

const MAILBOX_CAPACITY: usize = 256;

/// A handle to a running immediate dispatcher actor: every `append`
/// or `ask` immediately triggers an assignment pass and delivers the
/// result. Cheap to clone, since every clone shares the same mailbox, so
/// many producers and subscribers can hold their own handle.
#[derive(Clone)]
pub struct ImmediateDispatcher<S, T> {
    tx: mpsc::Sender<Command<S, T>>,
}

impl<S, T> ImmediateDispatcher<S, T>
where
    S: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    /// Spawns the actor task and returns a handle to it plus the task's
    /// `JoinHandle`. Dropping every clone of the handle closes the mailbox
    /// and lets the task exit; awaiting the `JoinHandle` observes that.
    pub fn spawn(
        config: DispatcherConfig,
        policy: Box<dyn AssignmentPolicy<S>>,
        hook: Arc<dyn DeliveryHook<S, T>>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let buffer = Buffer::new(policy, config.capacity, config.drop_strategy);
        let id = next_dispatcher_id();
        let join = tokio::spawn(run(rx, buffer, hook, id));
        (Self { tx }, join)
    }

    /// Appends events and runs an assignment pass. Returns the number of
    /// events dropped by overflow.
    pub async fn append(&self, events: Vec<T>) -> Result<usize, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Append {
                events,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)
    }

    /// Records `n` units of demand for `sub`, then runs an assignment pass.
    /// `n == 0` is an accepted no-op.
    pub async fn ask(&self, sub: S, n: usize) -> Result<(), DispatchError> {
        self.tx
            .send(Command::Ask { sub, n })
            .await
            .map_err(|_| DispatchError::ShutDown)
    }

    /// Removes `sub`'s demand and liveness registration.
    pub async fn unsubscribe(&self, sub: S) -> Result<(), DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Unsubscribe {
                sub,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)?
    }

    /// Current buffered/subscribed/demand snapshot.
    pub async fn stats(&self) -> Result<Stats, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Stats { reply: reply_tx })
            .await
            .map_err(|_| DispatchError::ShutDown)?;
        reply_rx.await.map_err(|_| DispatchError::ShutDown)
    }

    /// Reports that `sub` has disappeared, carrying the liveness token
    /// issued when it was watched. Accepted silently if the token is stale
    /// or the subscriber is already gone.
    pub async fn notify_down(
        &self,
        sub: S,
        token: eventbuf_core::LivenessToken,
    ) -> Result<(), DispatchError> {
        self.tx
            .send(Command::Down { sub, token })
            .await
            .map_err(|_| DispatchError::ShutDown)
    }
}

async fn run<S, T>(
    mut rx: mpsc::Receiver<Command<S, T>>,
    buffer: Buffer<S, T>,
    hook: Arc<dyn DeliveryHook<S, T>>,
    id: DispatcherId,
) where
    S: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    let mut mb = MonitoredBuffer::new(buffer);
    let mut rng = StdRng::from_entropy();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Append { events, reply } => {
                let dropped = mb.append(events);
                if dropped > 0 {
                    debug!(dropped, "immediate dispatcher dropped events on overflow");
                }
                let _ = reply.send(dropped);
                deliver_assignments(&mut mb, &mut rng, &hook, id);
            }
            Command::Ask { sub, n } => {
                mb.ask(sub, n);
                deliver_assignments(&mut mb, &mut rng, &hook, id);
            }
            Command::Unsubscribe { sub, reply } => {
                let result = mb.delete(&sub).map_err(DispatchError::from);
                let _ = reply.send(result);
            }
            Command::Stats { reply } => {
                let stats = mb.stats();
                let _ = reply.send(Stats {
                    buffered: stats.buffered,
                    subscribed: mb.subscribed(),
                    demand: stats.demand,
                });
            }
            Command::Down { sub, token } => {
                if mb.on_down(&sub, token).is_err() {
                    trace!("ignored stale or unknown liveness notification");
                }
            }
        }
    }
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
