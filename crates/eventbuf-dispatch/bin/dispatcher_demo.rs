//! # Event Buffer Dispatcher Demo
//!
//! End-to-end demonstration of both dispatcher disciplines against the same
//! kind of workload: several producers appending events, several
//! subscribers asking for events, and a delivery hook that forwards
//! assignments into per-subscriber mailboxes.
//!
//! ## Running
//!
//! ```bash
//! cargo run -p eventbuf-dispatch --bin dispatcher_demo
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use eventbuf_dispatch::{
    BatchingConfig, BatchingDispatcher, DeliveredMessage, DeliveryHook, DispatcherConfig,
    DispatcherId, Even, ImmediateDispatcher,
};
use tokio::sync::mpsc;

type SubscriberId = u32;

/// Forwards each assignment into the named subscriber's mailbox, the same
/// role a real transport (network session, process mailbox, …) would play.
struct MailboxHook {
    mailboxes: HashMap<SubscriberId, mpsc::Sender<DeliveredMessage<u64>>>,
}

impl DeliveryHook<SubscriberId, u64> for MailboxHook {
    fn deliver(&self, subscriber: &SubscriberId, events: Vec<u64>, source: DispatcherId) {
        if let Some(tx) = self.mailboxes.get(subscriber) {
            let _ = tx.try_send(DeliveredMessage::Assigned { source, events });
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Immediate dispatcher ===");
    run_immediate_demo().await;

    println!("\n=== Batching dispatcher ===");
    run_batching_demo().await;
}

async fn run_immediate_demo() {
    let mut mailboxes = HashMap::new();
    let mut inboxes = HashMap::new();
    for sub in 0..3u32 {
        let (tx, rx) = mpsc::channel(64);
        mailboxes.insert(sub, tx);
        inboxes.insert(sub, rx);
    }
    let hook = Arc::new(MailboxHook { mailboxes });

    let (dispatcher, join) = ImmediateDispatcher::spawn(
        DispatcherConfig::default(),
        Box::new(Even),
        hook,
    );

    dispatcher.ask(0, 4).await.unwrap();
    dispatcher.ask(1, 2).await.unwrap();
    dispatcher.ask(2, 6).await.unwrap();

    let dropped = dispatcher.append((0..12).collect()).await.unwrap();
    println!("dropped on overflow: {dropped}");

    for (sub, rx) in &mut inboxes {
        if let Ok(DeliveredMessage::Assigned { events, .. }) = rx.try_recv() {
            println!("subscriber {sub} received {} events: {:?}", events.len(), events);
        }
    }

    let stats = dispatcher.stats().await.unwrap();
    println!(
        "stats: buffered={} subscribed={} demand={}",
        stats.buffered, stats.subscribed, stats.demand
    );

    drop(dispatcher);
    join.await.unwrap();
}

async fn run_batching_demo() {
    let mut mailboxes = HashMap::new();
    let mut inboxes = HashMap::new();
    for sub in 0..1u32 {
        let (tx, rx) = mpsc::channel(64);
        mailboxes.insert(sub, tx);
        inboxes.insert(sub, rx);
    }
    let hook = Arc::new(MailboxHook { mailboxes });

    let (dispatcher, join) = BatchingDispatcher::spawn(
        DispatcherConfig::small(),
        BatchingConfig::new(10, Duration::from_millis(50)),
        Box::new(Even),
        hook,
    );

    dispatcher.ask(0, 1).await.unwrap();
    dispatcher.append(vec![42]).await.unwrap();

    let stats = dispatcher.stats().await.unwrap();
    println!("before timer fires: buffered={}", stats.buffered);

    tokio::time::sleep(Duration::from_millis(150)).await;

    if let Some(rx) = inboxes.get_mut(&0) {
        if let Ok(DeliveredMessage::Assigned { events, .. }) = rx.try_recv() {
            println!("subscriber 0 received via timer flush: {events:?}");
        }
    }

    let stats = dispatcher.stats().await.unwrap();
    println!("after timer fires: buffered={} demand={}", stats.buffered, stats.demand);

    drop(dispatcher);
    join.await.unwrap();
}
