//! An in-memory [`Transport`] hub shared by every party in a test or demo
//! session. Grounded on the teacher's `mpc::memory::MemoryRelay`
//! (`DashMap`-backed stores with a notification channel), adapted from its
//! pull/collect shape to the spec's push-based `Send`/`Incoming`/`Done`
//! contract: each party owns a bounded `mpsc` channel rather than polling a
//! shared map.

use super::{async_trait, Transport};
use crate::codec::Frame;
use crate::error::Result;
use crate::party::PartySet;
use dashmap::DashMap;
use futures_util::stream::{self, Stream};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Shared switchboard wiring every party's channel together. Construct once
/// per protocol instance with [`MemoryHub::new`], then hand each party its
/// own [`MemoryTransport`] via [`MemoryHub::transport`].
pub struct MemoryHub {
    senders: DashMap<u16, mpsc::Sender<Frame>>,
}

impl MemoryHub {
    /// Build a hub with a bounded channel per party, sized to the party
    /// count (spec §5's back-pressure model: senders block when a
    /// recipient's queue is full).
    pub fn new(parties: &PartySet) -> (Arc<Self>, Vec<MemoryTransport>) {
        let capacity = parties.len().max(1);
        let senders = DashMap::new();
        let mut transports = Vec::with_capacity(parties.len());

        for id in parties.iter() {
            let (tx, rx) = mpsc::channel(capacity);
            senders.insert(id.get(), tx);
            transports.push((id, rx));
        }

        let hub = Arc::new(Self { senders });
        let handles = transports
            .into_iter()
            .map(|(id, rx)| MemoryTransport {
                self_id: id.get(),
                hub: hub.clone(),
                receiver: Arc::new(Mutex::new(rx)),
            })
            .collect();

        (hub, handles)
    }
}

/// One party's view of a [`MemoryHub`].
#[derive(Clone)]
pub struct MemoryTransport {
    self_id: u16,
    hub: Arc<MemoryHub>,
    receiver: Arc<Mutex<mpsc::Receiver<Frame>>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, frame: Frame) -> Result<()> {
        match frame.to() {
            Some(to) => {
                if let Some(sender) = self.hub.senders.get(&to.get()) {
                    // A closed recipient has already called `done`; that is
                    // not this sender's error to report.
                    let _ = sender.send(frame).await;
                }
            }
            None => {
                for entry in self.hub.senders.iter() {
                    let _ = entry.value().send(frame.clone()).await;
                }
            }
        }
        Ok(())
    }

    fn incoming(&self) -> Pin<Box<dyn Stream<Item = Frame> + Send>> {
        let receiver = self.receiver.clone();
        Box::pin(stream::unfold(receiver, |receiver| async move {
            let mut guard = receiver.lock().await;
            let frame = guard.recv().await;
            drop(guard);
            frame.map(|f| (f, receiver.clone()))
        }))
    }

    async fn done(&self) {
        self.receiver.lock().await.close();
    }
}
