//! Engine event log
//!
//! Append-only record of every committed write plus channel fan-out to live
//! subscribers. The engine emits while holding the causing market's write
//! lock, so subscribers and the log both observe per-market events in commit
//! order; ordering across markets is unspecified. Delivery is
//! fire-and-forget: a subscriber that went away is pruned, never waited on.

use crossbeam_channel::{unbounded, Receiver, Sender};
use market_types::{MarketEvent, MarketId};
use parking_lot::RwLock;

/// Append-only log with subscriber fan-out
#[derive(Debug, Default)]
pub struct EventLog {
    log: RwLock<Vec<MarketEvent>>,
    subscribers: RwLock<Vec<Sender<MarketEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live consumer; events emitted from now on are delivered
    pub fn subscribe(&self) -> Receiver<MarketEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.write().push(tx);
        rx
    }

    /// Append an event and fan it out to all live subscribers
    pub fn emit(&self, event: MarketEvent) {
        self.log.write().push(event.clone());
        self.subscribers
            .write()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Full log in emission order
    pub fn events(&self) -> Vec<MarketEvent> {
        self.log.read().clone()
    }

    /// Events for one market, in commit order
    pub fn events_for(&self, id: MarketId) -> Vec<MarketEvent> {
        self.log
            .read()
            .iter()
            .filter(|event| event.market_id() == id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }
}
