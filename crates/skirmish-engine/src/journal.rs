//! Event journal: logs every bus event as JSON and keeps per-kind counts.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use skirmish_events::{Event, EventBus, EventKind, Subscription};
use tracing::{debug, warn};

/// A wildcard subscriber that writes each event to the log.
#[derive(Debug)]
pub struct Journal {
    counts: Rc<RefCell<BTreeMap<EventKind, u64>>>,
    subscription: Subscription,
}

impl Journal {
    /// Start journaling everything published on `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let counts: Rc<RefCell<BTreeMap<EventKind, u64>>> = Rc::default();
        let sink = Rc::clone(&counts);
        let subscription = bus.subscribe_all(move |event: &Event| {
            {
                let mut counts = sink.borrow_mut();
                let count = counts.entry(event.kind()).or_insert(0);
                *count = count.saturating_add(1);
            }
            match serde_json::to_string(event) {
                Ok(json) => debug!(target: "skirmish::events", event = %json, "Event"),
                Err(e) => warn!(kind = ?event.kind(), error = %e, "Event not serializable"),
            }
        });
        Self {
            counts,
            subscription,
        }
    }

    /// Events seen so far, per kind.
    pub fn counts(&self) -> BTreeMap<EventKind, u64> {
        self.counts.borrow().clone()
    }

    /// Stop journaling and return the final counts.
    pub fn detach(self) -> BTreeMap<EventKind, u64> {
        self.subscription.unsubscribe();
        self.counts()
    }
}
