//! Synchronous, re-entrant publish/subscribe dispatch.
//!
//! [`EventBus::publish`] invokes every current subscriber of the event's
//! kind inline, then every wildcard subscriber, each in subscription order.
//! The subscriber list is snapshotted before dispatch, so a handler may
//! subscribe, unsubscribe (through a [`Subscription`] it holds), or publish
//! nested events without disturbing the dispatch in progress. A subscriber
//! removed mid-dispatch is not called afterwards.
//!
//! A handler that publishes an event it is itself subscribed to is not
//! re-entered: the nested delivery is queued on that handler and runs as
//! soon as its current call returns.
//!
//! The bus is single-threaded: handles are cheap `Rc` clones sharing one
//! registry.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use skirmish_types::{IdAllocator, SubscriptionId};
use tracing::trace;

use crate::event::{Event, EventKind};

/// One subscriber: its callback plus the deliveries that arrived while it
/// was running.
struct Slot {
    callback: RefCell<Box<dyn FnMut(&Event)>>,
    backlog: RefCell<VecDeque<Event>>,
}

impl Slot {
    fn new<F>(handler: F) -> Rc<Self>
    where
        F: FnMut(&Event) + 'static,
    {
        Rc::new(Self {
            callback: RefCell::new(Box::new(handler)),
            backlog: RefCell::new(VecDeque::new()),
        })
    }
}

type Handler = Rc<Slot>;

/// Which events a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interest {
    Kind(EventKind),
    All,
}

#[derive(Default)]
struct Registry {
    ids: IdAllocator,
    by_kind: BTreeMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    wildcard: Vec<(SubscriptionId, Handler)>,
    published: u64,
}

impl Registry {
    fn register(&mut self, interest: Interest, handler: Handler) -> SubscriptionId {
        // u64 exhaustion is not reachable in practice; fall back to reusing
        // the last id rather than panicking.
        let id = SubscriptionId::from_raw(self.ids.allocate().unwrap_or(u64::MAX));
        match interest {
            Interest::Kind(kind) => self.by_kind.entry(kind).or_default().push((id, handler)),
            Interest::All => self.wildcard.push((id, handler)),
        }
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        for list in self.by_kind.values_mut() {
            list.retain(|(sid, _)| *sid != id);
        }
        self.by_kind.retain(|_, list| !list.is_empty());
        self.wildcard.retain(|(sid, _)| *sid != id);
        self.len() < before
    }

    fn is_live(&self, id: SubscriptionId) -> bool {
        self.wildcard.iter().any(|(sid, _)| *sid == id)
            || self
                .by_kind
                .values()
                .any(|list| list.iter().any(|(sid, _)| *sid == id))
    }

    fn len(&self) -> usize {
        self.by_kind
            .values()
            .map(Vec::len)
            .fold(self.wildcard.len(), usize::saturating_add)
    }

    fn snapshot(&self, kind: EventKind) -> Vec<(SubscriptionId, Handler)> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .chain(self.wildcard.iter())
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect()
    }
}

/// Synchronous event dispatcher keyed by [`EventKind`].
///
/// Cloning the bus yields another handle onto the same subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every future event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&Event) + 'static,
    {
        self.register(Interest::Kind(kind), Slot::new(handler))
    }

    /// Call `handler` for every future event regardless of kind.
    pub fn subscribe_all<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&Event) + 'static,
    {
        self.register(Interest::All, Slot::new(handler))
    }

    /// Dispatch `event` to its subscribers. Returns how many were called.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        let snapshot = {
            let mut registry = self.registry.borrow_mut();
            registry.published = registry.published.saturating_add(1);
            registry.snapshot(kind)
        };
        trace!(?kind, subscribers = snapshot.len(), "Publishing event");

        let mut delivered: usize = 0;
        for (id, slot) in snapshot {
            if !self.is_live(id) {
                continue;
            }
            delivered = delivered.saturating_add(1);
            let Ok(mut call) = slot.callback.try_borrow_mut() else {
                trace!(subscription = %id, ?kind, "Handler busy; delivery queued");
                slot.backlog.borrow_mut().push_back(event.clone());
                continue;
            };
            (*call)(event);
            loop {
                let next = slot.backlog.borrow_mut().pop_front();
                let Some(next) = next else {
                    break;
                };
                if !self.is_live(id) {
                    slot.backlog.borrow_mut().clear();
                    break;
                }
                (*call)(&next);
            }
        }
        delivered
    }

    fn is_live(&self, id: SubscriptionId) -> bool {
        self.registry.borrow().is_live(id)
    }

    /// Remove a subscription by id. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(id)
    }

    /// Number of live subscriptions of any interest.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Number of events published over the bus's lifetime.
    pub fn published_count(&self) -> u64 {
        self.registry.borrow().published
    }

    fn register(&self, interest: Interest, handler: Handler) -> Subscription {
        let id = self.registry.borrow_mut().register(interest, handler);
        trace!(subscription = %id, ?interest, "Subscribed");
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]; the only way a handler's
/// owner removes it.
///
/// Dropping the handle does **not** unsubscribe.
#[derive(Debug, Clone)]
#[must_use = "dropping a Subscription leaves the handler registered forever"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// The subscription's id.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the handler. Safe to call from inside a dispatch. Returns
    /// `false` if it was already removed or the bus is gone.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow_mut().remove(self.id))
    }
}

/// Records every event published on a bus; handy for HUD replays and
/// tests.
#[derive(Debug)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<Event>>>,
    subscription: Subscription,
}

impl EventRecorder {
    /// Start recording everything published on `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = bus.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            events,
            subscription,
        }
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Drain the recording.
    pub fn take(&self) -> Vec<Event> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Recorded events of one kind.
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    /// Stop recording.
    pub fn detach(self) -> Vec<Event> {
        self.subscription.unsubscribe();
        self.events.take()
    }
}
