//! Economy change notifications.
//!
//! Every mutating session call emits one event. Renderers either register a
//! callback or take a channel receiver; the bus does not care which.

use sim_core::Stage;
use std::fmt;
use std::sync::mpsc;

/// Outcome of applying time spent away.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OfflineReport {
    /// Raw time since the last save.
    pub elapsed_ms: u64,
    /// Portion actually replayed after the cap.
    pub applied_ms: u64,
    /// Whether the cap cut the replay short.
    pub capped: bool,
    /// Units that reached the sell queue during the replay.
    pub dispatched: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EconomyEvent {
    Clicked { total_clicks: u64 },
    WorkerHired { stage: Stage, workers: u32, cost: f64 },
    FacilityUpgraded { stage: Stage, level: u32, cost: f64 },
    BrandUpgraded { level: u32, cost: f64 },
    Settled { units: u64, earned: f64 },
    /// Live simulation ran `steps` fixed steps in one frame.
    Produced { steps: u32, dispatched: f64 },
    OfflineApplied(OfflineReport),
    Saved { at_ms: i64 },
    Reset,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Returns `false` once it no longer wants events; the bus then drops it.
type Listener = Box<dyn FnMut(&EconomyEvent) -> bool + Send>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(&EconomyEvent) + Send + 'static,
    {
        self.push(Box::new(move |event| {
            listener(event);
            true
        }))
    }

    fn push(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Receive every subsequent event over a channel.
    ///
    /// The listener is removed on the first emit after the receiver is gone.
    pub fn subscribe_channel(&mut self) -> mpsc::Receiver<EconomyEvent> {
        let (tx, rx) = mpsc::channel();
        self.push(Box::new(move |event| tx.send(event.clone()).is_ok()));
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, event: EconomyEvent) {
        self.listeners.retain_mut(|(_, listener)| listener(&event));
    }
}
