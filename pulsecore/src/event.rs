//! Notifications from the scheduler to the display layer.

use crate::trajectory::TrajectorySnapshot;

/// What the scheduler tells its subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseEvent {
    /// The heart flipped. Emitted once per tick.
    Toggled { icon_on: bool },
    /// A parameter changed or the ramp was reset.
    TrajectoryChanged(TrajectorySnapshot),
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

type Callback = Box<dyn FnMut(&PulseEvent)>;

/// Ordered list of subscriber callbacks.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &PulseEvent) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}
