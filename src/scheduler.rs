use crate::TimerId;
use slotmap::SlotMap;

/// The discrete-event scheduler which drives the traffic manager.
pub trait Scheduler {
    /// Gets the current simulation time in s.
    fn now(&self) -> f64;

    /// Gets the interval between insertion sweeps in s.
    fn update_interval(&self) -> f64;

    /// Whether the connection to the traffic simulation is ready for commands.
    fn is_ready(&self) -> bool;

    /// Arms a timer which fires at the given simulation time.
    fn schedule_at(&mut self, time: f64) -> TimerId;

    /// Cancels a timer. Does nothing if the timer has already fired.
    fn cancel(&mut self, timer: TimerId);
}

/// A deterministic, single threaded [Scheduler].
///
/// Time only advances when the owner calls [EventScheduler::pop_due].
#[derive(Clone, Debug)]
pub struct EventScheduler {
    /// The current time in s.
    now: f64,
    /// The update interval in s.
    interval: f64,
    /// Whether the connection is ready.
    ready: bool,
    /// The pending timers, with their firing time and sequence number.
    timers: SlotMap<TimerId, (f64, usize)>,
    /// The next sequence number.
    seq: usize,
}

impl EventScheduler {
    /// Creates a scheduler at time zero with the given update interval in s.
    pub fn new(interval: f64) -> Self {
        Self {
            now: 0.0,
            interval,
            ready: true,
            timers: SlotMap::with_key(),
            seq: 0,
        }
    }

    /// Sets whether the connection is ready.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Gets the number of armed timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Fires the earliest timer due at or before `until`, advancing the clock to it.
    /// Timers due at the same time fire in the order they were armed.
    pub fn pop_due(&mut self, until: f64) -> Option<TimerId> {
        let (id, (time, _)) = self
            .timers
            .iter()
            .filter(|(_, (time, _))| *time <= until)
            .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(id, entry)| (id, *entry))?;
        self.timers.remove(id);
        self.now = f64::max(self.now, time);
        Some(id)
    }
}

impl Scheduler for EventScheduler {
    fn now(&self) -> f64 {
        self.now
    }

    fn update_interval(&self) -> f64 {
        self.interval
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn schedule_at(&mut self, time: f64) -> TimerId {
        self.seq += 1;
        self.timers.insert((time, self.seq))
    }

    fn cancel(&mut self, timer: TimerId) {
        self.timers.remove(timer);
    }
}
