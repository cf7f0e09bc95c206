/// Handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u32);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    deadline: f64,
    payload: T,
}

/// One-shot timers driven by frame time instead of wall-clock callbacks.
///
/// The owner calls [`advance`](Self::advance) once per frame and then drains
/// [`pop_due`](Self::pop_due) until it returns `None`. While draining, the
/// queue's clock sits at the deadline of the timer just popped, so a timer
/// scheduled from a handler is relative to when its parent *should* have
/// fired. A single long frame therefore replays a chain of timers exactly.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    /// Current time in seconds since the queue was created.
    now: f64,
    /// Time the current advance is draining towards.
    horizon: f64,
    pending: Vec<Timer<T>>,
    next_id: u32,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            horizon: 0.0,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Seconds elapsed on this queue's clock.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `payload` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            deadline: self.now + delay.max(0.0),
            payload,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.pending.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancel everything still pending.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Move the horizon forward by `dt` seconds. Follow with `pop_due` until `None`.
    pub fn advance(&mut self, dt: f64) {
        self.horizon = self.now.max(self.horizon) + dt.max(0.0);
    }

    /// Pop the earliest timer whose deadline is within the horizon.
    /// Returns `None` (and settles the clock at the horizon) when none remain.
    pub fn pop_due(&mut self) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= self.horizon)
            .min_by(|(_, a), (_, b)| a.deadline.total_cmp(&b.deadline))
            .map(|(idx, _)| idx);

        match idx {
            Some(idx) => {
                let timer = self.pending.remove(idx);
                self.now = timer.deadline.max(self.now);
                Some(timer.payload)
            }
            None => {
                self.now = self.horizon.max(self.now);
                None
            }
        }
    }

    /// Whether a timer is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
