//! Wall-clock timers driven by polling.
//!
//! `draw_web()` calls at ~60fps. Instead of registering browser timers, the
//! session keeps its timers as plain values and asks each one, once per frame,
//! whether it is due. Every timer reports the time it was *scheduled* to fire,
//! never the frame time, so game logic stays deterministic and fully testable.
//!
//! - [`Interval`]: fixed-period repeating timer with bounded catch-up.
//! - [`Timeout`]: one-shot timer.
//! - [`Debounce`]: trailing one-shot that also fires after a maximum wait.

/// Repeating timer.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: u64,
    /// Firings allowed to pile up before the schedule jumps forward.
    max_catch_up: u32,
    next_due: Option<u64>,
}

impl Interval {
    pub fn new(period_ms: u64, max_catch_up: u32) -> Self {
        Self {
            period_ms: period_ms.max(1),
            max_catch_up: max_catch_up.max(1),
            next_due: None,
        }
    }

    /// (Re)start: first firing one period from `now`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due = Some(now_ms + self.period_ms);
    }

    /// No-op when not running.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.next_due
    }

    /// Consume one due firing, returning its scheduled time.
    ///
    /// If the caller fell behind by more than `max_catch_up` periods (tab in
    /// the background), the excess firings are dropped and only the most
    /// recent `max_catch_up` are delivered.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<u64> {
        let mut due = self.next_due?;
        if due > now_ms {
            return None;
        }

        let pending = (now_ms - due) / self.period_ms + 1;
        if pending > self.max_catch_up as u64 {
            let skipped = pending - self.max_catch_up as u64;
            due += skipped * self.period_ms;
            log::debug!("interval {}ms: skipped {skipped} missed firings", self.period_ms);
        }

        self.next_due = Some(due + self.period_ms);
        Some(due)
    }
}

/// One-shot timer.
#[derive(Debug, Clone, Default)]
pub struct Timeout {
    due: Option<u64>,
}

impl Timeout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm to fire `delay_ms` after `now` unless already armed. Returns
    /// whether this call armed it.
    pub fn arm_if_idle(&mut self, now_ms: u64, delay_ms: u64) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.due = Some(now_ms + delay_ms);
        true
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<u64> {
        self.due
    }

    /// Disarm and return the scheduled time if due at `now`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<u64> {
        match self.due {
            Some(due) if due <= now_ms => {
                self.due = None;
                Some(due)
            }
            _ => None,
        }
    }
}

/// Trailing debounce with a maximum wait.
///
/// Each [`request`](Debounce::request) pushes the deadline to `now + delay`,
/// but never past `first request + max_wait`, so a steady stream of requests
/// still fires regularly.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: u64,
    max_wait_ms: u64,
    first_request: Option<u64>,
    due: Option<u64>,
}

impl Debounce {
    pub fn new(delay_ms: u64, max_wait_ms: u64) -> Self {
        Self {
            delay_ms,
            max_wait_ms: max_wait_ms.max(delay_ms),
            first_request: None,
            due: None,
        }
    }

    pub fn request(&mut self, now_ms: u64) {
        let first = *self.first_request.get_or_insert(now_ms);
        self.due = Some((now_ms + self.delay_ms).min(first + self.max_wait_ms));
    }

    pub fn cancel(&mut self) {
        self.first_request = None;
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<u64> {
        self.due
    }

    pub fn pop_due(&mut self, now_ms: u64) -> Option<u64> {
        match self.due {
            Some(due) if due <= now_ms => {
                self.cancel();
                Some(due)
            }
            _ => None,
        }
    }
}
