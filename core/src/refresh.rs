//! Display-refresh facility: the host's "call me on the next refresh" service.
//!
//! A [`RefreshSource`] hands out one [`ScheduleHandle`] per request and
//! guarantees each handle fires at most once. [`FrameQueue`] is the pollable
//! implementation used by hosts that own their loop (the SDL frontend drains
//! it once per vsync'd present, the headless runner once per iteration).

/// Token for one pending refresh callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host facility that fires callbacks timed to the display refresh.
pub trait RefreshSource {
    /// Request a callback on the next display refresh.
    fn request(&mut self) -> ScheduleHandle;

    /// Withdraw a pending request. Cancelling a handle that already fired or
    /// was already cancelled is a no-op.
    fn cancel(&mut self, handle: ScheduleHandle);
}

/// Pollable refresh source. Requests accumulate until the host calls
/// [`take_due`](Self::take_due) at its next display refresh.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<ScheduleHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every handle due at this refresh. Each returned
    /// handle is consumed and will never be returned again.
    pub fn take_due(&mut self) -> Vec<ScheduleHandle> {
        std::mem::take(&mut self.pending)
    }

    /// Number of requests that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        self.pending.contains(&handle)
    }
}

impl RefreshSource for FrameQueue {
    fn request(&mut self) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: ScheduleHandle) {
        self.pending.retain(|&h| h != handle);
    }
}
