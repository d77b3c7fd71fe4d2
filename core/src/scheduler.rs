//! Frame-pacing state machine.
//!
//! The scheduler is either [`Idle`](SchedulerState::Idle) or
//! [`Running`](SchedulerState::Running) with exactly one outstanding
//! [`ScheduleHandle`]. It never holds more than one: arming while running
//! cancels the previous request first.

use crate::refresh::{RefreshSource, ScheduleHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running(ScheduleHandle),
}

#[derive(Debug)]
pub struct Scheduler {
    state: SchedulerState,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }

    /// The outstanding handle, if running.
    pub fn handle(&self) -> Option<ScheduleHandle> {
        match self.state {
            SchedulerState::Running(handle) => Some(handle),
            SchedulerState::Idle => None,
        }
    }

    /// Idle -> Running. If already running, the old request is withdrawn
    /// before the new one is made.
    pub fn start(&mut self, refresh: &mut dyn RefreshSource) -> ScheduleHandle {
        self.cancel(refresh);
        let handle = refresh.request();
        log::debug!("scheduler: idle -> running (handle {})", handle.id());
        self.state = SchedulerState::Running(handle);
        handle
    }

    /// Running -> Idle. Withdraws the outstanding request so it can never
    /// fire. No-op when idle.
    pub fn cancel(&mut self, refresh: &mut dyn RefreshSource) {
        if let SchedulerState::Running(handle) = self.state {
            refresh.cancel(handle);
            log::debug!("scheduler: running -> idle (cancelled {})", handle.id());
            self.state = SchedulerState::Idle;
        }
    }

    /// Claim a fired callback. Returns `true` only for the outstanding
    /// handle; the handle is consumed and the scheduler must be re-armed or
    /// stopped before the next refresh. Stale handles are refused.
    pub fn claim(&mut self, fired: ScheduleHandle) -> bool {
        match self.state {
            SchedulerState::Running(handle) if handle == fired => true,
            _ => {
                log::debug!("scheduler: ignoring stale handle {}", fired.id());
                false
            }
        }
    }

    /// Replace the consumed handle with a fresh request for the next refresh.
    pub fn rearm(&mut self, refresh: &mut dyn RefreshSource) -> ScheduleHandle {
        let handle = refresh.request();
        self.state = SchedulerState::Running(handle);
        handle
    }

    /// Drop back to idle after the outstanding handle has fired without
    /// re-arming (the handle is already consumed, nothing to cancel).
    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
