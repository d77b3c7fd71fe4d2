//! The host session: one machine, one scheduler, one display, one store.
//!
//! Everything mutable about a running host lives in [`Session`]. The host
//! drives it from two places only: [`Session::load`] when the user picks a
//! ROM, and [`Session::on_refresh`] when a requested refresh fires. Key
//! events may arrive between the two at any callback boundary.

use crate::display::{Compositor, DisplayScale, Surface};
use crate::input::InputRouter;
use crate::loader::{self, LoadError};
use crate::machine::{LoadOptions, Machine, MachineError};
use crate::persistence::{KeyValueStore, Persistence};
use crate::refresh::{FrameQueue, RefreshSource, ScheduleHandle};
use crate::scheduler::{Scheduler, SchedulerState};

/// Host-side limits applied by the loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Reject ROMs larger than this many bytes. `None` accepts any size.
    pub max_rom_size: Option<usize>,
}

/// What happened when a refresh callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The handle was cancelled or superseded; nothing ran.
    Stale,
    /// A frame was composited. `saved` reports whether battery RAM was
    /// written to the store.
    Frame { saved: bool },
}

pub struct Session<S: KeyValueStore, R: RefreshSource> {
    machine: Box<dyn Machine>,
    persistence: Persistence<S>,
    refresh: R,
    scheduler: Scheduler,
    compositor: Compositor,
    frame: Vec<u8>,
    scale: DisplayScale,
    config: SessionConfig,
    title: Option<String>,
    frames: u64,
}

impl<S: KeyValueStore, R: RefreshSource> Session<S, R> {
    pub fn new(
        machine: Box<dyn Machine>,
        store: S,
        refresh: R,
        config: SessionConfig,
        scale: DisplayScale,
    ) -> Self {
        let (width, height) = machine.display_size();
        let compositor = Compositor::new(width, height);
        let frame = vec![0; compositor.frame_len()];
        Self {
            machine,
            persistence: Persistence::new(store),
            refresh,
            scheduler: Scheduler::new(),
            compositor,
            frame,
            scale,
            config,
            title: None,
            frames: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Loader
    // -----------------------------------------------------------------------

    /// Load a ROM and start running it. Returns the cartridge title.
    ///
    /// Rejected selections (empty or oversized) leave the session exactly
    /// as it was. Otherwise the running loop is cancelled before the machine
    /// is reset, so no callback from the old session can tick the new one.
    /// A stored save for the title is restored before the first tick.
    pub fn load(&mut self, rom: &[u8], options: LoadOptions) -> Result<String, LoadError> {
        if let Err(e) = loader::validate(rom, self.config.max_rom_size) {
            log::warn!("ROM rejected: {e}");
            return Err(e);
        }

        self.scheduler.cancel(&mut self.refresh);
        self.title = None;
        self.frames = 0;

        self.machine.reset();
        self.machine.load_rom(rom, options)?;
        self.resize_for_machine();

        let title = self.machine.title();
        if self.machine.has_battery() {
            match self.persistence.try_load(&title) {
                Some(data) => {
                    log::info!("restored {} bytes of battery RAM", data.len());
                    self.machine.load_save_data(&data);
                }
                None => log::info!("no save found for \"{title}\""),
            }
        }

        self.scheduler.start(&mut self.refresh);
        log::info!("running \"{title}\" ({} byte ROM)", rom.len());
        self.title = Some(title.clone());
        Ok(title)
    }

    fn resize_for_machine(&mut self) {
        let (width, height) = self.machine.display_size();
        if self.compositor.base_size() != (width, height) {
            self.compositor = Compositor::new(width, height);
            self.frame = vec![0; self.compositor.frame_len()];
        }
    }

    // -----------------------------------------------------------------------
    // Scheduler
    // -----------------------------------------------------------------------

    /// Refresh callback. Ticks the machine until it has a frame, composites
    /// it, persists dirty battery RAM, then requests the next refresh.
    ///
    /// A machine error stops the loop; the session stays loadable.
    pub fn on_refresh(&mut self, handle: ScheduleHandle) -> Result<RefreshOutcome, MachineError> {
        if !self.scheduler.claim(handle) {
            return Ok(RefreshOutcome::Stale);
        }

        if let Err(e) = self.run_until_frame() {
            self.scheduler.stop();
            log::error!("machine stopped: {e}");
            return Err(e);
        }

        self.machine.render_frame(&mut self.frame);
        self.compositor.composite(&self.frame, self.scale);

        let saved = match self.persistence.maybe_save(self.machine.as_mut()) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("failed to save battery RAM: {e}");
                false
            }
        };

        self.scheduler.rearm(&mut self.refresh);
        self.frames += 1;
        Ok(RefreshOutcome::Frame { saved })
    }

    fn run_until_frame(&mut self) -> Result<(), MachineError> {
        while !self.machine.tick()? {}
        Ok(())
    }

    /// Stop the loop. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.scheduler.cancel(&mut self.refresh);
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // -----------------------------------------------------------------------
    // Input and display
    // -----------------------------------------------------------------------

    pub fn key_down(&mut self, code: &str) {
        InputRouter::key_down(self.machine.as_mut(), code);
    }

    pub fn key_up(&mut self, code: &str) {
        InputRouter::key_up(self.machine.as_mut(), code);
    }

    /// Takes effect on the next composited frame.
    pub fn set_scale(&mut self, scale: DisplayScale) {
        self.scale = scale;
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn surface(&self) -> &Surface {
        self.compositor.surface()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Title of the running cartridge, if a load succeeded.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Frames composited since the last successful load.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn machine(&self) -> &dyn Machine {
        self.machine.as_ref()
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn refresh(&self) -> &R {
        &self.refresh
    }

    pub fn refresh_mut(&mut self) -> &mut R {
        &mut self.refresh
    }
}

impl<S: KeyValueStore> Session<S, FrameQueue> {
    /// Fire every refresh callback due now. Returns the number of frames
    /// composited.
    pub fn pump(&mut self) -> Result<usize, MachineError> {
        let mut composited = 0;
        for handle in self.refresh.take_due() {
            if let RefreshOutcome::Frame { .. } = self.on_refresh(handle)? {
                composited += 1;
            }
        }
        Ok(composited)
    }
}
