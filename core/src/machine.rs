/// Options handed to [`Machine::load_rom`] alongside the ROM image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Run the cartridge on the base hardware variant even if its header
    /// advertises support for an enhanced one.
    pub force_base_mode: bool,
}

/// Failure signalled by a machine during load or tick.
///
/// The host never interprets these; they are passed straight through to the
/// user. Internal emulation state is the machine's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    /// The ROM image was rejected by the machine (bad header, unsupported
    /// mapper, truncated image, ...).
    InvalidRom(String),

    /// The machine hit an unrecoverable condition while running.
    Fault(String),
}

impl std::fmt::Display for MachineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRom(reason) => write!(f, "invalid ROM: {reason}"),
            Self::Fault(reason) => write!(f, "machine fault: {reason}"),
        }
    }
}

impl std::error::Error for MachineError {}

/// Capability set of a hosted, cycle-stepping machine.
///
/// The host owns exactly one machine per session and is the only caller.
/// Nothing here is called concurrently: ticks, key updates and save
/// queries are interleaved only at refresh-callback boundaries.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Return the machine to its clean power-on state, dropping any loaded ROM.
    fn reset(&mut self);

    /// Load a ROM image. The machine keeps its own copy of whatever it needs.
    fn load_rom(&mut self, rom: &[u8], options: LoadOptions) -> Result<(), MachineError>;

    /// Advance the machine by one internal step.
    ///
    /// A step is whatever granularity the machine finds natural (an
    /// instruction, a scanline, ...). Returns `true` once a complete frame
    /// is ready to display.
    fn tick(&mut self) -> Result<bool, MachineError>;

    /// Render the current frame into an RGB24 pixel buffer.
    ///
    /// The buffer is `width * height * 3` bytes (from `display_size()`),
    /// left-to-right, top-to-bottom.
    fn render_frame(&self, buffer: &mut [u8]);

    /// Cartridge title as reported by the loaded ROM. Used as the save key.
    fn title(&self) -> String;

    /// Update key state. `code` is the host's device key-code name (e.g.
    /// "Up", "Return", "X"); codes the machine does not map are ignored.
    fn handle_key(&mut self, code: &str, pressed: bool);

    /// Whether the loaded cartridge carries battery-backed RAM.
    fn has_battery(&self) -> bool;

    /// Whether battery RAM changed since it was last marked clean.
    fn is_battery_dirty(&self) -> bool;

    /// Clear the dirty flag after the host has persisted the contents.
    fn mark_battery_clean(&mut self);

    /// Raw battery RAM contents.
    fn save_data(&self) -> Vec<u8>;

    /// Restore battery RAM from a previously saved blob.
    fn load_save_data(&mut self, data: &[u8]);
}
