//! Test-card machine.
//!
//! A stand-in cartridge console for exercising the host without a full
//! emulation core. It understands the handheld cartridge header layout
//! (title, colour flag, cartridge type, RAM size), steps one scanline per
//! tick, and draws a scrolling pattern derived from the ROM bytes with a
//! button strip along the bottom edge. Pressing A on a battery cartridge
//! bumps a counter in battery RAM so save persistence has something to do.

use lantern_core::machine::{LoadOptions, Machine, MachineError};

use crate::registry::MachineEntry;

pub const WIDTH: u32 = 160;
pub const HEIGHT: u32 = 144;

/// Visible lines plus vertical blank.
pub const LINES_PER_FRAME: u32 = 154;

const HEADER_END: usize = 0x150;
const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;
const COLOR_FLAG: usize = 0x143;
const CART_TYPE: usize = 0x147;
const RAM_SIZE: usize = 0x149;

/// Cartridge types with a battery on the board.
const BATTERY_TYPES: &[u8] = &[
    0x03, 0x06, 0x09, 0x0D, 0x0F, 0x10, 0x13, 0x1B, 0x1E, 0x22, 0xFF,
];

const MBC2: u8 = 0x06;
const MBC2_RAM: usize = 512;

const BUTTON_STRIP: u32 = 8;

const GREY: [[u8; 3]; 4] = [
    [0xFF, 0xFF, 0xFF],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x00, 0x00, 0x00],
];

const TINTED: [[u8; 3]; 4] = [
    [0xE0, 0xF8, 0xD0],
    [0x88, 0xC0, 0x70],
    [0x34, 0x68, 0x56],
    [0x08, 0x18, 0x20],
];

// Button bits
const RIGHT: u8 = 0;
const LEFT: u8 = 1;
const UP: u8 = 2;
const DOWN: u8 = 3;
const A: u8 = 4;
const B: u8 = 5;
const SELECT: u8 = 6;
const START: u8 = 7;

fn button_for(code: &str) -> Option<u8> {
    match code {
        "Right" => Some(RIGHT),
        "Left" => Some(LEFT),
        "Up" => Some(UP),
        "Down" => Some(DOWN),
        "X" => Some(A),
        "Z" => Some(B),
        "Backspace" => Some(SELECT),
        "Return" => Some(START),
        _ => None,
    }
}

fn ram_size(code: u8) -> usize {
    match code {
        0x01 => 2 * 1024,
        0x02 => 8 * 1024,
        0x03 => 32 * 1024,
        0x04 => 128 * 1024,
        0x05 => 64 * 1024,
        _ => 0,
    }
}

fn parse_title(rom: &[u8], color: bool) -> String {
    // On colour-aware carts the last title byte is the colour flag.
    let end = if color { COLOR_FLAG } else { TITLE_END };
    let title: String = rom[TITLE_START..end]
        .iter()
        .take_while(|&&b| b != 0)
        .filter(|b| b.is_ascii_graphic() || **b == b' ')
        .map(|&b| b as char)
        .collect();
    let title = title.trim();
    if title.is_empty() {
        "UNTITLED".to_string()
    } else {
        title.to_string()
    }
}

pub struct TestCard {
    rom: Vec<u8>,
    title: String,
    color: bool,
    battery: bool,
    ram: Vec<u8>,
    dirty: bool,
    line: u32,
    frame_count: u64,
    buttons: u8,
    framebuffer: Vec<u8>,
}

impl TestCard {
    pub fn new() -> Self {
        Self {
            rom: Vec::new(),
            title: String::new(),
            color: false,
            battery: false,
            ram: Vec::new(),
            dirty: false,
            line: 0,
            frame_count: 0,
            buttons: 0,
            framebuffer: vec![0; (WIDTH * HEIGHT * 3) as usize],
        }
    }

    /// Whether the enhanced colour palette is in use.
    pub fn is_color(&self) -> bool {
        self.color
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    fn palette(&self) -> &'static [[u8; 3]; 4] {
        if self.color { &TINTED } else { &GREY }
    }

    fn draw_line(&mut self, y: u32) {
        let palette = self.palette();
        let row = (y * WIDTH * 3) as usize;

        for x in 0..WIDTH {
            let shade = if y >= HEIGHT - BUTTON_STRIP {
                // One cell per button, lit while held.
                let bit = (x * 8 / WIDTH) as u8;
                if self.buttons & (1 << bit) != 0 { 3 } else { 0 }
            } else {
                let index = (y * WIDTH + x) as usize + self.frame_count as usize;
                (self.rom[index % self.rom.len()] >> 6) as usize
            };
            let offset = row + (x * 3) as usize;
            self.framebuffer[offset..offset + 3].copy_from_slice(&palette[shade]);
        }
    }
}

impl Default for TestCard {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for TestCard {
    fn display_size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn load_rom(&mut self, rom: &[u8], options: LoadOptions) -> Result<(), MachineError> {
        if rom.len() < HEADER_END {
            return Err(MachineError::InvalidRom(format!(
                "{} bytes is too short for a cartridge header",
                rom.len()
            )));
        }

        let color_capable = rom[COLOR_FLAG] & 0x80 != 0;
        let cart_type = rom[CART_TYPE];
        let ram_len = if cart_type == MBC2 {
            MBC2_RAM
        } else {
            ram_size(rom[RAM_SIZE])
        };

        self.title = parse_title(rom, color_capable);
        self.color = color_capable && !options.force_base_mode;
        self.battery = BATTERY_TYPES.contains(&cart_type) && ram_len > 0;
        self.ram = vec![0; ram_len];
        self.dirty = false;
        self.rom = rom.to_vec();

        log::debug!(
            "testcard: \"{}\" type 0x{cart_type:02X}, {ram_len} bytes RAM, color={}",
            self.title,
            self.color
        );
        Ok(())
    }

    fn tick(&mut self) -> Result<bool, MachineError> {
        if self.rom.is_empty() {
            return Err(MachineError::Fault("no cartridge loaded".into()));
        }

        if self.line < HEIGHT {
            self.draw_line(self.line);
        }
        self.line += 1;

        if self.line == LINES_PER_FRAME {
            self.line = 0;
            self.frame_count += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        buffer.copy_from_slice(&self.framebuffer);
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn handle_key(&mut self, code: &str, pressed: bool) {
        let Some(bit) = button_for(code) else {
            return;
        };

        let was_held = self.buttons & (1 << bit) != 0;
        if pressed {
            self.buttons |= 1 << bit;
        } else {
            self.buttons &= !(1 << bit);
        }

        if bit == A && pressed && !was_held && self.battery {
            self.ram[0] = self.ram[0].wrapping_add(1);
            self.dirty = true;
        }
    }

    fn has_battery(&self) -> bool {
        self.battery
    }

    fn is_battery_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_battery_clean(&mut self) {
        self.dirty = false;
    }

    fn save_data(&self) -> Vec<u8> {
        self.ram.clone()
    }

    /// Short blobs fill the front of RAM; extra bytes are ignored.
    fn load_save_data(&mut self, data: &[u8]) {
        let len = data.len().min(self.ram.len());
        self.ram[..len].copy_from_slice(&data[..len]);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn create_machine() -> Box<dyn Machine> {
    Box::new(TestCard::new())
}

inventory::submit! {
    MachineEntry::new("testcard", "scanline test pattern with battery RAM", create_machine)
}
