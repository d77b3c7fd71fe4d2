#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use lantern_core::machine::{LoadOptions, Machine, MachineError};

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 3;

/// Observable state of a [`MockMachine`], shared with the test body.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<String>,
    pub rom: Vec<u8>,
    pub options: LoadOptions,
    pub title: String,
    pub battery: bool,
    pub dirty: bool,
    pub ram: Vec<u8>,
    pub ticks: u64,
    /// Ticks per frame; `tick()` reports ready on every Nth call.
    pub ticks_per_frame: u64,
    pub fail_load: bool,
    pub fail_tick_at: Option<u64>,
    pub keys: Vec<(String, bool)>,
    /// Green and blue of every rendered pixel.
    pub fill: [u8; 3],
}

impl MockState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

/// Scripted machine that records every call made to it.
pub struct MockMachine {
    pub state: Rc<RefCell<MockState>>,
}

impl MockMachine {
    pub fn new(title: &str, battery: bool) -> (Self, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState {
            title: title.to_string(),
            battery,
            ticks_per_frame: 10,
            ram: vec![0; 16],
            ..Default::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl Machine for MockMachine {
    fn display_size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn reset(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push("reset".into());
        s.rom.clear();
        s.ticks = 0;
        s.dirty = false;
        s.ram = vec![0; 16];
    }

    fn load_rom(&mut self, rom: &[u8], options: LoadOptions) -> Result<(), MachineError> {
        let mut s = self.state.borrow_mut();
        s.calls.push("load_rom".into());
        if s.fail_load {
            return Err(MachineError::InvalidRom("bad header".into()));
        }
        s.rom = rom.to_vec();
        s.options = options;
        Ok(())
    }

    fn tick(&mut self) -> Result<bool, MachineError> {
        let mut s = self.state.borrow_mut();
        s.ticks += 1;
        if s.fail_tick_at == Some(s.ticks) {
            return Err(MachineError::Fault("illegal opcode".into()));
        }
        if s.ticks % s.ticks_per_frame == 0 {
            s.calls.push("frame".into());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Red channel carries the pixel index, green and blue come from `fill`.
    fn render_frame(&self, buffer: &mut [u8]) {
        let mut s = self.state.borrow_mut();
        s.calls.push("render".into());
        for (i, px) in buffer.chunks_exact_mut(3).enumerate() {
            px.copy_from_slice(&[i as u8, s.fill[1], s.fill[2]]);
        }
    }

    fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    fn handle_key(&mut self, code: &str, pressed: bool) {
        self.state
            .borrow_mut()
            .keys
            .push((code.to_string(), pressed));
    }

    fn has_battery(&self) -> bool {
        self.state.borrow().battery
    }

    fn is_battery_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    fn mark_battery_clean(&mut self) {
        self.state.borrow_mut().dirty = false;
    }

    fn save_data(&self) -> Vec<u8> {
        let mut s = self.state.borrow_mut();
        s.calls.push("save_data".into());
        s.ram.clone()
    }

    fn load_save_data(&mut self, data: &[u8]) {
        let mut s = self.state.borrow_mut();
        let msg = format!("load_save_data:ticks={}", s.ticks);
        s.calls.push(msg);
        s.ram = data.to_vec();
    }
}
