//! Key-event pass-through.
//!
//! No buffering, no filtering: every event goes straight to the machine,
//! which owns the key mapping and ignores codes it does not know.

use crate::machine::Machine;

pub struct InputRouter;

impl InputRouter {
    pub fn key_down(machine: &mut dyn Machine, code: &str) {
        machine.handle_key(code, true);
    }

    pub fn key_up(machine: &mut dyn Machine, code: &str) {
        machine.handle_key(code, false);
    }
}
