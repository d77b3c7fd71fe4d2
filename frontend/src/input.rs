use sdl2::keyboard::Scancode;

/// Keys the host handles itself. These never reach the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Quit,
    ScaleUp,
    ScaleDown,
}

pub fn host_action(scancode: Scancode) -> Option<HostAction> {
    match scancode {
        Scancode::Escape => Some(HostAction::Quit),
        Scancode::Equals | Scancode::KpPlus => Some(HostAction::ScaleUp),
        Scancode::Minus | Scancode::KpMinus => Some(HostAction::ScaleDown),
        _ => None,
    }
}

/// Device key code handed to the machine: SDL's stable scancode name
/// ("Up", "Return", "X", ...).
pub fn key_code(scancode: Scancode) -> &'static str {
    scancode.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotkeys() {
        assert_eq!(host_action(Scancode::Escape), Some(HostAction::Quit));
        assert_eq!(host_action(Scancode::Equals), Some(HostAction::ScaleUp));
        assert_eq!(host_action(Scancode::KpMinus), Some(HostAction::ScaleDown));
    }

    #[test]
    fn game_keys_pass_through() {
        for sc in [Scancode::Up, Scancode::X, Scancode::Z, Scancode::Return] {
            assert_eq!(host_action(sc), None);
        }
    }
}
