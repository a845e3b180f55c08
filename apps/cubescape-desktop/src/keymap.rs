use cubescape_input::InputId;
use winit::keyboard::KeyCode;

/// Logical input id for a physical key, or `None` for keys the scene ignores.
pub fn input_id(code: KeyCode) -> Option<InputId> {
    use KeyCode::*;
    let id = match code {
        Backspace => InputId::Backspace,
        Tab => InputId::Tab,
        Enter | NumpadEnter => InputId::Enter,
        ShiftLeft | ShiftRight => InputId::Shift,
        ControlLeft | ControlRight => InputId::Ctrl,
        AltLeft | AltRight => InputId::Alt,
        Escape => InputId::Escape,
        Space => InputId::Space,
        ArrowLeft => InputId::Left,
        ArrowUp => InputId::Up,
        ArrowRight => InputId::Right,
        ArrowDown => InputId::Down,
        F1 => InputId::F(1),
        F2 => InputId::F(2),
        F3 => InputId::F(3),
        F4 => InputId::F(4),
        F5 => InputId::F(5),
        F6 => InputId::F(6),
        F7 => InputId::F(7),
        F8 => InputId::F(8),
        F9 => InputId::F(9),
        F10 => InputId::F(10),
        F11 => InputId::F(11),
        F12 => InputId::F(12),
        other => return character(other).map(InputId::Char),
    };
    Some(id)
}

fn character(code: KeyCode) -> Option<char> {
    use KeyCode::*;
    Some(match code {
        KeyA => 'A',
        KeyB => 'B',
        KeyC => 'C',
        KeyD => 'D',
        KeyE => 'E',
        KeyF => 'F',
        KeyG => 'G',
        KeyH => 'H',
        KeyI => 'I',
        KeyJ => 'J',
        KeyK => 'K',
        KeyL => 'L',
        KeyM => 'M',
        KeyN => 'N',
        KeyO => 'O',
        KeyP => 'P',
        KeyQ => 'Q',
        KeyR => 'R',
        KeyS => 'S',
        KeyT => 'T',
        KeyU => 'U',
        KeyV => 'V',
        KeyW => 'W',
        KeyX => 'X',
        KeyY => 'Y',
        KeyZ => 'Z',
        Digit0 => '0',
        Digit1 => '1',
        Digit2 => '2',
        Digit3 => '3',
        Digit4 => '4',
        Digit5 => '5',
        Digit6 => '6',
        Digit7 => '7',
        Digit8 => '8',
        Digit9 => '9',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_map_to_chars() {
        assert_eq!(input_id(KeyCode::KeyW), Some(InputId::Char('W')));
        assert_eq!(input_id(KeyCode::Digit7), Some(InputId::Char('7')));
        assert_eq!(input_id(KeyCode::Space), Some(InputId::Space));
    }

    #[test]
    fn both_modifiers_collapse() {
        assert_eq!(input_id(KeyCode::ShiftLeft), input_id(KeyCode::ShiftRight));
        assert_eq!(input_id(KeyCode::ControlRight), Some(InputId::Ctrl));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(input_id(KeyCode::PrintScreen), None);
        assert_eq!(input_id(KeyCode::F13), None);
    }
}
