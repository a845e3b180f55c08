use std::fmt;
use std::str::FromStr;

/// Printable keys tracked by character, in legacy key-code order.
pub const CHAR_KEYS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890-_+=!@#$%^&*()<,>.?/|\\{[}]~`:;\"'";

const MOUSE_DOWN_CODE: u32 = 1001;
const MOUSE_MOVE_CODE: u32 = 1002;
const MOUSE_UP_CODE: u32 = 1003;

/// A logical input identifier: a key, or one of the synthetic mouse ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputId {
    /// A printable key from [`CHAR_KEYS`]. Letters are upper case.
    Char(char),
    Backspace,
    Tab,
    Enter,
    Shift,
    Ctrl,
    Alt,
    Escape,
    Space,
    Left,
    Up,
    Right,
    Down,
    /// Function key F1 to F12. Build it with [`InputId::function`]; other
    /// numbers have no legacy code and do not survive [`InputId::from_code`].
    F(u8),
    MouseDown,
    MouseMove,
    MouseUp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown input identifier `{0}`")]
pub struct UnknownInput(pub String);

impl InputId {
    /// The id for a typed character. Lower-case letters fold to upper case
    /// and `' '` is [`InputId::Space`].
    pub fn from_char(c: char) -> Option<Self> {
        if c == ' ' {
            return Some(Self::Space);
        }
        let c = c.to_ascii_uppercase();
        CHAR_KEYS.contains(c).then_some(Self::Char(c))
    }

    /// Function key `n`, for `n` in 1..=12.
    pub fn function(n: u8) -> Option<Self> {
        (1..=12).contains(&n).then_some(Self::F(n))
    }

    /// The browser-era numeric key code for this id.
    pub fn code(self) -> u32 {
        match self {
            Self::Char(c) => c as u32,
            Self::Backspace => 8,
            Self::Tab => 9,
            Self::Enter => 13,
            Self::Shift => 16,
            Self::Ctrl => 17,
            Self::Alt => 18,
            Self::Escape => 27,
            Self::Space => 32,
            Self::Left => 37,
            Self::Up => 38,
            Self::Right => 39,
            Self::Down => 40,
            Self::F(n) => 111 + n as u32,
            Self::MouseDown => MOUSE_DOWN_CODE,
            Self::MouseMove => MOUSE_MOVE_CODE,
            Self::MouseUp => MOUSE_UP_CODE,
        }
    }

    /// Reverse of [`InputId::code`]. Some punctuation shares a code with a
    /// named key (`%` and left arrow are both 37); the named key wins.
    pub fn from_code(code: u32) -> Option<Self> {
        let named = match code {
            8 => Self::Backspace,
            9 => Self::Tab,
            13 => Self::Enter,
            16 => Self::Shift,
            17 => Self::Ctrl,
            18 => Self::Alt,
            27 => Self::Escape,
            32 => Self::Space,
            37 => Self::Left,
            38 => Self::Up,
            39 => Self::Right,
            40 => Self::Down,
            112..=123 => Self::F((code - 111) as u8),
            MOUSE_DOWN_CODE => Self::MouseDown,
            MOUSE_MOVE_CODE => Self::MouseMove,
            MOUSE_UP_CODE => Self::MouseUp,
            _ => {
                let c = char::from_u32(code)?;
                return CHAR_KEYS.contains(c).then_some(Self::Char(c));
            }
        };
        Some(named)
    }

    /// Whether this id is one of the mouse states.
    pub fn is_mouse(self) -> bool {
        matches!(self, Self::MouseDown | Self::MouseMove | Self::MouseUp)
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Char(c) => return write!(f, "{c}"),
            Self::F(n) => return write!(f, "f{n}"),
            Self::Backspace => "backspace",
            Self::Tab => "tab",
            Self::Enter => "enter",
            Self::Shift => "shift",
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Escape => "escape",
            Self::Space => "space",
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
        };
        f.write_str(name)
    }
}

impl FromStr for InputId {
    type Err = UnknownInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c).ok_or_else(|| UnknownInput(s.to_string()));
        }

        let lower = s.to_ascii_lowercase();
        let id = match lower.as_str() {
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "enter" => Self::Enter,
            "shift" => Self::Shift,
            "ctrl" => Self::Ctrl,
            "alt" => Self::Alt,
            "escape" => Self::Escape,
            "space" => Self::Space,
            "left" => Self::Left,
            "up" => Self::Up,
            "right" => Self::Right,
            "down" => Self::Down,
            "mousedown" => Self::MouseDown,
            "mousemove" => Self::MouseMove,
            "mouseup" => Self::MouseUp,
            other => other
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .and_then(Self::function)
                .ok_or_else(|| UnknownInput(s.to_string()))?,
        };
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes() {
        assert_eq!(InputId::Char('A').code(), 65);
        assert_eq!(InputId::Space.code(), 32);
        assert_eq!(InputId::Up.code(), 38);
        assert_eq!(InputId::F(1).code(), 112);
        assert_eq!(InputId::F(12).code(), 123);
    }

    #[test]
    fn codes_round_trip() {
        let mut ids: Vec<InputId> = CHAR_KEYS
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(InputId::Char)
            .collect();
        ids.extend((1..=12).map(InputId::F));
        ids.extend([
            InputId::Backspace,
            InputId::Escape,
            InputId::Space,
            InputId::Down,
            InputId::MouseMove,
        ]);
        for id in ids {
            assert_eq!(InputId::from_code(id.code()), Some(id), "{id}");
        }
    }

    #[test]
    fn named_keys_win_code_collisions() {
        assert_eq!(InputId::Char('%').code(), InputId::Left.code());
        assert_eq!(InputId::from_code(37), Some(InputId::Left));
        assert_eq!(InputId::from_code(33), Some(InputId::Char('!')));
    }

    #[test]
    fn from_char_folds_case_and_space() {
        assert_eq!(InputId::from_char('w'), Some(InputId::Char('W')));
        assert_eq!(InputId::from_char(' '), Some(InputId::Space));
        assert_eq!(InputId::from_char('é'), None);
    }

    #[test]
    fn function_keys_stay_in_range() {
        assert_eq!(InputId::function(1), Some(InputId::F(1)));
        assert_eq!(InputId::function(12), Some(InputId::F(12)));
        assert_eq!(InputId::function(0), None);
        assert_eq!(InputId::function(13), None);
        for n in 1..=12 {
            let id = InputId::function(n).unwrap();
            assert_eq!(InputId::from_code(id.code()), Some(id));
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("left".parse::<InputId>().unwrap(), InputId::Left);
        assert_eq!("F5".parse::<InputId>().unwrap(), InputId::F(5));
        assert_eq!("a".parse::<InputId>().unwrap(), InputId::Char('A'));
        assert_eq!("mousedown".parse::<InputId>().unwrap(), InputId::MouseDown);
        assert!("f13".parse::<InputId>().is_err());
        assert!("hyper".parse::<InputId>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for id in [InputId::Char(';'), InputId::Ctrl, InputId::F(9), InputId::MouseUp] {
            assert_eq!(id.to_string().parse::<InputId>().unwrap(), id);
        }
    }
}
