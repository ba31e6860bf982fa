//! Event identifiers: the keys handler chains are stored under.
//!
//! Extensions name events with strings such as `"enter"`, `"ctrl_s"`, `"space"` or
//! `"before:enter"`. These parse into a typed [`Trigger`] so the registry and the host
//! never compare raw strings. The string spelling is preserved where two spellings name
//! the same physical key (`"space"` vs `" "`); the normalizer folds those afterwards.

use crate::error::ExtensionError;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt;
use std::str::FromStr;

/// Prefix marking the pre-event phase in string identifiers.
pub const BEFORE_PREFIX: &str = "before:";

/// Modifier keys held during a key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, alt: false, shift: false };
    pub const CTRL: Self = Self { ctrl: true, alt: false, shift: false };
    pub const ALT: Self = Self { ctrl: false, alt: true, shift: false };
    pub const SHIFT: Self = Self { ctrl: false, alt: false, shift: true };
    pub const CTRL_ALT: Self = Self { ctrl: true, alt: true, shift: false };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A physical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal character, exactly as typed (case included).
    Char(char),
    /// The symbolic spelling of the space bar; folds into `Char(' ')`.
    Space,
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
}

impl Key {
    fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::Char(c));
        }
        Some(match name {
            "space" => Self::Space,
            "enter" => Self::Enter,
            "backspace" => Self::Backspace,
            "delete" => Self::Delete,
            "tab" => Self::Tab,
            "backtab" => Self::BackTab,
            "esc" => Self::Esc,
            "left" => Self::Left,
            "right" => Self::Right,
            "up" => Self::Up,
            "down" => Self::Down,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "insert" => Self::Insert,
            other => {
                let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
                Self::F(n)
            }
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Char(c) => return write!(f, "{c}"),
            Self::F(n) => return write!(f, "f{n}"),
            Self::Space => "space",
            Self::Enter => "enter",
            Self::Backspace => "backspace",
            Self::Delete => "delete",
            Self::Tab => "tab",
            Self::BackTab => "backtab",
            Self::Esc => "esc",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Home => "home",
            Self::End => "end",
            Self::PageUp => "pageup",
            Self::PageDown => "pagedown",
            Self::Insert => "insert",
        };
        f.write_str(name)
    }
}

/// Identifies a dispatchable event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventId {
    /// A key chord.
    Key { mods: Modifiers, key: Key },
    /// The catch-all `*`, fired on every keystroke in addition to the specific key.
    AnyKey,
    /// Bracketed paste.
    Paste,
    /// Session shutdown, fired once.
    Exit,
    /// Any other lifecycle tag.
    Custom(String),
}

impl EventId {
    /// A key with no modifiers.
    pub fn key(key: Key) -> Self {
        Self::Key { mods: Modifiers::NONE, key }
    }

    /// A literal character with no modifiers.
    pub fn char(c: char) -> Self {
        Self::key(Key::Char(c))
    }

    pub fn chord(mods: Modifiers, key: Key) -> Self {
        Self::Key { mods, key }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key { .. })
    }

    /// Parse a string identifier such as `"ctrl_s"`, `"space"` or `"*"`.
    ///
    /// Unknown multi-character names without modifiers become [`EventId::Custom`].
    pub fn parse(s: &str) -> Result<Self, ExtensionError> {
        match s {
            "" => return Err(ExtensionError::InvalidTrigger(s.to_string())),
            "*" => return Ok(Self::AnyKey),
            "paste" => return Ok(Self::Paste),
            "exit" => return Ok(Self::Exit),
            _ => {}
        }

        let mut mods = Modifiers::NONE;
        let mut rest = s;
        loop {
            if let Some(r) = rest.strip_prefix("ctrl_").filter(|r| !r.is_empty()) {
                mods.ctrl = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("alt_").filter(|r| !r.is_empty()) {
                mods.alt = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("shift_").filter(|r| !r.is_empty()) {
                mods.shift = true;
                rest = r;
            } else {
                break;
            }
        }

        match Key::from_name(rest) {
            Some(key) => Ok(Self::Key { mods, key }),
            None if mods.is_empty() => Ok(Self::Custom(s.to_string())),
            None => Err(ExtensionError::InvalidTrigger(s.to_string())),
        }
    }

    /// Convert a crossterm key press into an identifier.
    ///
    /// Characters keep their typed case and drop SHIFT (the case already carries it).
    /// Back-tab always carries SHIFT, whatever the terminal reported.
    pub fn from_key_event(ev: &KeyEvent) -> Option<Self> {
        if ev.kind == KeyEventKind::Release {
            return None;
        }
        let mut mods = Modifiers {
            ctrl: ev.modifiers.contains(KeyModifiers::CONTROL),
            alt: ev.modifiers.contains(KeyModifiers::ALT),
            shift: ev.modifiers.contains(KeyModifiers::SHIFT),
        };
        let key = match ev.code {
            KeyCode::Char(c) => {
                mods.shift = false;
                Key::Char(c)
            }
            KeyCode::BackTab => {
                mods.shift = true;
                Key::BackTab
            }
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::Esc => Key::Esc,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Insert => Key::Insert,
            KeyCode::F(n) => Key::F(n),
            _ => return None,
        };
        Some(Self::Key { mods, key })
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { mods, key } => {
                if mods.ctrl {
                    f.write_str("ctrl_")?;
                }
                if mods.alt {
                    f.write_str("alt_")?;
                }
                if mods.shift {
                    f.write_str("shift_")?;
                }
                write!(f, "{key}")
            }
            Self::AnyKey => f.write_str("*"),
            Self::Paste => f.write_str("paste"),
            Self::Exit => f.write_str("exit"),
            Self::Custom(s) => f.write_str(s),
        }
    }
}

impl FromStr for EventId {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which half of an event a handler runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before the host's default handling (`before:<event>`).
    Pre,
    /// Runs after the host's default handling.
    Main,
}

/// An event identifier plus the phase it fires in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub phase: Phase,
    pub event: EventId,
}

impl Trigger {
    pub fn main(event: EventId) -> Self {
        Self { phase: Phase::Main, event }
    }

    pub fn pre(event: EventId) -> Self {
        Self { phase: Phase::Pre, event }
    }

    /// Parse `"enter"` or `"before:enter"`.
    pub fn parse(s: &str) -> Result<Self, ExtensionError> {
        match s.strip_prefix(BEFORE_PREFIX) {
            Some(rest) => Ok(Self::pre(EventId::parse(rest)?)),
            None => Ok(Self::main(EventId::parse(s)?)),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Pre => write!(f, "{BEFORE_PREFIX}{}", self.event),
            Phase::Main => write!(f, "{}", self.event),
        }
    }
}
