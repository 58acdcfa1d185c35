//! Hotkey bindings.
//!
//! A [`Binding`] is the (key code, modifier mask, unique id) tuple the OS
//! hotkey API registers. Key codes and modifier bits use the Carbon values so
//! a binding can be handed to `RegisterEventHotKey` unchanged.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// === Modifier bits (Carbon `EventModifiers`) ===

pub const CMD_KEY: u32 = 1 << 8;
pub const SHIFT_KEY: u32 = 1 << 9;
pub const OPTION_KEY: u32 = 1 << 11;
pub const CONTROL_KEY: u32 = 1 << 12;

/// Hotkey signature: 'htk1'
pub const SIG_HTK1: u32 = 0x6874_6B31;

/// `kVK_Space`
pub const KC_SPACE: u32 = 49;

/// ANSI virtual key codes accepted in hotkey strings.
const KEY_TABLE: &[(&str, u32)] = &[
    ("A", 0),
    ("S", 1),
    ("D", 2),
    ("F", 3),
    ("H", 4),
    ("G", 5),
    ("Z", 6),
    ("X", 7),
    ("C", 8),
    ("V", 9),
    ("B", 11),
    ("Q", 12),
    ("W", 13),
    ("E", 14),
    ("R", 15),
    ("Y", 16),
    ("T", 17),
    ("1", 18),
    ("2", 19),
    ("3", 20),
    ("4", 21),
    ("6", 22),
    ("5", 23),
    ("=", 24),
    ("9", 25),
    ("7", 26),
    ("-", 27),
    ("8", 28),
    ("0", 29),
    ("]", 30),
    ("O", 31),
    ("U", 32),
    ("[", 33),
    ("I", 34),
    ("P", 35),
    ("Return", 36),
    ("L", 37),
    ("J", 38),
    ("'", 39),
    ("K", 40),
    (";", 41),
    ("\\", 42),
    (",", 43),
    ("/", 44),
    ("N", 45),
    ("M", 46),
    (".", 47),
    ("Tab", 48),
    ("Space", KC_SPACE),
    ("`", 50),
    ("Delete", 51),
    ("Escape", 53),
];

/// Modifiers in display order (the order macOS menus use).
const MODIFIER_NAMES: &[(u32, &str)] = &[
    (CONTROL_KEY, "Ctrl"),
    (OPTION_KEY, "Option"),
    (SHIFT_KEY, "Shift"),
    (CMD_KEY, "Cmd"),
];

/// The id the OS hands back with every hotkey event.
///
/// Equality covers both fields: an event only belongs to a binding when the
/// signature *and* the numeric id match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId {
    pub signature: u32,
    pub id: u32,
}

impl BindingId {
    pub const fn new(signature: u32, id: u32) -> Self {
        Self { signature, id }
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new(SIG_HTK1, 1)
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.signature.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic()) {
            let code: String = bytes.iter().map(|&b| b as char).collect();
            write!(f, "'{}'#{}", code, self.id)
        } else {
            write!(f, "{:#010x}#{}", self.signature, self.id)
        }
    }
}

/// A global hotkey: virtual key code, modifier mask and unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key_code: u32,
    pub modifiers: u32,
    pub id: BindingId,
}

impl Default for Binding {
    /// Option + Space.
    fn default() -> Self {
        Self {
            key_code: KC_SPACE,
            modifiers: OPTION_KEY,
            id: BindingId::default(),
        }
    }
}

impl Binding {
    pub fn new(key_code: u32, modifiers: u32, id: BindingId) -> Self {
        Self {
            key_code,
            modifiers,
            id,
        }
    }

    /// Parse a hotkey string such as `"Option+Space"` or `"cmd+shift+k"`.
    ///
    /// The result carries the default [`BindingId`]; use [`Binding::with_id`]
    /// to give it another one.
    pub fn parse(input: &str) -> Result<Self, BindingParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BindingParseError::Empty);
        }

        let parts: Vec<&str> = input.split('+').map(str::trim).collect();
        let (key_part, modifier_parts) = match parts.split_last() {
            Some((key, mods)) if !mods.is_empty() => (*key, mods),
            _ => return Err(BindingParseError::MissingModifier),
        };

        let mut modifiers = 0;
        for part in modifier_parts {
            modifiers |= modifier_bit(part)
                .ok_or_else(|| BindingParseError::InvalidModifier(part.to_string()))?;
        }

        let key_code =
            key_code(key_part).ok_or_else(|| BindingParseError::UnknownKey(key_part.to_string()))?;

        Ok(Self::new(key_code, modifiers, BindingId::default()))
    }

    pub fn with_id(mut self, id: BindingId) -> Self {
        self.id = id;
        self
    }

    /// Name of the key, if it is one of the known ANSI keys.
    pub fn key_name(&self) -> Option<&'static str> {
        KEY_TABLE
            .iter()
            .find(|(_, code)| *code == self.key_code)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bit, name) in MODIFIER_NAMES {
            if self.modifiers & bit != 0 {
                write!(f, "{}+", name)?;
            }
        }
        match self.key_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Key{}", self.key_code),
        }
    }
}

impl FromStr for Binding {
    type Err = BindingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingParseError {
    #[error("hotkey cannot be empty")]
    Empty,
    #[error("hotkey must include at least one modifier (e.g. Cmd, Shift, Option, Ctrl)")]
    MissingModifier,
    #[error("invalid modifier: '{0}'")]
    InvalidModifier(String),
    #[error("unknown key: '{0}'")]
    UnknownKey(String),
}

fn modifier_bit(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "cmd" | "command" => Some(CMD_KEY),
        "shift" => Some(SHIFT_KEY),
        "option" | "opt" | "alt" => Some(OPTION_KEY),
        "ctrl" | "control" => Some(CONTROL_KEY),
        _ => None,
    }
}

fn key_code(name: &str) -> Option<u32> {
    KEY_TABLE
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}
