use std::fmt;

use super::errors::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    /// Command on macOS, Super/Windows elsewhere
    Meta,
}

impl Modifier {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "shift" => Some(Modifier::Shift),
            "alt" | "option" | "opt" => Some(Modifier::Alt),
            "cmd" | "command" | "meta" | "super" | "win" => Some(Modifier::Meta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
            Modifier::Alt => "alt",
            Modifier::Meta => "meta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl NamedKey {
    fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "enter" | "return" => NamedKey::Enter,
            "esc" | "escape" => NamedKey::Escape,
            "tab" => NamedKey::Tab,
            "space" => NamedKey::Space,
            "backspace" | "bksp" | "bs" => NamedKey::Backspace,
            "delete" | "del" => NamedKey::Delete,
            "up" => NamedKey::Up,
            "down" => NamedKey::Down,
            "left" => NamedKey::Left,
            "right" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pageup" | "pgup" => NamedKey::PageUp,
            "pagedown" | "pgdn" => NamedKey::PageDown,
            other => {
                let n: u8 = other.strip_prefix('f')?.parse().ok()?;
                if !(1..=12).contains(&n) {
                    return None;
                }
                NamedKey::F(n)
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Named(NamedKey),
    Char(char),
}

/// A key plus the modifiers held while pressing it.
///
/// Accepts two notations:
/// - plus-separated: `ctrl+shift+p`, `enter`, `cmd+s`
/// - pywinauto-style: `^+p`, `{ENTER}`, `%{F4}` (`^` ctrl, `+` shift, `%` alt)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl KeyCombo {
    pub fn new(modifiers: Vec<Modifier>, key: Key) -> Self {
        let mut modifiers = modifiers;
        modifiers.sort();
        modifiers.dedup();
        Self { modifiers, key }
    }

    pub fn key(key: Key) -> Self {
        Self::new(Vec::new(), key)
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn main_key(&self) -> Key {
        self.key
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn parse(combo: &str) -> Result<Self, InputError> {
        let trimmed = combo.trim();
        if trimmed.is_empty() {
            return Err(invalid(combo, "empty key combination"));
        }

        let first = trimmed.chars().next().unwrap_or(' ');
        if trimmed.len() > 1 && matches!(first, '^' | '%' | '+' | '{') {
            return Self::parse_sigil(combo, trimmed);
        }

        Self::parse_plus(combo, trimmed)
    }

    fn parse_plus(original: &str, combo: &str) -> Result<Self, InputError> {
        // A bare "+" is the plus key itself
        if combo == "+" {
            return Ok(Self::key(Key::Char('+')));
        }

        // "ctrl++" ends in the plus key
        let (modifier_text, key_part) = match combo.strip_suffix("++") {
            Some(prefix) => (Some(prefix), "+"),
            None => match combo.rsplit_once('+') {
                Some((prefix, key)) => (Some(prefix), key.trim()),
                None => (None, combo),
            },
        };

        if key_part.is_empty() {
            return Err(invalid(original, "missing key after modifiers"));
        }

        let modifier_parts: Vec<&str> = modifier_text
            .map(|text| text.split('+').map(str::trim).collect())
            .unwrap_or_default();

        let mut modifiers = Vec::with_capacity(modifier_parts.len());
        for part in &modifier_parts {
            let lower = part.to_lowercase();
            let modifier = Modifier::from_name(&lower)
                .ok_or_else(|| invalid(original, &format!("unknown modifier '{}'", part)))?;
            modifiers.push(modifier);
        }

        Ok(Self::new(modifiers, parse_key(key_part)?))
    }

    fn parse_sigil(original: &str, combo: &str) -> Result<Self, InputError> {
        let mut modifiers = Vec::new();
        let mut rest = combo;

        while let Some(c) = rest.chars().next() {
            let modifier = match c {
                '^' => Modifier::Ctrl,
                '+' => Modifier::Shift,
                '%' => Modifier::Alt,
                _ => break,
            };
            modifiers.push(modifier);
            rest = &rest[c.len_utf8()..];
        }

        if rest.is_empty() {
            return Err(invalid(original, "missing key after modifiers"));
        }

        let key = if let Some(inner) = rest.strip_prefix('{') {
            let name = inner
                .strip_suffix('}')
                .ok_or_else(|| invalid(original, "unterminated '{'"))?;
            parse_key(name)?
        } else {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                _ => return Err(invalid(original, "expected a single key")),
            }
        };

        Ok(Self::new(modifiers, key))
    }
}

fn parse_key(name: &str) -> Result<Key, InputError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Char(c.to_ascii_lowercase()));
    }

    NamedKey::from_name(&name.to_lowercase())
        .map(Key::Named)
        .ok_or_else(|| InputError::UnknownKey {
            name: name.to_string(),
        })
}

fn invalid(combo: &str, reason: &str) -> InputError {
    InputError::InvalidKeyCombo {
        combo: combo.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.as_str())?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c),
            Key::Named(NamedKey::F(n)) => write!(f, "f{}", n),
            Key::Named(k) => write!(f, "{}", format!("{:?}", k).to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plus_notation() {
        let combo = KeyCombo::parse("ctrl+shift+p").unwrap();
        assert_eq!(combo.modifiers(), &[Modifier::Ctrl, Modifier::Shift]);
        assert_eq!(combo.main_key(), Key::Char('p'));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let combo = KeyCombo::parse("Ctrl+Shift+P").unwrap();
        assert_eq!(combo, KeyCombo::parse("ctrl+shift+p").unwrap());
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(
            KeyCombo::parse("enter").unwrap().main_key(),
            Key::Named(NamedKey::Enter)
        );
        assert_eq!(
            KeyCombo::parse("alt+f4").unwrap().main_key(),
            Key::Named(NamedKey::F(4))
        );
        assert_eq!(
            KeyCombo::parse("pgdn").unwrap().main_key(),
            Key::Named(NamedKey::PageDown)
        );
    }

    #[test]
    fn test_parse_pywinauto_notation() {
        let combo = KeyCombo::parse("^+p").unwrap();
        assert!(combo.has(Modifier::Ctrl));
        assert!(combo.has(Modifier::Shift));
        assert_eq!(combo.main_key(), Key::Char('p'));

        let enter = KeyCombo::parse("{ENTER}").unwrap();
        assert!(enter.modifiers().is_empty());
        assert_eq!(enter.main_key(), Key::Named(NamedKey::Enter));

        let alt_f4 = KeyCombo::parse("%{F4}").unwrap();
        assert_eq!(alt_f4.modifiers(), &[Modifier::Alt]);
        assert_eq!(alt_f4.main_key(), Key::Named(NamedKey::F(4)));
    }

    #[test]
    fn test_parse_single_char_and_plus_key() {
        assert_eq!(KeyCombo::parse("a").unwrap().main_key(), Key::Char('a'));
        assert_eq!(KeyCombo::parse("+").unwrap().main_key(), Key::Char('+'));
    }

    #[test]
    fn test_parse_modified_plus_key() {
        let zoom_in = KeyCombo::parse("ctrl++").unwrap();
        assert_eq!(zoom_in.modifiers(), &[Modifier::Ctrl]);
        assert_eq!(zoom_in.main_key(), Key::Char('+'));

        let combo = KeyCombo::parse("ctrl+shift++").unwrap();
        assert_eq!(combo.modifiers(), &[Modifier::Ctrl, Modifier::Shift]);
        assert_eq!(combo.main_key(), Key::Char('+'));
        assert_eq!(combo.to_string(), "ctrl+shift++");
    }

    #[test]
    fn test_parse_modifier_aliases() {
        let combo = KeyCombo::parse("cmd+option+s").unwrap();
        assert_eq!(combo.modifiers(), &[Modifier::Alt, Modifier::Meta]);
    }

    #[test]
    fn test_parse_rejects_invalid_combos() {
        assert!(matches!(
            KeyCombo::parse(""),
            Err(InputError::InvalidKeyCombo { .. })
        ));
        assert!(matches!(
            KeyCombo::parse("ctrl+"),
            Err(InputError::InvalidKeyCombo { .. })
        ));
        assert!(matches!(
            KeyCombo::parse("hyper+p"),
            Err(InputError::InvalidKeyCombo { .. })
        ));
        assert!(matches!(
            KeyCombo::parse("ctrl+banana"),
            Err(InputError::UnknownKey { .. })
        ));
        assert!(matches!(
            KeyCombo::parse("^{ENTER"),
            Err(InputError::InvalidKeyCombo { .. })
        ));
        assert!(matches!(
            KeyCombo::parse("f13"),
            Err(InputError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let combo = KeyCombo::parse("^+{PGUP}").unwrap();
        assert_eq!(combo.to_string(), "ctrl+shift+pageup");
        assert_eq!(KeyCombo::parse(&combo.to_string()).unwrap(), combo);
    }
}
