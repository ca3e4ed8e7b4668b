//! Pure renderers turning key combos and text into the command syntax of each
//! platform's automation tool. Nothing here spawns processes.

use super::errors::InputError;
use super::types::{Key, KeyCombo, Modifier, NamedKey};

/// Characters with special meaning in SendKeys strings
const SENDKEYS_SPECIAL: &[char] = &['+', '^', '%', '~', '(', ')', '{', '}', '[', ']'];

/// `xdotool key` argument, e.g. `ctrl+shift+p` or `Return`
pub fn xdotool_key(combo: &KeyCombo) -> String {
    let mut parts: Vec<String> = combo
        .modifiers()
        .iter()
        .map(|m| {
            match m {
                Modifier::Ctrl => "ctrl",
                Modifier::Shift => "shift",
                Modifier::Alt => "alt",
                Modifier::Meta => "super",
            }
            .to_string()
        })
        .collect();

    let key = match combo.main_key() {
        Key::Char(c) => xdotool_char(c),
        Key::Named(named) => match named {
            NamedKey::Enter => "Return".to_string(),
            NamedKey::Escape => "Escape".to_string(),
            NamedKey::Tab => "Tab".to_string(),
            NamedKey::Space => "space".to_string(),
            NamedKey::Backspace => "BackSpace".to_string(),
            NamedKey::Delete => "Delete".to_string(),
            NamedKey::Up => "Up".to_string(),
            NamedKey::Down => "Down".to_string(),
            NamedKey::Left => "Left".to_string(),
            NamedKey::Right => "Right".to_string(),
            NamedKey::Home => "Home".to_string(),
            NamedKey::End => "End".to_string(),
            NamedKey::PageUp => "Prior".to_string(),
            NamedKey::PageDown => "Next".to_string(),
            NamedKey::F(n) => format!("F{}", n),
        },
    };
    parts.push(key);
    parts.join("+")
}

fn xdotool_char(c: char) -> String {
    match c {
        '+' => "plus".to_string(),
        '-' => "minus".to_string(),
        ' ' => "space".to_string(),
        ',' => "comma".to_string(),
        '.' => "period".to_string(),
        '/' => "slash".to_string(),
        '\\' => "backslash".to_string(),
        ';' => "semicolon".to_string(),
        '=' => "equal".to_string(),
        '`' => "grave".to_string(),
        '\'' => "apostrophe".to_string(),
        '[' => "bracketleft".to_string(),
        ']' => "bracketright".to_string(),
        other => other.to_string(),
    }
}

/// SendKeys sequence, e.g. `^+p` or `{ENTER}`.
///
/// SendKeys has no notation for the Windows key, so `Meta` is rejected.
pub fn sendkeys_sequence(combo: &KeyCombo) -> Result<String, InputError> {
    let mut sequence = String::new();
    for modifier in combo.modifiers() {
        let sigil = match modifier {
            Modifier::Ctrl => '^',
            Modifier::Shift => '+',
            Modifier::Alt => '%',
            Modifier::Meta => {
                return Err(InputError::UnsupportedKey {
                    key: combo.to_string(),
                    tool: "SendKeys".to_string(),
                });
            }
        };
        sequence.push(sigil);
    }

    match combo.main_key() {
        Key::Char(c) => sequence.push_str(&sendkeys_char(c)),
        Key::Named(named) => {
            let name = match named {
                NamedKey::Enter => "ENTER".to_string(),
                NamedKey::Escape => "ESC".to_string(),
                NamedKey::Tab => "TAB".to_string(),
                NamedKey::Space => {
                    sequence.push(' ');
                    return Ok(sequence);
                }
                NamedKey::Backspace => "BACKSPACE".to_string(),
                NamedKey::Delete => "DELETE".to_string(),
                NamedKey::Up => "UP".to_string(),
                NamedKey::Down => "DOWN".to_string(),
                NamedKey::Left => "LEFT".to_string(),
                NamedKey::Right => "RIGHT".to_string(),
                NamedKey::Home => "HOME".to_string(),
                NamedKey::End => "END".to_string(),
                NamedKey::PageUp => "PGUP".to_string(),
                NamedKey::PageDown => "PGDN".to_string(),
                NamedKey::F(n) => format!("F{}", n),
            };
            sequence.push('{');
            sequence.push_str(&name);
            sequence.push('}');
        }
    }

    Ok(sequence)
}

fn sendkeys_char(c: char) -> String {
    if SENDKEYS_SPECIAL.contains(&c) {
        format!("{{{}}}", c)
    } else {
        c.to_string()
    }
}

/// Escape literal text so SendKeys types it verbatim
pub fn sendkeys_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "{ENTER}".to_string(),
            '\t' => "{TAB}".to_string(),
            other => sendkeys_char(other),
        })
        .collect()
}

/// Quote a string as a PowerShell single-quoted literal
pub fn powershell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Quote a string as an AppleScript string literal
pub fn applescript_quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// macOS virtual key code for a named key
fn mac_key_code(key: NamedKey) -> Option<u16> {
    let code = match key {
        NamedKey::Enter => 36,
        NamedKey::Tab => 48,
        NamedKey::Space => 49,
        NamedKey::Backspace => 51,
        NamedKey::Escape => 53,
        NamedKey::Home => 115,
        NamedKey::PageUp => 116,
        NamedKey::Delete => 117,
        NamedKey::End => 119,
        NamedKey::PageDown => 121,
        NamedKey::Left => 123,
        NamedKey::Right => 124,
        NamedKey::Down => 125,
        NamedKey::Up => 126,
        NamedKey::F(n) => match n {
            1 => 122,
            2 => 120,
            3 => 99,
            4 => 118,
            5 => 96,
            6 => 97,
            7 => 98,
            8 => 100,
            9 => 101,
            10 => 109,
            11 => 103,
            12 => 111,
            _ => return None,
        },
    };
    Some(code)
}

/// System Events statement pressing `combo`
pub fn applescript_key(combo: &KeyCombo) -> Result<String, InputError> {
    let action = match combo.main_key() {
        Key::Char(c) => format!("keystroke {}", applescript_quote(&c.to_string())),
        Key::Named(named) => {
            let code = mac_key_code(named).ok_or_else(|| InputError::UnsupportedKey {
                key: combo.to_string(),
                tool: "osascript".to_string(),
            })?;
            format!("key code {}", code)
        }
    };

    let modifiers: Vec<&str> = combo
        .modifiers()
        .iter()
        .map(|m| match m {
            Modifier::Ctrl => "control down",
            Modifier::Shift => "shift down",
            Modifier::Alt => "option down",
            Modifier::Meta => "command down",
        })
        .collect();

    let statement = if modifiers.is_empty() {
        action
    } else {
        format!("{} using {{{}}}", action, modifiers.join(", "))
    };

    Ok(format!(
        "tell application \"System Events\" to {}",
        statement
    ))
}

/// System Events statement typing `text`
pub fn applescript_type(text: &str) -> String {
    format!(
        "tell application \"System Events\" to keystroke {}",
        applescript_quote(text)
    )
}

/// Bring the process named `app_name` to the front
pub fn applescript_focus(app_name: &str) -> String {
    format!(
        "tell application \"System Events\" to set frontmost of process {} to true",
        applescript_quote(app_name)
    )
}

/// PowerShell snippet activating the window owned by `pid` (or titled `title`)
pub fn powershell_focus(pid: Option<u32>, title: &str) -> String {
    let target = match pid {
        Some(pid) => pid.to_string(),
        None => powershell_quote(title),
    };
    format!(
        "$ws = New-Object -ComObject WScript.Shell; if (-not $ws.AppActivate({})) {{ exit 1 }}",
        target
    )
}

/// PowerShell snippet sending a raw SendKeys sequence
pub fn powershell_sendkeys(sequence: &str) -> String {
    format!(
        "Add-Type -AssemblyName System.Windows.Forms; [System.Windows.Forms.SendKeys]::SendWait({})",
        powershell_quote(sequence)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(s: &str) -> KeyCombo {
        KeyCombo::parse(s).unwrap()
    }

    #[test]
    fn test_xdotool_key_names() {
        assert_eq!(xdotool_key(&combo("ctrl+shift+p")), "ctrl+shift+p");
        assert_eq!(xdotool_key(&combo("enter")), "Return");
        assert_eq!(xdotool_key(&combo("backspace")), "BackSpace");
        assert_eq!(xdotool_key(&combo("pgup")), "Prior");
        assert_eq!(xdotool_key(&combo("cmd+f5")), "super+F5");
        assert_eq!(xdotool_key(&combo("ctrl+-")), "ctrl+minus");
    }

    #[test]
    fn test_sendkeys_sequence() {
        assert_eq!(sendkeys_sequence(&combo("ctrl+shift+p")).unwrap(), "^+p");
        assert_eq!(sendkeys_sequence(&combo("enter")).unwrap(), "{ENTER}");
        assert_eq!(sendkeys_sequence(&combo("alt+f4")).unwrap(), "%{F4}");
        assert_eq!(sendkeys_sequence(&combo("escape")).unwrap(), "{ESC}");
        assert_eq!(sendkeys_sequence(&combo("ctrl+%")).unwrap(), "^{%}");
    }

    #[test]
    fn test_sendkeys_rejects_meta() {
        let result = sendkeys_sequence(&combo("cmd+s"));
        assert!(matches!(result, Err(InputError::UnsupportedKey { .. })));
    }

    #[test]
    fn test_sendkeys_text_escapes_specials() {
        assert_eq!(sendkeys_text("a+b"), "a{+}b");
        assert_eq!(sendkeys_text("(x)"), "{(}x{)}");
        assert_eq!(sendkeys_text("hi\n"), "hi{ENTER}");
        assert_eq!(sendkeys_text("Hello World"), "Hello World");
    }

    #[test]
    fn test_applescript_key_uses_key_codes_for_named_keys() {
        assert_eq!(
            applescript_key(&combo("enter")).unwrap(),
            "tell application \"System Events\" to key code 36"
        );
        assert_eq!(
            applescript_key(&combo("cmd+shift+p")).unwrap(),
            "tell application \"System Events\" to keystroke \"p\" using {shift down, command down}"
        );
        assert_eq!(
            applescript_key(&combo("ctrl+up")).unwrap(),
            "tell application \"System Events\" to key code 126 using {control down}"
        );
    }

    #[test]
    fn test_quoting() {
        assert_eq!(applescript_quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(applescript_quote(r"a\b"), r#""a\\b""#);
        assert_eq!(powershell_quote("it's"), "'it''s'");
    }

    #[test]
    fn test_focus_scripts() {
        assert_eq!(
            applescript_focus("Code"),
            "tell application \"System Events\" to set frontmost of process \"Code\" to true"
        );
        assert!(powershell_focus(Some(1234), "ignored").contains("AppActivate(1234)"));
        assert!(powershell_focus(None, "My Editor").contains("AppActivate('My Editor')"));
    }

    #[test]
    fn test_powershell_sendkeys_quotes_sequence() {
        let script = powershell_sendkeys("it's{ENTER}");
        assert!(script.contains("SendWait('it''s{ENTER}')"));
    }
}
