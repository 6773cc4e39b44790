//! Key bindings for the workspace controls.
//!
//! Each control accepts a comma-separated list such as `ctrl+r,f5`; `none`
//! (or an empty value) leaves the control unbound.

use anyhow::{anyhow, bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn parse(text: &str) -> Result<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut code = None;
        for part in text.split('+').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                key => {
                    if code.is_some() {
                        bail!("more than one key in binding '{text}'");
                    }
                    code = Some(parse_key(key).ok_or_else(|| anyhow!("unknown key '{key}' in '{text}'"))?);
                }
            }
        }
        let code = code.ok_or_else(|| anyhow!("binding '{text}' has no key"))?;
        Ok(Self { code, modifiers })
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        // Terminals disagree on reporting SHIFT for uppercase chars; only
        // compare the modifiers a binding can name.
        let relevant = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        code == self.code && (key.modifiers & relevant) == self.modifiers
    }

    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            label.push_str("ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            label.push_str("alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            label.push_str("shift+");
        }
        match self.code {
            KeyCode::Char(c) => label.push(c),
            KeyCode::F(n) => label.push_str(&format!("f{n}")),
            KeyCode::Enter => label.push_str("enter"),
            KeyCode::Esc => label.push_str("esc"),
            KeyCode::Tab => label.push_str("tab"),
            other => label.push_str(&format!("{other:?}").to_ascii_lowercase()),
        }
        label
    }
}

fn parse_key(key: &str) -> Option<KeyCode> {
    match key {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        k if k.len() > 1 && k.starts_with('f') => k[1..].parse::<u8>().ok().map(KeyCode::F),
        k => {
            let mut chars = k.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

/// A control bound to zero or more keys. An unbound control is never
/// triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Control(Vec<KeyBinding>);

impl Control {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }
        text.split(',')
            .map(KeyBinding::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    #[cfg(test)]
    pub fn is_bound(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.0.iter().any(|b| b.matches(key))
    }

    pub fn label(&self) -> Option<String> {
        self.0.first().map(KeyBinding::label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub run: Control,
    pub clear: Control,
    pub toggle: Control,
}

impl Controls {
    /// Read the bindings from config. A binding that does not parse is
    /// logged and left unbound.
    pub fn from_config(cfg: &Config) -> Self {
        let load = |key: &str, fallback: &str| {
            let text = cfg.get(key).unwrap_or_else(|| fallback.to_string());
            Control::parse(&text).unwrap_or_else(|err| {
                tracing::warn!(key, error = %err, "invalid key binding; control disabled");
                Control::default()
            })
        };
        Self {
            run: load("CODERUN_KEY_RUN", "ctrl+r,f5"),
            clear: load("CODERUN_KEY_CLEAR", "ctrl+l"),
            toggle: load("CODERUN_KEY_TOGGLE", "ctrl+o"),
        }
    }
}
