//! Run settings: defaults, overridden by `bf.toml`, then the environment,
//! then command-line flags.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;

use crate::tape::DEFAULT_TAPE_SIZE;

pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Number of tape cells.
    pub memory_size: usize,
    /// Wall-clock limit for `bf run`.
    pub timeout_ms: u64,
    /// Dispatch cycles before a run is aborted. `None` means unlimited.
    pub max_steps: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_TAPE_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_steps: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with the user's `bf.toml` and `BF_*` environment variables.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(content) = read_config_file() {
            settings.apply_toml(&content);
        }
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Overlay keys from the `[interpreter]` section of a `bf.toml` document.
    ///
    /// Unknown keys and unparsable values are ignored.
    pub fn apply_toml(&mut self, content: &str) {
        let map = interpreter_section(content);
        self.apply(|key| map.get(key).cloned(), [
            ("memory_size", Key::Memory),
            ("timeout_ms", Key::Timeout),
            ("max_steps", Key::MaxSteps),
        ]);
    }

    /// Overlay `BF_MEMORY_SIZE`, `BF_TIMEOUT_MS` and `BF_MAX_STEPS`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.apply(lookup, [
            ("BF_MEMORY_SIZE", Key::Memory),
            ("BF_TIMEOUT_MS", Key::Timeout),
            ("BF_MAX_STEPS", Key::MaxSteps),
        ]);
    }

    /// Overlay values given on the command line.
    pub fn apply_flags(&mut self, memory_size: Option<usize>, timeout_ms: Option<u64>, max_steps: Option<u64>) {
        if let Some(m) = memory_size.filter(|&m| m > 0) {
            self.memory_size = m;
        }
        if let Some(t) = timeout_ms {
            self.timeout_ms = t;
        }
        if max_steps.is_some() {
            self.max_steps = max_steps;
        }
    }

    fn apply(&mut self, lookup: impl Fn(&str) -> Option<String>, keys: [(&str, Key); 3]) {
        for (name, key) in keys {
            let Some(raw) = lookup(name) else { continue };
            let Ok(value) = raw.trim().parse::<u64>() else { continue };
            match key {
                Key::Memory if value > 0 => {
                    if let Ok(size) = usize::try_from(value) {
                        self.memory_size = size;
                    }
                }
                Key::Memory => {}
                Key::Timeout => self.timeout_ms = value,
                Key::MaxSteps => self.max_steps = Some(value),
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Key {
    Memory,
    Timeout,
    MaxSteps,
}

fn read_config_file() -> Option<String> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On macOS: resolves to /Users/<user>/.config
    let config_home = base_dirs.config_home();

    let mut path = PathBuf::from(config_home);
    path.push("bf.toml");

    fs::read_to_string(path).ok()
}

/// Very small hand-rolled reader: `key = value` pairs under `[interpreter]`.
fn interpreter_section(content: &str) -> HashMap<String, String> {
    let mut in_section = false;
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == "interpreter";
            continue;
        }
        if !in_section { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            // Accept quoted or unquoted
            let val = val_raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val_raw);
            map.insert(key.trim().to_string(), val.replace('_', ""));
        }
    }
    map
}
