//! Persisted preference store.
//!
//! A small durable key-value store backed by a JSON file in
//! `~/.gatepass/preferences.json`. Three keys are in use: the bound
//! identifier (`openId`), the session token (`satoken`), and the QR zoom
//! level (`scale`, stored as decimal text).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// The preferences directory name.
const PREFS_DIR: &str = ".gatepass";

/// The preferences file name.
const PREFS_FILE: &str = "preferences.json";

/// Store key for the bound identifier.
pub const KEY_OPEN_ID: &str = "openId";
/// Store key for the session token.
pub const KEY_SATOKEN: &str = "satoken";
/// Store key for the zoom level.
pub const KEY_SCALE: &str = "scale";

/// Default zoom level.
pub const DEFAULT_SCALE: f64 = 1.0;
/// Smallest allowed zoom level.
pub const MIN_SCALE: f64 = 0.4;
/// Largest allowed zoom level.
pub const MAX_SCALE: f64 = 1.0;

/// Clamp a zoom level into the allowed range, rounded to one decimal.
///
/// Rounding keeps repeated ±0.1 steps from accumulating float drift in the
/// persisted decimal text.
pub fn clamp_scale(scale: f64) -> f64 {
    let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
    (clamped * 10.0).round() / 10.0
}

/// Durable string key-value store, write-through on every mutation.
#[derive(Debug)]
pub struct PrefStore {
    /// Path to the preferences file.
    path: PathBuf,
    /// In-memory view of the file contents.
    values: BTreeMap<String, String>,
}

impl PrefStore {
    /// Open the store at the default location under the home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn open() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::open_at(home.join(PREFS_DIR).join(PREFS_FILE)))
    }

    /// Open the store at an explicit path.
    ///
    /// A missing or unreadable file loads as an empty store.
    pub fn open_at(path: PathBuf) -> Self {
        let values = Self::load_values(&path);
        Self { path, values }
    }

    fn load_values(path: &PathBuf) -> BTreeMap<String, String> {
        if !path.exists() {
            return BTreeMap::new();
        }
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return BTreeMap::new(),
        };
        serde_json::from_reader(BufReader::new(file)).unwrap_or_default()
    }

    /// Get a stored value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and persist the store.
    ///
    /// Returns `true` if the write reached disk.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// Remove a value and persist the store.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key);
        self.persist()
    }

    /// The stored identifier, if any.
    pub fn open_id(&self) -> Option<&str> {
        self.get(KEY_OPEN_ID)
    }

    /// The stored session token, if any.
    pub fn satoken(&self) -> Option<&str> {
        self.get(KEY_SATOKEN)
    }

    /// The stored zoom level, clamped, falling back to the default when the
    /// key is absent or unparseable.
    pub fn scale(&self) -> f64 {
        self.get(KEY_SCALE)
            .and_then(|s| s.parse::<f64>().ok())
            .map(clamp_scale)
            .unwrap_or(DEFAULT_SCALE)
    }

    /// Store a zoom level as decimal text.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.set(KEY_SCALE, &format!("{:.1}", clamp_scale(scale)))
    }

    fn persist(&self) -> bool {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, &self.values).is_err() {
            return false;
        }
        writer.flush().is_ok()
    }
}
