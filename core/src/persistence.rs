//! Battery RAM persistence.
//!
//! Save blobs are stored as base64 text in a string key-value store, keyed
//! by the cartridge title the machine reports.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::machine::Machine;

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// Failure writing to the durable store.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    /// The store's backing format could not be produced or parsed.
    Format(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "store I/O error: {e}"),
            Self::Format(reason) => write!(f, "store format error: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Durable string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. Lives as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// A stored save blob that is not valid text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt save data: {}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// Encode raw bytes as printable text.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inverse of [`encode`].
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(text)
        .map_err(|e| DecodeError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Persistence manager
// ---------------------------------------------------------------------------

pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write battery RAM to the store if the machine has any and it changed.
    ///
    /// Returns `Ok(true)` when a write happened. The dirty flag is cleared
    /// only after the write succeeds, so a failed write is retried on the
    /// next call.
    pub fn maybe_save(&mut self, machine: &mut dyn Machine) -> Result<bool, StoreError> {
        if !(machine.has_battery() && machine.is_battery_dirty()) {
            return Ok(false);
        }

        let title = machine.title();
        let data = machine.save_data();
        self.store.set(&title, &encode(&data))?;
        machine.mark_battery_clean();
        log::debug!("saved {} bytes of battery RAM for \"{title}\"", data.len());
        Ok(true)
    }

    /// Look up the save blob for `title`.
    ///
    /// Absence is normal (fresh cartridge). A corrupt blob is logged and
    /// treated as absent.
    pub fn try_load(&self, title: &str) -> Option<Vec<u8>> {
        let text = self.store.get(title)?;
        match decode(&text) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("ignoring save for \"{title}\": {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_printable() {
        let text = encode(&[0x00, 0xFF, 0x10, 0x80]);
        assert!(text.bytes().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn empty_round_trips() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn every_byte_value_round_trips() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn corrupt_text_is_rejected() {
        assert!(decode("not base64!").is_err());
    }

    #[test]
    fn try_load_absent_key() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.try_load("TETRIS").is_none());
    }

    #[test]
    fn try_load_corrupt_blob_is_absent() {
        let mut store = MemoryStore::new();
        store.set("TETRIS", "%%%").unwrap();
        let persistence = Persistence::new(store);
        assert!(persistence.try_load("TETRIS").is_none());
    }

    #[test]
    fn try_load_decodes_stored_blob() {
        let mut store = MemoryStore::new();
        store.set("ZELDA", &encode(&[1, 2, 3])).unwrap();
        let persistence = Persistence::new(store);
        assert_eq!(persistence.try_load("ZELDA"), Some(vec![1, 2, 3]));
    }
}
