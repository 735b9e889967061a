//! Compact on-disk storage
//!
//! Translations and the application state are stored as MessagePack. Structs
//! are written with field names so every file is a plain nested map that any
//! MessagePack reader can open.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Serialize a value to MessagePack bytes
pub fn to_msgpack<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, String> {
    rmp_serde::to_vec_named(value).map_err(|e| format!("Failed to encode msgpack: {}", e))
}

/// Deserialize a value from MessagePack bytes
pub fn from_msgpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    rmp_serde::from_slice(bytes).map_err(|e| format!("Failed to decode msgpack: {}", e))
}

/// Write a value to a MessagePack file
///
/// The value is fully encoded before the file is touched, so an encoding
/// failure never leaves a truncated file behind. The parent directory is
/// created if it doesn't exist.
pub fn write_msgpack<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), String> {
    let bytes = to_msgpack(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory {:?}: {}", parent, e))?;
        }
    }

    fs::write(path, bytes).map_err(|e| format!("Failed to write {:?}: {}", path, e))
}

/// Read a value from a MessagePack file
pub fn read_msgpack<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    from_msgpack(&bytes)
}
