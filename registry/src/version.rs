//! The integer counter tagging every published model.
//!
//! The counter is read, incremented and written back without any locking, two concurrent
//! publishers may end up with the same version.

use log::{error, info};

use crate::{
    RegistryErr, Result,
    store::{ObjectStore, TEXT_PLAIN},
};

/// Reads the current version stored at `key`.
///
/// # Arguments
/// * `store` - The store holding the counter.
/// * `key` - The counter's object key.
///
/// # Returns
/// The stored version, 0 if there's no counter yet or the store couldn't be reached, or an error
/// if the counter holds something other than a non-negative integer.
pub fn read_version<S: ObjectStore + ?Sized>(store: &S, key: &str) -> Result<u64> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            info!("no version object at {}, starting from 0", store.uri(key));
            return Ok(0);
        }
        Err(e) => {
            error!("failed to read the version object at {}: {e}", store.uri(key));
            return Ok(0);
        }
    };

    parse_version(key, &bytes)
}

/// Parses the content of a version object.
pub fn parse_version(key: &str, bytes: &[u8]) -> Result<u64> {
    let malformed = || RegistryErr::MalformedVersion {
        key: key.to_string(),
        content: String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = std::str::from_utf8(bytes).map_err(|_| malformed())?;
    text.trim().parse().map_err(|_| malformed())
}

/// Overwrites the counter at `key` with `version`.
pub fn write_version<S: ObjectStore + ?Sized>(store: &S, key: &str, version: u64) -> Result<()> {
    store.put(key, version.to_string().as_bytes(), TEXT_PLAIN)
}
