mod gcs;
mod local;
mod memory;

pub use gcs::GcsStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::Result;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";

/// A flat key/value object store.
///
/// Every call blocks until the store answers or fails. Implementations don't retry.
pub trait ObjectStore {
    /// Fetches the object at `key`.
    ///
    /// # Returns
    /// The object's bytes, `None` if there's no such object, or the failure.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Creates or overwrites the object at `key`.
    ///
    /// # Arguments
    /// * `key` - The object key.
    /// * `bytes` - The object's content.
    /// * `content_type` - The MIME type stored along with the object.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Returns a human readable location for `key`, used in progress output.
    fn uri(&self, key: &str) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        (**self).put(key, bytes, content_type)
    }

    fn uri(&self, key: &str) -> String {
        (**self).uri(key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        (**self).put(key, bytes, content_type)
    }

    fn uri(&self, key: &str) -> String {
        (**self).uri(key)
    }
}
