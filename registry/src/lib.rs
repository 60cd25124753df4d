pub mod error;
mod http;
pub mod publisher;
pub mod store;
pub mod version;

pub use error::{RegistryErr, Result};
pub use publisher::{ArtifactKind, PublishReport, Publisher, Upload};
pub use store::{GcsStore, LocalStore, MemoryStore, ObjectStore};
