pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{OrderRegistry, DEFAULT_MAX_ATTEMPTS};
