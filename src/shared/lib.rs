// Declare modules at the root level
pub mod config_file;
pub mod derive;
pub mod device_status;
pub mod domain;
pub mod error;
pub mod id_generator;
pub mod schedule;
pub mod schema;
pub mod sensor_validation;
pub mod session;
pub mod store;
pub mod sync;
pub mod time;
pub mod transport;
pub mod validators;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::config_file;
    pub use super::derive;
    pub use super::device_status;
    pub use super::domain;
    pub use super::error;
    pub use super::id_generator;
    pub use super::schedule;
    pub use super::schema;
    pub use super::sensor_validation;
    pub use super::session;
    pub use super::store;
    pub use super::sync;
    pub use super::time;
    pub use super::transport;
    pub use super::validators;
}

// Also re-export at root for convenience; config_file stays namespaced
pub use derive::*;
pub use device_status::*;
pub use domain::*;
pub use error::*;
pub use id_generator::*;
pub use schedule::*;
pub use schema::*;
pub use sensor_validation::*;
pub use session::*;
pub use store::*;
pub use sync::*;
pub use time::*;
pub use transport::*;
pub use validators::*;
