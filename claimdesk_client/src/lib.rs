pub mod cli;
pub mod config;
pub mod contacts;
pub mod ctypes;
pub mod error;
pub mod messaging;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use service::ServiceClient;
