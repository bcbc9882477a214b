pub mod config;
pub mod error;
pub mod method;
pub mod model;
pub mod route;

pub use config::OreoConfig;
pub use error::OreoError;
pub use method::Method;
