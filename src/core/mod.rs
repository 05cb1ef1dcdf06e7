mod config;
pub mod db;
mod error;

pub use config::AppConfig;
pub use error::ProxyError;
