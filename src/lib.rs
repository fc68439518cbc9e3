pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod pipeline;
pub mod report;
mod utils;


pub use api::Mode;
pub use config::{Config, Credentials};
pub use error::{Error, ErrorType, Result};
