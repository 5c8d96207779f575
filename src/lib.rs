pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod staging;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
