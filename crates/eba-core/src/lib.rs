pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod source;
pub mod template;
pub mod types;
pub mod validate;
pub mod workspace;

pub use error::{EbaError, Result};
