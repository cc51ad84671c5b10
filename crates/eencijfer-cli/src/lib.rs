//! Library components of the eencijfer command line.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
