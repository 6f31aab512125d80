#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod browse;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod storage;

pub use config::Config;
pub use error::{Result, SteergenError};
