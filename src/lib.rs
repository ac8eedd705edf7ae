#![forbid(unsafe_code)]

pub mod cleaner;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod output;
pub mod passage;
