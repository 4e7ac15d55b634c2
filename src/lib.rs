#![forbid(unsafe_code)]

pub mod acquire;
pub mod classify;
pub mod cli;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formats;
pub mod library;
pub mod logging;
pub mod plan;
pub mod scrape;
pub mod sync;
