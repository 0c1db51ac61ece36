//! Library components for the hospital ETL CLI.

pub mod logging;
pub mod pipeline;
