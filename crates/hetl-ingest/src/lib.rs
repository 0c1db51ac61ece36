pub mod extract;

pub use extract::{RecordStream, extract};
