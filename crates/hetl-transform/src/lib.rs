pub mod rules;

pub use rules::transform;
