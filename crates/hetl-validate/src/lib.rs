pub mod keys;
pub mod validator;

pub use keys::KeyTracker;
pub use validator::{Outcome, Validator};
