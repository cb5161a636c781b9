//! Persist module - Validating and writing candidates
//!
//! [`ChangeValidator`] decides whether a candidate may replace its original;
//! [`PersistenceGuard`] backs the original up and writes atomically.

pub mod guard;
pub mod validator;

pub use guard::PersistenceGuard;
pub use validator::{ChangeValidator, Verdict};
