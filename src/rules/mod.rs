//! Rules module - Issue detection
//!
//! Python sources are parsed first ([`syntax`]); every supported language then
//! runs its line battery ([`categories`]). [`engine::IssueDetector`] ties the
//! two together and applies rule selection.

pub mod categories;
pub mod constants;
pub mod context;
pub mod engine;
pub mod patterns;
pub mod results;
pub mod source;
pub mod syntax;

pub use engine::IssueDetector;
pub use results::{Issue, IssueKind, Severity};
