//! Fixes module - Candidate content generation
//!
//! [`planner`] maps each issue to line rewrites, [`engine::PatchEngine`]
//! applies them in one pass and optionally hands context-heavy issues to a
//! [`collaborator::RewriteCollaborator`].

pub mod chat;
pub mod collaborator;
pub mod engine;
pub mod plan;
pub mod planner;

pub use chat::ChatCollaborator;
pub use collaborator::{RewriteBudget, RewriteCollaborator};
pub use engine::PatchEngine;
