//! Rewrite collaborator seam
//!
//! Issues too context-dependent for line rules (long functions, missing
//! logging, missing error handling) can be handed to a collaborator that
//! rewrites the whole document. The engine treats its answer as opaque.

use async_trait::async_trait;

use crate::config::CollaboratorConfig;
use crate::error::CollaboratorError;
use crate::rules::results::Issue;

/// Limits on what is offered to a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteBudget {
    /// Maximum characters of content offered
    pub max_input_chars: usize,
    /// Maximum number of issues offered
    pub max_issues: usize,
}

impl Default for RewriteBudget {
    fn default() -> Self {
        Self {
            max_input_chars: 4000,
            max_issues: 10,
        }
    }
}

impl From<&CollaboratorConfig> for RewriteBudget {
    fn from(config: &CollaboratorConfig) -> Self {
        Self {
            max_input_chars: config.max_chars,
            max_issues: config.max_issues,
        }
    }
}

impl RewriteBudget {
    /// Check that `content` fits the character budget
    pub fn check(&self, content: &str) -> Result<(), CollaboratorError> {
        let chars = content.chars().count();
        if chars > self.max_input_chars {
            return Err(CollaboratorError::OverBudget {
                chars,
                max: self.max_input_chars,
            });
        }
        Ok(())
    }
}

/// Whole-document rewriter for context-heavy issues
#[async_trait]
pub trait RewriteCollaborator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Rewrite `content` so that `issues` are resolved
    ///
    /// Implementations must not be offered more than `budget` allows; the
    /// engine enforces it before calling.
    async fn rewrite(
        &self,
        content: &str,
        issues: &[Issue],
        budget: &RewriteBudget,
    ) -> Result<String, CollaboratorError>;
}
