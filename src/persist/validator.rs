//! Change validator - Rejects destructive candidates

use crate::config::FixConfig;

/// Outcome of checking a candidate against its original
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Safe to persist
    Accept,
    /// Candidate equals the original, nothing to write
    Unchanged,
    /// Candidate is empty or whitespace while the original was not
    Empty,
    /// Candidate shrank below the allowed ratio
    Truncated {
        /// Candidate length over original length
        ratio: f64,
    },
}

impl Verdict {
    /// Whether the candidate passes validation
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept | Self::Unchanged)
    }

    /// Human-readable reason for a non-accepting verdict
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Accept => None,
            Self::Unchanged => Some("no applicable rewrite".to_string()),
            Self::Empty => Some("rejected: candidate is empty".to_string()),
            Self::Truncated { ratio } => Some(format!(
                "rejected: candidate is {:.0}% of the original length",
                ratio * 100.0
            )),
        }
    }
}

/// Guards against catastrophically destructive rewrites
#[derive(Debug, Clone, Copy)]
pub struct ChangeValidator {
    min_length_ratio: f64,
}

impl Default for ChangeValidator {
    fn default() -> Self {
        Self {
            min_length_ratio: 0.2,
        }
    }
}

impl ChangeValidator {
    pub fn new(config: &FixConfig) -> Self {
        Self {
            min_length_ratio: config.min_length_ratio,
        }
    }

    /// Whether `candidate` may replace `original`
    pub fn validate(&self, original: &str, candidate: &str) -> bool {
        self.check(original, candidate).is_accepted()
    }

    /// Classify `candidate`
    ///
    /// Lengths are compared in characters.
    pub fn check(&self, original: &str, candidate: &str) -> Verdict {
        if candidate == original {
            return Verdict::Unchanged;
        }
        if candidate.trim().is_empty() && !original.is_empty() {
            return Verdict::Empty;
        }

        let original_len = original.chars().count();
        if original_len == 0 {
            return Verdict::Accept;
        }
        let ratio = candidate.chars().count() as f64 / original_len as f64;
        if ratio < self.min_length_ratio {
            return Verdict::Truncated { ratio };
        }
        Verdict::Accept
    }
}
