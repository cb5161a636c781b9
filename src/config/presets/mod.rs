//! Preset configurations for different use cases

/// Available presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Security and correctness only, no style nits
    Minimal,
    /// Every rule with default thresholds
    Standard,
    /// Every rule, wider run ceiling and a stricter truncation guard
    Strict,
}

impl Preset {
    /// Get preset from name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "minimal" | "min" | "security" => Some(Self::Minimal),
            "standard" | "default" => Some(Self::Standard),
            "strict" | "full" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Get the name of the preset
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }

    /// Get a description of the preset
    pub fn description(&self) -> &'static str {
        match self {
            Self::Minimal => "Security and correctness issues only",
            Self::Standard => "All rules with default thresholds",
            Self::Strict => "All rules, larger runs, conservative patch validation",
        }
    }

    /// Issue kinds switched off by this preset
    pub fn disabled_kinds(&self) -> &'static [&'static str] {
        match self {
            Self::Minimal => &[
                "StyleIssue",
                "CodeQuality",
                "PerformanceIssue",
                "DeprecatedCode",
                "Accessibility",
            ],
            Self::Standard | Self::Strict => &[],
        }
    }

    /// All presets, in menu order
    pub fn all() -> [Preset; 3] {
        [Self::Minimal, Self::Standard, Self::Strict]
    }
}
