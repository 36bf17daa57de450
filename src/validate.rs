//! Validation findings shared by the identifier and animation passes
//!
//! Findings are collected, never thrown: a pass reports everything it sees and
//! the pipeline decides afterwards whether the build can continue.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Type of validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Two source files produce the same sprite symbol
    SymbolCollision,
    /// Two animation base names produce the same animation symbol
    AnimationSymbolCollision,
    /// Frame numbers of an animation have holes
    MissingFrames,
    /// The same frame number appears more than once
    DuplicateFrames,
    /// Sprite IDs of the sorted frames are not one increasing run
    NonContiguousIds,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::SymbolCollision => write!(f, "symbol_collision"),
            IssueType::AnimationSymbolCollision => write!(f, "animation_symbol_collision"),
            IssueType::MissingFrames => write!(f, "missing_frames"),
            IssueType::DuplicateFrames => write!(f, "duplicate_frames"),
            IssueType::NonContiguousIds => write!(f, "non_contiguous_ids"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub issue_type: IssueType,
    /// Symbol or animation the issue is about
    pub subject: String,
    /// Human-readable description
    pub message: String,
    /// Source files involved, in ID order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,
}

impl ValidationIssue {
    pub fn error(issue_type: IssueType, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            issue_type,
            subject: subject.into(),
            message: message.into(),
            sources: Vec::new(),
        }
    }

    pub fn warning(
        issue_type: IssueType,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self { severity: Severity::Warning, ..Self::error(issue_type, subject, message) }
    }

    /// Attach the source files involved.
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.issue_type, self.message)?;
        for source in &self.sources {
            write!(f, "\n    - {}", source.display())?;
        }
        Ok(())
    }
}

/// Split issues into `(errors, warnings)`, keeping their order.
pub fn partition(issues: Vec<ValidationIssue>) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
    issues.into_iter().partition(ValidationIssue::is_error)
}
