//! The scanning error type.

use std::fmt;

use yamlet_reader::Mark;

/// Result type for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// A fatal scanning error.
///
/// Carries the phrase describing what was being scanned ("while scanning a
/// tag"), the mark where that construct began, a description of the problem,
/// and the mark where the problem was detected. All scanning errors end the
/// session; the scanner produces no further tokens after reporting one.
#[derive(Debug, Clone)]
pub struct ScanError {
    context: Option<String>,
    context_mark: Option<Mark>,
    problem: String,
    problem_mark: Option<Mark>,
    label: String,
}

impl ScanError {
    /// Create an error with a context phrase.
    pub fn new(
        context: impl Into<String>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Option<Mark>,
    ) -> Self {
        Self {
            context: Some(context.into()),
            context_mark,
            problem: problem.into(),
            problem_mark,
            label: String::new(),
        }
    }

    /// Create an error without a context phrase.
    pub fn at(problem: impl Into<String>, problem_mark: Option<Mark>) -> Self {
        Self {
            context: None,
            context_mark: None,
            problem: problem.into(),
            problem_mark,
            label: String::new(),
        }
    }

    /// Attach the host-supplied label used for attribution.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The phrase describing the construct being scanned, if any.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Where the offending construct began.
    pub fn context_mark(&self) -> Option<Mark> {
        self.context_mark
    }

    /// Description of the problem.
    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// Where the problem was detected.
    pub fn problem_mark(&self) -> Option<Mark> {
        self.problem_mark
    }

    /// The host-supplied label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        (!self.label.is_empty()).then_some(self.label.as_str())
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{context}")?;
            if let Some(mark) = &self.context_mark {
                write!(f, " at {mark}")?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}", self.problem)?;
        if let Some(mark) = &self.problem_mark {
            write!(f, " at {mark}")?;
        }
        if !self.label.is_empty() {
            write!(f, " (in {})", self.label)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanError {}
