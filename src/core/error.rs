use thiserror::Error;

/// Errors that can occur while building or recomputing an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RabattError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Currency lookup or conversion failed.
    #[error("currency error: {0}")]
    Currency(String),

    /// Tax configuration could not be applied.
    #[error("tax error: {0}")]
    Tax(String),

    /// An amount left the representable decimal range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// No invoice line at the given index.
    #[error("no invoice line at index {0}")]
    NoSuchLine(usize),

    /// No tax line at the given index.
    #[error("no tax line at index {0}")]
    NoSuchTaxLine(usize),

    /// Rate table document could not be parsed.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "amounts.amount_total").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// EN 16931 business rule ID if applicable (e.g. "BR-CO-15").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with an EN 16931 rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
