use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// Invariant violation. Never retried locally; the surrounding engine
    /// decides whether the job step can continue.
    #[error("Logic error in {component}: {detail}")]
    LogicError {
        component: &'static str,
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Product cannot be aggregated: {0}")]
    ProductCannotBeAggregated(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SpanError>;

impl SpanError {
    pub fn logic(component: &'static str, detail: impl Into<String>) -> Self {
        Self::LogicError {
            component,
            detail: detail.into(),
        }
    }

    pub fn is_logic_error(&self) -> bool {
        matches!(self, Self::LogicError { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<serde_json::Error> for SpanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for SpanError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
