use thiserror::Error;

/// Errors produced while parsing BML markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// A line could not be parsed (1-based line number)
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl MarkupError {
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: msg.into(),
        }
    }
}
