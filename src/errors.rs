use thiserror::Error;

/// A range string that does not match the accepted A1 grammar.
///
/// Deterministic: the same input always fails the same way, so callers
/// must never retry one of these.
#[derive(Debug, Error)]
#[error("invalid A1 range '{input}': {reason}")]
pub struct InvalidRangeError {
    input: String,
    reason: String,
}

impl InvalidRangeError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Error)]
#[error("sheet '{name}' not found (known sheets: {})", known.join(", "))]
pub struct SheetNotFoundError {
    name: String,
    known: Vec<String>,
}

impl SheetNotFoundError {
    pub fn new(name: impl Into<String>, known: Vec<String>) -> Self {
        Self {
            name: name.into(),
            known,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn known_sheets(&self) -> &[String] {
        &self.known
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidParamsError {
    tool: &'static str,
    message: String,
    path: Option<String>,
}

impl InvalidParamsError {
    pub fn new(tool: &'static str, message: impl Into<String>) -> Self {
        Self {
            tool,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
