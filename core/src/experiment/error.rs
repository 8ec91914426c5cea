use std::fmt;
use std::path::{Path, PathBuf};

/// Where in a log file a parse error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLocation {
    pub file: Option<PathBuf>,
    pub line: usize,
}

impl fmt::Display for LineLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// A log line that does not match the timer output layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogParseError {
    pub message: String,
    /// Index of the whitespace-separated token that failed, if any.
    pub token: Option<usize>,
    pub location: Option<LineLocation>,
}

impl LogParseError {
    pub fn new(message: String) -> Self {
        Self {
            message,
            token: None,
            location: None,
        }
    }

    pub fn at_token(message: String, token: usize) -> Self {
        Self {
            message,
            token: Some(token),
            location: None,
        }
    }

    /// Attach the file and 1-based line number once the caller knows them.
    pub fn located(mut self, file: Option<&Path>, line: usize) -> Self {
        self.location = Some(LineLocation {
            file: file.map(Path::to_path_buf),
            line,
        });
        self
    }
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(token) = self.token {
            write!(f, " (token {})", token)?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

impl std::error::Error for LogParseError {}
