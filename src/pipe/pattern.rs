//! Pipe name patterns
//!
//! A pattern is the pipe name a client registered with. It is treated as a
//! regular expression that must match the whole concrete pipe name.

use regex::Regex;

use crate::error::BindingError;

#[derive(Debug, Clone)]
pub struct PipePattern {
    source: String,
    regex: Regex,
}

impl PipePattern {
    pub fn compile(pattern: &str) -> Result<Self, BindingError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            BindingError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, pipe_name: &str) -> bool {
        self.regex.is_match(pipe_name)
    }
}
