use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;
pub const DEFAULT_ACCEPTED_TYPES: &str = "image/*,application/pdf,.doc,.docx,.txt";

/// Which files the upload zone accepts.
///
/// Each pattern is one of:
/// - `.ext`: case-insensitive match on the end of the file name
/// - `type/*`: any MIME type under `type/`
/// - anything else: substring of the MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AcceptedTypes {
    Any,
    List(Vec<String>),
}

impl AcceptedTypes {
    pub fn list<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(patterns.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, file_name: &str, mime_type: &str) -> bool {
        match self {
            AcceptedTypes::Any => true,
            AcceptedTypes::List(patterns) => patterns
                .iter()
                .any(|pattern| pattern_matches(pattern, file_name, mime_type)),
        }
    }
}

fn pattern_matches(pattern: &str, file_name: &str, mime_type: &str) -> bool {
    if pattern.starts_with('.') {
        return file_name
            .to_lowercase()
            .ends_with(&pattern.to_lowercase());
    }

    if let Some(base) = pattern.strip_suffix("/*") {
        return mime_type
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'));
    }

    mime_type.contains(pattern)
}

impl FromStr for AcceptedTypes {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(AcceptedTypes::Any);
        }

        let patterns = trimmed
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        Ok(AcceptedTypes::List(patterns))
    }
}

impl From<String> for AcceptedTypes {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(types) => types,
            Err(never) => match never {},
        }
    }
}

impl From<AcceptedTypes> for String {
    fn from(value: AcceptedTypes) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AcceptedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptedTypes::Any => f.write_str("*"),
            AcceptedTypes::List(patterns) => f.write_str(&patterns.join(",")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRules {
    /// Inclusive upper bound in bytes
    pub max_file_size: u64,
    pub accepted_types: AcceptedTypes,
    pub max_name_length: usize,
}

impl Default for UploadRules {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            accepted_types: AcceptedTypes::from(DEFAULT_ACCEPTED_TYPES.to_string()),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl UploadRules {
    pub fn new(max_file_size: u64, accepted_types: AcceptedTypes) -> Self {
        Self {
            max_file_size,
            accepted_types,
            ..Default::default()
        }
    }

    pub fn with_max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }
}
