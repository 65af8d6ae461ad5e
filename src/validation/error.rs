use crate::record::format_file_size;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name}: File size exceeds {}", size_label(.max_size))]
    FileTooLarge {
        name: String,
        size: u64,
        max_size: u64,
    },

    #[error("{name}: File name too long (max {max_length} characters)")]
    NameTooLong { name: String, max_length: usize },

    #[error("{name}: File type not allowed")]
    TypeNotAllowed { name: String, mime_type: String },
}

impl ValidationError {
    pub fn file_name(&self) -> &str {
        match self {
            ValidationError::FileTooLarge { name, .. }
            | ValidationError::NameTooLong { name, .. }
            | ValidationError::TypeNotAllowed { name, .. } => name,
        }
    }

    /// Short label used as a metrics dimension
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => "size",
            ValidationError::NameTooLong { .. } => "name",
            ValidationError::TypeNotAllowed { .. } => "type",
        }
    }
}

fn size_label(bytes: &u64) -> String {
    format_file_size(*bytes)
}

pub type ValidationResult<T> = Result<T, ValidationError>;
