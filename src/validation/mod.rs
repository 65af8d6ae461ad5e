mod error;
mod preview;
mod rules;
mod validator;

pub use error::{ValidationError, ValidationResult};
pub use preview::build_preview;
pub use rules::{AcceptedTypes, UploadRules};
pub use validator::{admit, validate, Admission};
