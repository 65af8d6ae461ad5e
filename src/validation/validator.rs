use crate::record::{generate_record_id, FileRecord, RawFile};
use crate::validation::error::{ValidationError, ValidationResult};
use crate::validation::preview::build_preview;
use crate::validation::rules::UploadRules;
use futures::future::join_all;

/// Outcome of running a selection of files through the gate.
#[derive(Debug, Default)]
pub struct Admission {
    /// New Pending records, in selection order
    pub accepted: Vec<FileRecord>,
    pub rejected: Vec<ValidationError>,
}

/// Check one file against the rules: size, then name length, then type.
pub fn validate(file: &RawFile, rules: &UploadRules) -> ValidationResult<()> {
    if file.size() > rules.max_file_size {
        return Err(ValidationError::FileTooLarge {
            name: file.name.clone(),
            size: file.size(),
            max_size: rules.max_file_size,
        });
    }

    if file.name.chars().count() > rules.max_name_length {
        return Err(ValidationError::NameTooLong {
            name: file.name.clone(),
            max_length: rules.max_name_length,
        });
    }

    if !rules.accepted_types.matches(&file.name, &file.mime_type) {
        return Err(ValidationError::TypeNotAllowed {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }

    Ok(())
}

/// Validate a selection and build Pending records for the files that pass.
///
/// Previews for all accepted files are decoded concurrently; the returned
/// records keep the original selection order.
pub async fn admit(files: Vec<RawFile>, rules: &UploadRules) -> Admission {
    let mut passed = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        match validate(&file, rules) {
            Ok(()) => passed.push(file),
            Err(e) => {
                tracing::warn!("Rejected file: {}", e);
                rejected.push(e);
            }
        }
    }

    let previews = join_all(passed.iter().map(build_preview)).await;

    let accepted = passed
        .into_iter()
        .zip(previews)
        .map(|(file, preview)| FileRecord::pending(generate_record_id(), file, preview))
        .collect();

    Admission { accepted, rejected }
}
