mod error;
mod id;
mod state_machine;
mod types;

pub use error::{RecordError, RecordResult};
pub use id::{generate_file_id, generate_record_id};
pub use state_machine::RecordEvent;
pub use types::{format_file_size, is_image_type, FileRecord, FileStatus, RawFile};
