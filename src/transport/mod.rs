mod description;
mod error;
mod simulator;
#[allow(clippy::module_inception)]
mod transport;
mod types;

pub use description::{describe_image, DescriptionService, DESCRIPTION_PLACEHOLDER};
pub use error::{DescriptionError, DescriptionResult, TransferError, TransferResult};
pub use simulator::{SimulatedTransport, SimulatorConfig};
pub use transport::Transport;
pub use types::{
    progress_channel, DescriptionRequest, DescriptionResponse, ProgressEvent, ProgressReceiver,
    ProgressSender, UploadReceipt,
};
