use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Network connection lost")]
    NetworkLost,

    #[error("File format not supported")]
    UnsupportedFormat,

    #[error("Server temporarily unavailable")]
    ServerUnavailable,

    #[error("File size exceeds server limits")]
    SizeLimitExceeded,

    #[error("Upload timeout occurred")]
    Timeout,

    #[error("Invalid file content detected")]
    InvalidContent,

    #[error("{0}")]
    Rejected(String),
}

impl TransferError {
    /// The fixed failures a simulated upload can end with
    pub const SIMULATED: [TransferError; 6] = [
        TransferError::NetworkLost,
        TransferError::UnsupportedFormat,
        TransferError::ServerUnavailable,
        TransferError::SizeLimitExceeded,
        TransferError::Timeout,
        TransferError::InvalidContent,
    ];

    /// Pick one of the simulated failures uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::SIMULATED
            .choose(rng)
            .cloned()
            .unwrap_or(TransferError::NetworkLost)
    }

    /// Short label used as a metrics dimension
    pub fn reason(&self) -> &'static str {
        match self {
            TransferError::NetworkLost => "network_lost",
            TransferError::UnsupportedFormat => "unsupported_format",
            TransferError::ServerUnavailable => "server_unavailable",
            TransferError::SizeLimitExceeded => "size_limit",
            TransferError::Timeout => "timeout",
            TransferError::InvalidContent => "invalid_content",
            TransferError::Rejected(_) => "rejected",
        }
    }
}

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("Description service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed description response: {0}")]
    Malformed(String),
}

pub type DescriptionResult<T> = Result<T, DescriptionError>;
