//! Error types shared across decoding, lock checks and signing

use thiserror::Error;

/// Every failure the crate reports. Decoding failures are non-fatal
/// diagnostics; lock-check and signing failures map one-to-one onto the
/// script opcodes that surface them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("buffer: try to take more")]
    BufferOverflow,

    #[error("blockheader: wrong size")]
    BlockHeaderWrongSize,

    #[error("transaction outpoint: wrong size")]
    OutPointWrongSize,

    #[error("transaction: no witness marker")]
    NoWitnessMarker,

    #[error("transaction: no witness flag")]
    NoWitnessFlag,

    #[error("hex: invalid string")]
    InvalidHex,

    #[error("transaction signer: locktime type mismatch")]
    LocktimeThreshold,

    #[error("transaction signer: locktime has not arrived")]
    LocktimeNotArrived,

    #[error("transaction signer: final sequence")]
    LocktimeSequenceFinal,

    #[error("transaction signer: transaction version below 2")]
    SequenceLowVersion,

    #[error("transaction signer: sequence disabled")]
    SequenceDisabled,

    #[error("transaction signer: sequence type mismatch")]
    SequenceThreshold,

    #[error("transaction signer: sequence has not arrived")]
    SequenceNotArrived,

    #[error("transaction signer: empty signature")]
    EmptySignature,

    #[error("transaction signer: signature verification failed")]
    VerifySignatureFailed,
}

impl From<hex::FromHexError> for CoreError {
    fn from(_: hex::FromHexError) -> Self {
        CoreError::InvalidHex
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
