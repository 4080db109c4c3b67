use crate::device::errors::DeviceIoError;
use crate::tpm::types::tcg;
use thiserror::Error;

// TpmError is the error returned by every TPM operation. None of the
// variants carry a trustworthy payload: output buffers must not be read
// when an operation fails.
#[derive(Debug, Error)]
pub enum TpmError {
    // absent or out of range argument, or a frame exceeding the buffer size
    #[error("TpmError: bad parameter: {msg}")]
    BadParameter { msg: String },
    // the device transfer failed, the session must be reopened
    #[error("TpmError: device failure: {0}")]
    DeviceFailure(#[from] DeviceIoError),
    // non-zero return code reported by the TPM, passed through verbatim
    #[error("TpmCommandError: {0:#010x}")]
    ReturnCode(u32),
    #[error("DeserializationError: {msg}")]
    Deserialization { msg: String },
}

impl TpmError {
    pub fn bad_parameter<S: Into<String>>(msg: S) -> Self {
        TpmError::BadParameter { msg: msg.into() }
    }

    pub fn deserialization<S: Into<String>>(msg: S) -> Self {
        TpmError::Deserialization { msg: msg.into() }
    }

    // code maps the error onto a TPM 1.2 status value
    pub fn code(&self) -> tcg::TpmResult {
        match self {
            TpmError::BadParameter { .. } => tcg::TPM_BAD_PARAMETER,
            TpmError::ReturnCode(code) => *code,
            TpmError::DeviceFailure(_) | TpmError::Deserialization { .. } => tcg::TPM_FAIL,
        }
    }
}
