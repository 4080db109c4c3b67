use std::io;
use thiserror::Error;

// DeviceIoError is an error encountered while moving bytes to or from the
// TPM device. Write and read failures leave the device handle closed.
#[derive(Debug, Error)]
pub enum DeviceIoError {
    #[error("DeviceIoError: device handle is closed, reopen the device")]
    Closed,
    #[error("DeviceIoError: could not write command to TPM: {0}")]
    Write(#[source] io::Error),
    #[error("DeviceIoError: could not read response from TPM: {0}")]
    Read(#[source] io::Error),
}
