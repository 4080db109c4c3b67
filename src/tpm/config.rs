use crate::tpm::errors::TpmError;
use crate::tpm::types::tcg;
use std::path::PathBuf;
use std::result;

// Minimum command/response buffer size that every TPM 1.2 device must
// support (PC Client TPM Specification 1.20).
pub const TPM_CMD_SIZE_MAX: usize = 768;
pub const TPM_RSP_SIZE_MAX: usize = 768;

// Largest buffer accepted for either direction
pub const TPM_BUF_SIZE_LIMIT: usize = 4096;

pub const DEFAULT_DEVICE_PATH: &str = "/dev/tpm0";

// FrameLimits bounds the size of command and response frames, header included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    command_max: usize,
    response_max: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        FrameLimits {
            command_max: TPM_CMD_SIZE_MAX,
            response_max: TPM_RSP_SIZE_MAX,
        }
    }
}

impl FrameLimits {
    pub fn new(command_max: usize, response_max: usize) -> result::Result<Self, TpmError> {
        check_limit("command", command_max, tcg::CMD_HEAD_SIZE)?;
        check_limit("response", response_max, tcg::RSP_HEAD_SIZE)?;
        Ok(FrameLimits {
            command_max,
            response_max,
        })
    }

    pub fn command_max(&self) -> usize {
        self.command_max
    }

    pub fn response_max(&self) -> usize {
        self.response_max
    }

    // max_payload is the room left for command arguments after the header
    pub fn max_payload(&self) -> usize {
        self.command_max - tcg::CMD_HEAD_SIZE
    }
}

fn check_limit(what: &str, value: usize, header_size: usize) -> result::Result<(), TpmError> {
    if value < header_size || value > TPM_BUF_SIZE_LIMIT {
        return Err(TpmError::bad_parameter(format!(
            "{} buffer size {} outside [{}, {}]",
            what, value, header_size, TPM_BUF_SIZE_LIMIT
        )));
    }
    Ok(())
}

// TpmConfig describes which device to talk to and how large frames may be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpmConfig {
    pub device_path: PathBuf,
    pub limits: FrameLimits,
}

impl Default for TpmConfig {
    fn default() -> Self {
        TpmConfig {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            limits: FrameLimits::default(),
        }
    }
}
