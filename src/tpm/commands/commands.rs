use crate::tpm::config::FrameLimits;
use crate::tpm::errors::TpmError;
use crate::tpm::serialization::inout;
use crate::tpm::types::tcg;
use log::error;
use serde::{Deserialize, Serialize};
use std::result;

// Command header: tag, total size including the header, ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHeader {
    pub tag: tcg::TpmTag,
    pub command_size: u32,
    pub ordinal: tcg::TpmCommandOrdinal,
}

impl CommandHeader {
    pub fn new(tag: tcg::TpmTag, command_size: u32, ordinal: tcg::TpmCommandOrdinal) -> Self {
        CommandHeader {
            tag,
            command_size,
            ordinal,
        }
    }

    pub fn unpack(buff: &[u8]) -> result::Result<Self, TpmError> {
        if buff.len() < tcg::CMD_HEAD_SIZE {
            return Err(TpmError::deserialization(format!(
                "command shorter than header: {} bytes",
                buff.len()
            )));
        }
        inout::decode_struct(&buff[..tcg::CMD_HEAD_SIZE])
    }
}

// Response header: tag, total size including the header, return code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub tag: tcg::TpmTag,
    pub response_size: u32,
    pub return_code: tcg::TpmResult,
}

impl ResponseHeader {
    pub fn unpack(buff: &[u8]) -> result::Result<Self, TpmError> {
        if buff.len() < tcg::RSP_HEAD_SIZE {
            return Err(TpmError::deserialization(format!(
                "response shorter than header: {} bytes",
                buff.len()
            )));
        }
        inout::decode_struct(&buff[..tcg::RSP_HEAD_SIZE])
    }
}

// FrameBuffers holds the command and response scratch areas of one session.
// Both are overwritten by every submission.
pub struct FrameBuffers {
    command: Vec<u8>,
    response: Vec<u8>,
}

impl FrameBuffers {
    pub fn new(limits: &FrameLimits) -> Self {
        FrameBuffers {
            command: vec![0; limits.command_max()],
            response: vec![0; limits.response_max()],
        }
    }

    // write_args copies the operation arguments right after the command
    // header and returns their size
    pub fn write_args(&mut self, args: &[u8]) -> result::Result<usize, TpmError> {
        let max = self.command.len() - tcg::CMD_HEAD_SIZE;
        if args.len() > max {
            error!("TPM: cmd exceeds the max supported size.");
            return Err(TpmError::bad_parameter(format!(
                "command arguments of {} bytes exceed the {} bytes available",
                args.len(),
                max
            )));
        }
        self.command[tcg::CMD_HEAD_SIZE..tcg::CMD_HEAD_SIZE + args.len()].copy_from_slice(args);
        Ok(args.len())
    }

    pub fn command(&self) -> &[u8] {
        &self.command
    }

    pub fn response(&self) -> &[u8] {
        &self.response
    }

    pub(crate) fn split_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.command, &mut self.response)
    }
}

// frame_command writes tag, size and ordinal in front of the arg_size bytes
// of arguments already present in command, returning the framed length
pub fn frame_command(
    command: &mut [u8],
    tag: tcg::TpmTag,
    ordinal: tcg::TpmCommandOrdinal,
    arg_size: usize,
) -> result::Result<usize, TpmError> {
    let cmd_size = tcg::CMD_HEAD_SIZE + arg_size;
    if cmd_size > command.len() {
        error!("TPM: cmd exceeds the max supported size.");
        return Err(TpmError::bad_parameter(format!(
            "command of {} bytes exceeds the {} bytes buffer",
            cmd_size,
            command.len()
        )));
    }

    let header = CommandHeader::new(tag, cmd_size as u32, ordinal);
    inout::encode_struct(&header, &mut command[..tcg::CMD_HEAD_SIZE])?;
    Ok(cmd_size)
}
