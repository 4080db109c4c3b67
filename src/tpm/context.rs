use crate::device::raw::{ReadWrite, TpmDevice, TpmRawIO};
use crate::tpm::commands::commands::FrameBuffers;
use crate::tpm::commands::run::run_command;
use crate::tpm::config::{FrameLimits, TpmConfig};
use crate::tpm::errors::TpmError;
use crate::tpm::types::tcg;
use std::result;

// TpmContext is a session with one TPM device. It owns the device handle and
// the command/response scratch buffers, so requests on one context are
// serialized by &mut self and separate contexts never share buffers.
pub struct TpmContext<T: ReadWrite> {
    device: TpmDevice<T>,
    limits: FrameLimits,
    buffers: FrameBuffers,
}

impl TpmContext<TpmRawIO> {
    // open creates a context on the configured device node, which is opened
    // when the first command is written
    pub fn open(config: &TpmConfig) -> Self {
        TpmContext::new(
            TpmDevice::new(TpmRawIO::new(&config.device_path)),
            config.limits,
        )
    }
}

impl<T: ReadWrite> TpmContext<T> {
    pub fn new(device: TpmDevice<T>, limits: FrameLimits) -> Self {
        TpmContext {
            device,
            limits,
            buffers: FrameBuffers::new(&limits),
        }
    }

    pub fn limits(&self) -> &FrameLimits {
        &self.limits
    }

    // is_open is false once a transfer failed; a new context is needed then
    pub fn is_open(&self) -> bool {
        self.device.is_open()
    }

    // submit sends ordinal with the given arguments using the standard
    // non-authenticated tag and returns at most out_size payload bytes
    pub(crate) fn submit(
        &mut self,
        ordinal: tcg::TpmCommandOrdinal,
        args: &[u8],
        out_size: usize,
    ) -> result::Result<&[u8], TpmError> {
        let arg_size = self.buffers.write_args(args)?;
        run_command(
            &mut self.device,
            &mut self.buffers,
            tcg::TPM_TAG_RQU_COMMAND,
            ordinal,
            arg_size,
            out_size,
        )
    }
}
