use crate::device::raw::TpmDeviceOps;
use crate::tpm::commands::commands::{frame_command, FrameBuffers, ResponseHeader};
use crate::tpm::errors::TpmError;
use crate::tpm::types::tcg;
use log::{error, trace};
use std::result;

// response_payload_len returns how many payload bytes the caller gets out
// of a response of response_size bytes (header included) when out_size
// bytes were requested
pub fn response_payload_len(response_size: usize, out_size: usize) -> usize {
    let available = response_size.saturating_sub(tcg::RSP_HEAD_SIZE);
    if out_size == 0 || available == 0 {
        0
    } else {
        available.min(out_size)
    }
}

// unpack_response checks the return code of a received response and returns
// the payload visible to the caller. The response size is the smallest of
// the size declared by the TPM, header + out_size and the bytes received.
pub fn unpack_response(response: &[u8], out_size: usize) -> result::Result<&[u8], TpmError> {
    let header = ResponseHeader::unpack(response)?;

    let capacity = tcg::RSP_HEAD_SIZE.saturating_add(out_size);
    let rsp_size = (header.response_size as usize)
        .min(capacity)
        .min(response.len());

    if header.return_code != tcg::TPM_SUCCESS {
        error!(
            "TPM: command failed, return value = {:08X}",
            header.return_code
        );
        return Err(TpmError::ReturnCode(header.return_code));
    }

    let payload_len = response_payload_len(rsp_size, out_size);
    trace!(
        "TPM: response size = {}, payload size = {}",
        rsp_size,
        payload_len
    );
    Ok(&response[tcg::RSP_HEAD_SIZE..tcg::RSP_HEAD_SIZE + payload_len])
}

// run_command frames the arg_size bytes of arguments already written into
// buffers, ships the command to the TPM and unpacks the answer, returning at
// most out_size bytes of response payload
pub fn run_command<'a>(
    tpm: &mut dyn TpmDeviceOps,
    buffers: &'a mut FrameBuffers,
    tag: tcg::TpmTag,
    ordinal: tcg::TpmCommandOrdinal,
    arg_size: usize,
    out_size: usize,
) -> result::Result<&'a [u8], TpmError> {
    let (command, response) = buffers.split_mut();
    let cmd_size = frame_command(command, tag, ordinal, arg_size)?;
    let received = tpm.send_recv(&command[..cmd_size], response)?;
    unpack_response(&response[..received], out_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{self, MockTpmIO};
    use crate::device::raw::TpmDevice;
    use crate::tpm::config::FrameLimits;

    #[test]
    fn test_payload_len_clamping() {
        // caller asks for less than the TPM returned
        assert_eq!(response_payload_len(30, 20), 20);
        assert_eq!(response_payload_len(30, 5), 5);
        // caller asks for more than the TPM returned
        assert_eq!(response_payload_len(20, 64), 10);
        // nothing to hand back
        assert_eq!(response_payload_len(30, 0), 0);
        assert_eq!(response_payload_len(10, 20), 0);
        assert_eq!(response_payload_len(4, 20), 0);
    }

    #[test]
    fn test_unpack_clamps_to_requested_size() {
        let response = mock::response(tcg::TPM_SUCCESS, &[0x11; 20]);
        let payload = unpack_response(&response, 8).unwrap();
        assert_eq!(payload, &[0x11; 8]);
    }

    #[test]
    fn test_unpack_clamps_to_declared_size() {
        let mut response = mock::response(tcg::TPM_SUCCESS, &[0x22; 6]);
        // trailing garbage past the declared size is never surfaced
        response.extend_from_slice(&[0xEE; 14]);
        let payload = unpack_response(&response, 20).unwrap();
        assert_eq!(payload, &[0x22; 6]);
    }

    #[test]
    fn test_unpack_clamps_to_received_bytes() {
        let mut response = mock::response(tcg::TPM_SUCCESS, &[0x33; 20]);
        response.truncate(15);
        let payload = unpack_response(&response, 20).unwrap();
        assert_eq!(payload, &[0x33; 5]);
    }

    #[test]
    fn test_unpack_returns_tpm_error_code() {
        let response = mock::response(0x26, &[0x44; 20]);
        match unpack_response(&response, 20) {
            Err(TpmError::ReturnCode(0x26)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unpack_rejects_short_response() {
        match unpack_response(&[0x00, 0xC4, 0x00, 0x00], 20) {
            Err(TpmError::Deserialization { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_run_command_round_trip() {
        let mock = MockTpmIO::new();
        mock.push_response(&mock::response(tcg::TPM_SUCCESS, &[0x01, 0x02, 0x03, 0x04]));
        let mut device = TpmDevice::new(mock.clone());
        let mut buffers = FrameBuffers::new(&FrameLimits::default());

        let arg_size = buffers.write_args(&[0x00, 0x10]).unwrap();
        let payload = run_command(
            &mut device,
            &mut buffers,
            tcg::TPM_TAG_RQU_COMMAND,
            tcg::TPM_ORD_GET_RANDOM,
            arg_size,
            16,
        )
        .unwrap();

        assert_eq!(payload, &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(
            mock.written(),
            vec![vec![0x00, 0xC1, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x46, 0x00, 0x10]]
        );
    }

    #[test]
    fn test_run_command_oversize_is_not_sent() {
        let mock = MockTpmIO::new();
        let mut device = TpmDevice::new(mock.clone());
        let limits = FrameLimits::new(14, 768).unwrap();
        let mut buffers = FrameBuffers::new(&limits);

        match run_command(
            &mut device,
            &mut buffers,
            tcg::TPM_TAG_RQU_COMMAND,
            tcg::TPM_ORD_PCR_READ,
            5,
            20,
        ) {
            Err(TpmError::BadParameter { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(mock.written().is_empty());
    }
}
