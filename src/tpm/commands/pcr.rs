use crate::device::raw::ReadWrite;
use crate::tpm::context::TpmContext;
use crate::tpm::errors::TpmError;
use crate::tpm::serialization::inout;
use crate::tpm::types::tcg;
use bytebuffer::ByteBuffer;
use log::{debug, error, trace};
use std::result;

fn check_pcr_index(pcr: tcg::TpmPcrIndex) -> result::Result<(), TpmError> {
    if pcr >= tcg::TPM_NR_PCRS {
        return Err(TpmError::bad_parameter(format!(
            "PCR index {} out of range, the TPM has {} PCRs",
            pcr,
            tcg::TPM_NR_PCRS
        )));
    }
    Ok(())
}

// copy_pcr_value copies at most one digest worth of payload into out,
// returning the number of bytes copied
fn copy_pcr_value(payload: &[u8], out: &mut tcg::TpmPcrValue) -> usize {
    let n = payload.len().min(tcg::TPM_DIGEST_SIZE);
    out.0[..n].copy_from_slice(&payload[..n]);
    n
}

impl<T: ReadWrite> TpmContext<T> {
    /// Extends PCR `pcr` with `digest` (TPM_PCRExtend).
    ///
    /// When `out` is given the new PCR value is copied into it and the number
    /// of bytes copied is returned; a TPM answering with a short value only
    /// overwrites that many leading bytes. `out` is untouched on error.
    pub fn pcr_extend(
        &mut self,
        pcr: tcg::TpmPcrIndex,
        digest: &tcg::TpmDigest,
        out: Option<&mut tcg::TpmPcrValue>,
    ) -> result::Result<usize, TpmError> {
        debug!("Extend to pcr {} with {}", pcr, digest);
        check_pcr_index(pcr)?;

        let mut args = ByteBuffer::new();
        inout::pack(&[&pcr, digest], &mut args);
        let out_size = if out.is_some() { tcg::TPM_DIGEST_SIZE } else { 0 };

        let payload = self
            .submit(tcg::TPM_ORD_PCR_EXTEND, &args.to_bytes(), out_size)
            .map_err(|err| {
                error!("TPM: Pcr {} Extend not successful: {}", pcr, err);
                err
            })?;

        match out {
            Some(out) if !payload.is_empty() => {
                let n = copy_pcr_value(payload, out);
                trace!("TPM: Pcr {} after extension: {}", pcr, hex::encode(&out.0[..n]));
                Ok(n)
            }
            _ => Ok(0),
        }
    }

    /// Reads the current value of PCR `pcr` (TPM_PCRRead) into `out`,
    /// returning the number of bytes copied. `out` is untouched on error.
    pub fn pcr_read(
        &mut self,
        pcr: tcg::TpmPcrIndex,
        out: &mut tcg::TpmPcrValue,
    ) -> result::Result<usize, TpmError> {
        debug!("Read pcr {}", pcr);
        check_pcr_index(pcr)?;

        let mut args = ByteBuffer::new();
        inout::pack(&[&pcr], &mut args);

        let payload = self
            .submit(tcg::TPM_ORD_PCR_READ, &args.to_bytes(), tcg::TPM_DIGEST_SIZE)
            .map_err(|err| {
                error!("TPM: Pcr {} Read not successful: {}", pcr, err);
                err
            })?;

        let n = copy_pcr_value(payload, out);
        trace!("TPM: Pcr {} value: {}", pcr, hex::encode(&out.0[..n]));
        Ok(n)
    }
}
