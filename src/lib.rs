//! TPM 1.2 command framing over a character device.
//!
//! Commands are laid out in a per-session scratch buffer (10-byte big-endian
//! header followed by ordinal-specific arguments), written to the device in
//! one blocking write, and the response is read back, clamped to the size the
//! TPM declared and to the size the caller asked for.
//!
//! ```no_run
//! use tpmextend::{TpmConfig, TpmContext, TpmDigest, TpmPcrValue};
//!
//! let mut ctx = TpmContext::open(&TpmConfig::default());
//! let mut value = TpmPcrValue::default();
//! ctx.pcr_extend(10, &TpmDigest::default(), Some(&mut value))?;
//! println!("{}", value);
//! # Ok::<(), tpmextend::TpmError>(())
//! ```

#[macro_use]
extern crate mem_macros;

pub mod device;
pub mod tpm;

pub use device::raw::{ReadWrite, TpmDevice, TpmDeviceOps, TpmRawIO};
pub use tpm::config::{FrameLimits, TpmConfig};
pub use tpm::context::TpmContext;
pub use tpm::errors::TpmError;
pub use tpm::types::tcg::{TpmDigest, TpmPcrValue, TPM_NR_PCRS};
