use crate::tpm::errors::TpmError;
use crate::tpm::serialization::inout::Tpm12StructOut;
use bytebuffer::ByteBuffer;
use std::fmt;
use std::str::FromStr;

// Types
pub type TpmTag = u16;
pub type TpmCommandOrdinal = u32;
pub type TpmResult = u32;
pub type TpmPcrIndex = u32;

// Command tags
pub const TPM_TAG_RQU_COMMAND: TpmTag = 0x00C1;
pub const TPM_TAG_RSP_COMMAND: TpmTag = 0x00C4;

// Structure tags
pub const TPM_TAG_PCR_INFO_LONG: TpmTag = 0x0006;
pub const TPM_TAG_STORED_DATA12: TpmTag = 0x0016;

// TPM 1.2 command ordinals
pub const TPM_ORD_OIAP: TpmCommandOrdinal = 0x0000000A;
pub const TPM_ORD_OSAP: TpmCommandOrdinal = 0x0000000B;
pub const TPM_ORD_PCR_EXTEND: TpmCommandOrdinal = 0x00000014;
pub const TPM_ORD_PCR_READ: TpmCommandOrdinal = 0x00000015;
pub const TPM_ORD_SEAL: TpmCommandOrdinal = 0x00000017;
pub const TPM_ORD_UNSEAL: TpmCommandOrdinal = 0x00000018;
pub const TPM_ORD_GET_RANDOM: TpmCommandOrdinal = 0x00000046;
pub const TPM_ORD_GET_CAPABILITY: TpmCommandOrdinal = 0x00000065;
pub const TPM_ORD_SAVE_STATE: TpmCommandOrdinal = 0x00000098;
pub const TPM_ORD_PCR_RESET: TpmCommandOrdinal = 0x000000C8;
pub const TPM_ORD_NV_WRITE_VALUE: TpmCommandOrdinal = 0x000000CD;
pub const TPM_ORD_NV_READ_VALUE: TpmCommandOrdinal = 0x000000CF;

// Return codes
pub const TPM_SUCCESS: TpmResult = 0x00000000;
pub const TPM_BAD_PARAMETER: TpmResult = 0x00000003;
pub const TPM_FAIL: TpmResult = 0x00000009;

pub const TPM_NR_PCRS: TpmPcrIndex = 24;
pub const TPM_DIGEST_SIZE: usize = 20;

// Header layout: tag, size, ordinal (command) or return code (response)
pub const CMD_HEAD_SIZE: usize = size_of!(TpmTag) + size_of!(u32) + size_of!(TpmCommandOrdinal);
pub const RSP_HEAD_SIZE: usize = size_of!(TpmTag) + size_of!(u32) + size_of!(TpmResult);
pub const CMD_SIZE_OFFSET: usize = size_of!(TpmTag);
pub const CMD_ORD_OFFSET: usize = CMD_SIZE_OFFSET + size_of!(u32);
pub const RSP_SIZE_OFFSET: usize = size_of!(TpmTag);
pub const RSP_RST_OFFSET: usize = RSP_SIZE_OFFSET + size_of!(u32);

// TPM_DIGEST, a SHA-1 sized value. Used both as extend input and as the
// resulting PCR value.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TpmDigest(pub [u8; TPM_DIGEST_SIZE]);

// TPM_PCRVALUE
pub type TpmPcrValue = TpmDigest;

impl TpmDigest {
    pub fn new(digest: [u8; TPM_DIGEST_SIZE]) -> Self {
        TpmDigest(digest)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for TpmDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for TpmDigest {
    type Error = TpmError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let digest = <[u8; TPM_DIGEST_SIZE]>::try_from(bytes).map_err(|_| {
            TpmError::bad_parameter(format!(
                "digest must be {} bytes, got {}",
                TPM_DIGEST_SIZE,
                bytes.len()
            ))
        })?;
        Ok(TpmDigest(digest))
    }
}

impl FromStr for TpmDigest {
    type Err = TpmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|err| TpmError::bad_parameter(format!("invalid digest hex: {}", err)))?;
        TpmDigest::try_from(&bytes[..])
    }
}

impl fmt::Display for TpmDigest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TpmDigest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TpmDigest({})", hex::encode(self.0))
    }
}

impl Tpm12StructOut for TpmDigest {
    fn pack(&self, buff: &mut ByteBuffer) {
        buff.write_bytes(&self.0);
    }
}
