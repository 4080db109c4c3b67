use crate::tpm::errors::TpmError;
use bincode::Options;
use bytebuffer::ByteBuffer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::result;

// Tpm12StructOut is a trait for TPM objects which can be serialized in
// big endian byte stream for TPM operations
pub trait Tpm12StructOut {
    fn pack(&self, buff: &mut ByteBuffer);
}

// impl_tpm12_out is a macro which implements Tpm12StructOut for
// primitive types.
macro_rules! impl_tpm12_out {
    ($T: ident) => {
        impl Tpm12StructOut for $T {
            fn pack(&self, buff: &mut ByteBuffer) {
                buff.write_bytes(&self.to_be_bytes()[..]);
            }
        }
    };
}

impl_tpm12_out! { u8 }
impl_tpm12_out! { u16 }
impl_tpm12_out! { u32 }
impl_tpm12_out! { u64 }

// pack serializes a list of argument fields one after the other
pub fn pack(fields: &[&dyn Tpm12StructOut], buff: &mut ByteBuffer) {
    for field in fields.iter() {
        field.pack(buff)
    }
}

// Fixed-layout structures (headers) go through bincode: big endian,
// fixed-width integers, no length prefixes.
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

// encode_struct writes a fixed-layout structure into out, which must be
// exactly as long as the encoded structure
pub fn encode_struct<S: Serialize>(value: &S, out: &mut [u8]) -> result::Result<(), TpmError> {
    let bytes = wire_options()
        .serialize(value)
        .map_err(|err| TpmError::bad_parameter(format!("could not serialize header: {}", err)))?;
    if bytes.len() != out.len() {
        return Err(TpmError::bad_parameter(format!(
            "encoded header is {} bytes, expected {}",
            bytes.len(),
            out.len()
        )));
    }
    out.copy_from_slice(&bytes);
    Ok(())
}

// decode_struct reads a fixed-layout structure from the front of bytes
pub fn decode_struct<D: DeserializeOwned>(bytes: &[u8]) -> result::Result<D, TpmError> {
    wire_options()
        .deserialize(bytes)
        .map_err(|err| TpmError::deserialization(format!("could not decode header: {}", err)))
}
