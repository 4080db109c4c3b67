pub mod errors;
pub mod raw;

#[cfg(test)]
pub(crate) mod mock;
