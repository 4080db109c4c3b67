use crate::device::errors::DeviceIoError;
use crate::tpm::errors::TpmError;
use crate::tpm::types::tcg;
use log::{error, trace};
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::{Error, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::result;

// Define a combined ReadWrite trait.
pub trait ReadWrite: io::Read + io::Write {}
impl<T: io::Read + io::Write> ReadWrite for T {}

// TpmRawIO implements communication with the TPM via /dev/tpm[0-9] device file.
// The device file is opened on the first write.
pub struct TpmRawIO {
    path: PathBuf,
    device_file: Option<File>,
}

impl TpmRawIO {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TpmRawIO {
            path: path.as_ref().to_path_buf(),
            device_file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl io::Read for TpmRawIO {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.device_file {
            None => Err(Error::new(
                ErrorKind::NotConnected,
                "device file not open for reading",
            )),
            Some(f) => f.read(buf),
        }
    }
}

impl io::Write for TpmRawIO {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.device_file.is_none() {
            let f = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&self.path)
                .map_err(|err| {
                    Error::new(
                        err.kind(),
                        format!("could not open {}: {}", self.path.display(), err),
                    )
                })?;
            self.device_file = Some(f);
        }

        match &mut self.device_file {
            None => Err(Error::new(
                ErrorKind::NotConnected,
                "device file is not set, cannot write input buffer",
            )),
            Some(f) => {
                f.write_all(buf)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "flush is not supported on TpmRawIO",
        ))
    }
}

// TpmDevice represents a TPM device implementing I/O operation
// via internal rw object. The rw object is dropped, closing the
// underlying handle, as soon as a transfer fails.
pub struct TpmDevice<T: ReadWrite> {
    rw: Option<T>,
}

impl<T: ReadWrite> TpmDevice<T> {
    pub fn new(rw: T) -> Self {
        TpmDevice { rw: Some(rw) }
    }

    pub fn is_open(&self) -> bool {
        self.rw.is_some()
    }

    fn close(&mut self) {
        self.rw = None;
    }
}

// TpmDeviceOps is a trait defining operations supported by TpmDevice objects
pub trait TpmDeviceOps {
    // send_recv writes a framed command and reads the answer back into
    // response, returning the number of bytes received
    fn send_recv(&mut self, command: &[u8], response: &mut [u8]) -> result::Result<usize, TpmError>;
}

impl<T: ReadWrite> TpmDeviceOps for TpmDevice<T> {
    fn send_recv(&mut self, command: &[u8], response: &mut [u8]) -> result::Result<usize, TpmError> {
        if command.len() < tcg::CMD_HEAD_SIZE || response.len() < tcg::RSP_HEAD_SIZE {
            error!("TPM: in/out buf size must be larger than 10 bytes");
            return Err(TpmError::bad_parameter(format!(
                "in/out buf size must be at least {} bytes (command {}, response {})",
                tcg::CMD_HEAD_SIZE,
                command.len(),
                response.len()
            )));
        }

        let rw = self.rw.as_mut().ok_or(DeviceIoError::Closed)?;

        trace!("TPM: cmd size = {}", command.len());
        trace!("TPM: cmd content: {}", hex::encode(command));

        if let Err(err) = rw.write(command) {
            error!("TPM: write failed, closing device: {}", err);
            self.close();
            return Err(DeviceIoError::Write(err).into());
        }

        match rw.read(response) {
            Err(err) => {
                error!("TPM: read failed, closing device: {}", err);
                self.close();
                Err(DeviceIoError::Read(err).into())
            }
            Ok(n) => {
                trace!("TPM: response size = {}", n);
                trace!("TPM: response content: {}", hex::encode(&response[..n]));
                Ok(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockTpmIO;

    fn success_response() -> Vec<u8> {
        vec![0x00, 0xC4, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x00]
    }

    #[test]
    fn test_send_recv_writes_command_and_reads_answer() {
        let mock = MockTpmIO::new();
        mock.push_response(&success_response());
        let mut device = TpmDevice::new(mock.clone());

        let command = [0x00, 0xC1, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x46];
        let mut response = [0u8; 32];
        let n = device.send_recv(&command, &mut response).unwrap();

        assert_eq!(n, 10);
        assert_eq!(&response[..n], &success_response()[..]);
        assert_eq!(mock.written(), vec![command.to_vec()]);
        assert!(device.is_open());
    }

    #[test]
    fn test_send_recv_rejects_short_buffers() {
        let mock = MockTpmIO::new();
        let mut device = TpmDevice::new(mock.clone());
        let mut response = [0u8; 32];
        let mut short_response = [0u8; 9];
        let command = [0u8; 10];

        match device.send_recv(&command[..9], &mut response) {
            Err(TpmError::BadParameter { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match device.send_recv(&command, &mut short_response) {
            Err(TpmError::BadParameter { .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(mock.written().is_empty());
        assert!(device.is_open());
    }

    #[test]
    fn test_write_failure_closes_device() {
        let mock = MockTpmIO::new();
        mock.fail_writes();
        let mut device = TpmDevice::new(mock.clone());
        let command = [0u8; 10];
        let mut response = [0u8; 32];

        match device.send_recv(&command, &mut response) {
            Err(TpmError::DeviceFailure(DeviceIoError::Write(_))) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!device.is_open());

        match device.send_recv(&command, &mut response) {
            Err(TpmError::DeviceFailure(DeviceIoError::Closed)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_read_failure_closes_device() {
        let mock = MockTpmIO::new();
        mock.fail_reads();
        let mut device = TpmDevice::new(mock.clone());
        let command = [0u8; 10];
        let mut response = [0u8; 32];

        match device.send_recv(&command, &mut response) {
            Err(TpmError::DeviceFailure(DeviceIoError::Read(_))) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!device.is_open());
        assert_eq!(mock.written().len(), 1);
    }

    #[test]
    fn test_raw_io_reports_open_failure() {
        let mut raw = TpmRawIO::new("/nonexistent/tpm-device-node");
        let err = raw.write(&[0u8; 10]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tpm-device-node"));

        let mut buf = [0u8; 10];
        assert_eq!(
            raw.read(&mut buf).unwrap_err().kind(),
            ErrorKind::NotConnected
        );
    }
}
