use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

#[derive(Default)]
struct MockState {
    written: Vec<Vec<u8>>,
    responses: VecDeque<Vec<u8>>,
    fail_writes: bool,
    fail_reads: bool,
}

// MockTpmIO is a scripted in-memory TPM. Clones share state, so a test can
// hand one clone to a TpmDevice and inspect the written frames on another.
#[derive(Clone, Default)]
pub struct MockTpmIO {
    state: Rc<RefCell<MockState>>,
}

impl MockTpmIO {
    pub fn new() -> Self {
        Default::default()
    }

    // push_response queues the bytes returned by the next read
    pub fn push_response(&self, response: &[u8]) {
        self.state.borrow_mut().responses.push_back(response.to_vec());
    }

    pub fn fail_writes(&self) {
        self.state.borrow_mut().fail_writes = true;
    }

    pub fn fail_reads(&self) {
        self.state.borrow_mut().fail_reads = true;
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.borrow().written.clone()
    }
}

// response builds a TPM 1.2 response frame with a correct size field
pub fn response(return_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(10 + payload.len());
    out.extend_from_slice(&0x00C4u16.to_be_bytes());
    out.extend_from_slice(&(10 + payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&return_code.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

impl io::Read for MockTpmIO {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock read failure"));
        }
        match state.responses.pop_front() {
            None => Ok(0),
            Some(response) => {
                let n = response.len().min(buf.len());
                buf[..n].copy_from_slice(&response[..n]);
                Ok(n)
            }
        }
    }
}

impl io::Write for MockTpmIO {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        state.written.push(buf.to_vec());
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
