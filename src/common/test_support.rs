// src/common/test_support.rs

//! Mock bus and delay shared by the unit tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use heapless::{Deque, Vec};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockI2cError(pub ErrorKind);

impl MockI2cError {
    pub const NACK: MockI2cError = MockI2cError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
    pub const TIMEOUT: MockI2cError = MockI2cError(ErrorKind::Other);
}

impl i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// One recorded bus transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Txn {
    pub addr: u8,
    pub written: Vec<u8, 4>,
    pub read_len: usize,
}

/// Scriptable I2C bus. Writes succeed unless a failure is queued; reads pop
/// the next scripted frame and NACK when the script is empty.
#[derive(Debug, Default)]
pub struct MockI2c {
    pub log: Vec<Txn, 32>,
    write_failures: Deque<MockI2cError, 8>,
    reads: Deque<Result<[u8; 3], MockI2cError>, 16>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: [u8; 3]) {
        self.reads.push_back(Ok(frame)).unwrap();
    }

    pub fn push_read_error(&mut self, err: MockI2cError) {
        self.reads.push_back(Err(err)).unwrap();
    }

    pub fn push_write_error(&mut self, err: MockI2cError) {
        self.write_failures.push_back(err).unwrap();
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    fn run(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), MockI2cError> {
        let mut txn = Txn {
            addr: address,
            written: Vec::new(),
            read_len: 0,
        };
        let mut result = Ok(());
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    txn.written.extend_from_slice(bytes).unwrap();
                    if let Some(err) = self.write_failures.pop_front() {
                        result = Err(err);
                        break;
                    }
                }
                Operation::Read(buf) => {
                    txn.read_len += buf.len();
                    match self.reads.pop_front().unwrap_or(Err(MockI2cError::NACK)) {
                        Ok(frame) => {
                            let n = core::cmp::min(buf.len(), frame.len());
                            buf[..n].copy_from_slice(&frame[..n]);
                        }
                        Err(err) => {
                            result = Err(err);
                            break;
                        }
                    }
                }
            }
        }
        self.log.push(txn).unwrap();
        result
    }
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::i2c::I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}

/// Delay that only accumulates the requested time.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
