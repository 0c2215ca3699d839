//! Scripted 1-Wire bus for tests, in the spirit of `embedded-hal-mock`.

use crate::{Address, OneWireBus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Reset(bool),
    ResetSearch,
    Search(Option<Address>),
    /// Address, `immediate` flag, acknowledge.
    Select(Address, bool, bool),
    Write(u8),
    Read(u8),
    /// The next primitive fails with [`MockError`].
    Fail,
}

impl Transaction {
    pub fn reset(presence: bool) -> Self {
        Self::Reset(presence)
    }
    pub fn reset_search() -> Self {
        Self::ResetSearch
    }
    pub fn search(address: Address) -> Self {
        Self::Search(Some(address))
    }
    pub fn search_end() -> Self {
        Self::Search(None)
    }
    /// Selection issued by a blocking run.
    pub fn select(address: Address) -> Self {
        Self::Select(address, false, true)
    }
    /// Selection issued by a polled step.
    pub fn select_immediate(address: Address) -> Self {
        Self::Select(address, true, true)
    }
    pub fn select_nak(address: Address) -> Self {
        Self::Select(address, false, false)
    }
    pub fn select_nak_immediate(address: Address) -> Self {
        Self::Select(address, true, false)
    }
    pub fn write(byte: u8) -> Self {
        Self::Write(byte)
    }
    pub fn read(byte: u8) -> Self {
        Self::Read(byte)
    }
    pub fn fail() -> Self {
        Self::Fail
    }
}

#[derive(Debug, Clone)]
pub struct Mock {
    expected: Arc<Mutex<VecDeque<Transaction>>>,
}

impl Mock {
    pub fn new(expectations: &[Transaction]) -> Self {
        Self {
            expected: Arc::new(Mutex::new(expectations.iter().cloned().collect())),
        }
    }

    /// Assert that all expected transactions were consumed.
    pub fn done(&mut self) {
        let remaining: Vec<Transaction> = self.expected.lock().unwrap().drain(..).collect();
        assert!(remaining.is_empty(), "unconsumed transactions: {:?}", remaining);
    }

    fn next(&self, what: &str) -> Transaction {
        self.expected
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} after all transactions", what))
    }
}

impl OneWireBus for Mock {
    type BusError = MockError;

    fn reset(&mut self) -> Result<bool, Self::BusError> {
        match self.next("reset") {
            Transaction::Reset(presence) => Ok(presence),
            Transaction::Fail => Err(MockError),
            t => panic!("expected {:?}, got reset", t),
        }
    }

    fn reset_search(&mut self) {
        match self.next("reset_search") {
            Transaction::ResetSearch => {}
            t => panic!("expected {:?}, got reset_search", t),
        }
    }

    fn search(&mut self) -> Result<Option<Address>, Self::BusError> {
        match self.next("search") {
            Transaction::Search(address) => Ok(address),
            Transaction::Fail => Err(MockError),
            t => panic!("expected {:?}, got search", t),
        }
    }

    fn select(&mut self, address: &Address, immediate: bool) -> Result<bool, Self::BusError> {
        match self.next("select") {
            Transaction::Select(expected, expected_immediate, ack) => {
                assert_eq!(&expected, address, "selected wrong device");
                assert_eq!(expected_immediate, immediate, "wrong select mode for {}", address);
                Ok(ack)
            }
            Transaction::Fail => Err(MockError),
            t => panic!("expected {:?}, got select({})", t, address),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError> {
        match self.next("write") {
            Transaction::Write(expected) => {
                assert_eq!(expected, byte, "wrote wrong byte");
                Ok(())
            }
            Transaction::Fail => Err(MockError),
            t => panic!("expected {:?}, got write(0x{:02x})", t, byte),
        }
    }

    fn read_byte(&mut self) -> Result<u8, Self::BusError> {
        match self.next("read") {
            Transaction::Read(byte) => Ok(byte),
            Transaction::Fail => Err(MockError),
            t => panic!("expected {:?}, got read", t),
        }
    }
}
