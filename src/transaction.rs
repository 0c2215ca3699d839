//! PIO access transactions.
//!
//! Every access to a DS2413 is a fixed sequence of bus primitives: reset, MATCH ROM, a command
//! byte, data bytes and a closing reset.  The transaction types here remember where in that
//! sequence they are, so the sequence can be run in one go ([`WriteTransaction::run`]) or
//! advanced one primitive per call ([`WriteTransaction::step`]) with other work done in between.
//!
//! Transactions are plain values owned by the caller.  Each one carries its own stage and
//! intermediate bytes, so several devices can be polled in an interleaved fashion as long as
//! only one transaction is on the wire at a time.
//!
//! ```
//! # use ds2413::{Address, OneWireBus};
//! # struct Bus;
//! # impl OneWireBus for Bus {
//! #     type BusError = ();
//! #     fn reset(&mut self) -> Result<bool, ()> { Ok(true) }
//! #     fn reset_search(&mut self) {}
//! #     fn search(&mut self) -> Result<Option<Address>, ()> { Ok(None) }
//! #     fn select(&mut self, _: &Address, _: bool) -> Result<bool, ()> { Ok(true) }
//! #     fn write_byte(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
//! #     fn read_byte(&mut self) -> Result<u8, ()> { Ok(0xaa) }
//! # }
//! # let mut bus = Bus;
//! # let address = Address::from_parts(0x3a, [1, 2, 3, 4, 5, 6]);
//! use core::task::Poll;
//! use ds2413::{PinStates, WriteTransaction};
//! use embedded_hal::digital::PinState;
//!
//! let mut tx = WriteTransaction::new(address, PinStates::new(PinState::High, PinState::Low));
//! let result = loop {
//!     if let Poll::Ready(result) = tx.step(&mut bus) {
//!         break result;
//!     }
//!     // do something useful while the bus is idle
//! };
//! assert!(result.is_ok());
//! ```

use crate::bus::OneWireExt;
use crate::{Address, Error, OneWireBus, PinStates};
use core::task::Poll;

/// PIO ACCESS READ command.
pub const ACCESS_READ: u8 = 0xF5;
/// PIO ACCESS WRITE command.
pub const ACCESS_WRITE: u8 = 0x5A;
/// Acknowledge byte confirming a PIO write.
pub const ACK_SUCCESS: u8 = 0xAA;
/// Acknowledge byte of a rejected PIO write.
pub const ACK_ERROR: u8 = 0xFF;

/// Stages of a PIO write, named after the primitive performed when stepping from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Reset,
    Select,
    Command,
    Latch,
    LatchComplement,
    Acknowledge,
    Status,
    FinalReset,
    Finish,
}

impl WriteStage {
    /// Position within the sequence, `0` meaning idle.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    const fn next(self) -> Self {
        match self {
            WriteStage::Reset => WriteStage::Select,
            WriteStage::Select => WriteStage::Command,
            WriteStage::Command => WriteStage::Latch,
            WriteStage::Latch => WriteStage::LatchComplement,
            WriteStage::LatchComplement => WriteStage::Acknowledge,
            WriteStage::Acknowledge => WriteStage::Status,
            WriteStage::Status => WriteStage::FinalReset,
            WriteStage::FinalReset => WriteStage::Finish,
            WriteStage::Finish => WriteStage::Reset,
        }
    }
}

/// Stages of a PIO read, named after the action performed when stepping from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    Reset,
    Select,
    Command,
    Status,
    FinalReset,
    Decode,
    Finish,
}

impl ReadStage {
    /// Position within the sequence, `0` meaning idle.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    const fn next(self) -> Self {
        match self {
            ReadStage::Reset => ReadStage::Select,
            ReadStage::Select => ReadStage::Command,
            ReadStage::Command => ReadStage::Status,
            ReadStage::Status => ReadStage::FinalReset,
            ReadStage::FinalReset => ReadStage::Decode,
            ReadStage::Decode => ReadStage::Finish,
            ReadStage::Finish => ReadStage::Reset,
        }
    }
}

/// Drive both PIO output latches of one device.
#[derive(Debug, Clone)]
pub struct WriteTransaction {
    address: Address,
    states: PinStates,
    stage: WriteStage,
    ack: u8,
    status: Option<u8>,
    last_error: bool,
}

impl WriteTransaction {
    pub fn new(address: Address, states: PinStates) -> Self {
        Self {
            address,
            states,
            stage: WriteStage::Reset,
            ack: ACK_ERROR,
            status: None,
            last_error: false,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn states(&self) -> PinStates {
        self.states
    }

    pub fn stage(&self) -> WriteStage {
        self.stage
    }

    pub fn is_idle(&self) -> bool {
        self.stage == WriteStage::Reset
    }

    /// Whether the most recent run of this transaction failed.
    ///
    /// Cleared when a new run starts.
    pub fn last_error(&self) -> bool {
        self.last_error
    }

    /// PIO status byte the chip sent after acknowledging the last write.
    pub fn status(&self) -> Option<u8> {
        self.status
    }

    /// Perform the next bus primitive.
    ///
    /// Returns `Poll::Pending` until the sequence is complete.  Once `Poll::Ready` is returned
    /// the transaction is idle again and the next call starts a fresh write.
    pub fn step<B>(&mut self, bus: &mut B) -> Poll<Result<(), Error<B::BusError>>>
    where
        B: OneWireBus + ?Sized,
    {
        self.advance(bus, true)
    }

    /// Perform all remaining bus primitives back-to-back.
    pub fn run<B>(&mut self, bus: &mut B) -> Result<(), Error<B::BusError>>
    where
        B: OneWireBus + ?Sized,
    {
        loop {
            if let Poll::Ready(result) = self.advance(bus, false) {
                return result;
            }
        }
    }

    pub(crate) fn advance<B>(
        &mut self,
        bus: &mut B,
        immediate: bool,
    ) -> Poll<Result<(), Error<B::BusError>>>
    where
        B: OneWireBus + ?Sized,
    {
        log::trace!("{}: write {:?}", self.address, self.stage);
        match self.execute(bus, immediate) {
            Ok(Poll::Pending) => {
                self.stage = self.stage.next();
                Poll::Pending
            }
            Ok(Poll::Ready(())) => {
                self.stage = WriteStage::Reset;
                if self.last_error {
                    log::warn!("{}: PIO write rejected (0x{:02X})", self.address, self.ack);
                    Poll::Ready(Err(Error::Acknowledge(self.ack)))
                } else {
                    Poll::Ready(Ok(()))
                }
            }
            Err(e) => {
                log::warn!("{}: PIO write aborted in {:?}", self.address, self.stage);
                self.last_error = true;
                self.stage = WriteStage::Reset;
                Poll::Ready(Err(e))
            }
        }
    }

    fn execute<B>(&mut self, bus: &mut B, immediate: bool) -> Result<Poll<()>, Error<B::BusError>>
    where
        B: OneWireBus + ?Sized,
    {
        let latch = self.states.to_latch();
        match self.stage {
            WriteStage::Reset => {
                self.last_error = false;
                self.ack = ACK_ERROR;
                self.status = None;
                bus.reset_presence()?;
            }
            WriteStage::Select => bus.select_device(&self.address, immediate)?,
            WriteStage::Command => bus.write(ACCESS_WRITE)?,
            WriteStage::Latch => bus.write(latch)?,
            WriteStage::LatchComplement => bus.write(!latch)?,
            WriteStage::Acknowledge => self.ack = bus.read()?,
            WriteStage::Status => {
                if self.ack == ACK_SUCCESS {
                    self.status = Some(bus.read()?);
                } else {
                    self.last_error = true;
                }
            }
            WriteStage::FinalReset => bus.reset_presence()?,
            WriteStage::Finish => return Ok(Poll::Ready(())),
        }
        Ok(Poll::Pending)
    }
}

/// Sample both PIO pins of one device.
#[derive(Debug, Clone)]
pub struct ReadTransaction {
    address: Address,
    stage: ReadStage,
    result: u8,
    states: Option<PinStates>,
    last_error: bool,
}

impl ReadTransaction {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            stage: ReadStage::Reset,
            result: 0,
            states: None,
            last_error: false,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn stage(&self) -> ReadStage {
        self.stage
    }

    pub fn is_idle(&self) -> bool {
        self.stage == ReadStage::Reset
    }

    /// Whether the most recent run of this transaction failed.
    ///
    /// Cleared when a new run starts.
    pub fn last_error(&self) -> bool {
        self.last_error
    }

    /// Pin states decoded by the last successful run.
    pub fn states(&self) -> Option<PinStates> {
        self.states
    }

    /// Perform the next step of the read, see [`WriteTransaction::step`].
    pub fn step<B>(&mut self, bus: &mut B) -> Poll<Result<PinStates, Error<B::BusError>>>
    where
        B: OneWireBus + ?Sized,
    {
        self.advance(bus, true)
    }

    /// Perform all remaining steps back-to-back.
    pub fn run<B>(&mut self, bus: &mut B) -> Result<PinStates, Error<B::BusError>>
    where
        B: OneWireBus + ?Sized,
    {
        loop {
            if let Poll::Ready(result) = self.advance(bus, false) {
                return result;
            }
        }
    }

    pub(crate) fn advance<B>(
        &mut self,
        bus: &mut B,
        immediate: bool,
    ) -> Poll<Result<PinStates, Error<B::BusError>>>
    where
        B: OneWireBus + ?Sized,
    {
        log::trace!("{}: read {:?}", self.address, self.stage);
        match self.execute(bus, immediate) {
            Ok(Poll::Pending) => {
                self.stage = self.stage.next();
                Poll::Pending
            }
            Ok(Poll::Ready(())) => {
                self.stage = ReadStage::Reset;
                Poll::Ready(self.states.ok_or(Error::Verification(self.result)))
            }
            Err(e) => {
                log::warn!("{}: PIO read aborted in {:?}", self.address, self.stage);
                self.last_error = true;
                self.stage = ReadStage::Reset;
                Poll::Ready(Err(e))
            }
        }
    }

    fn execute<B>(&mut self, bus: &mut B, immediate: bool) -> Result<Poll<()>, Error<B::BusError>>
    where
        B: OneWireBus + ?Sized,
    {
        match self.stage {
            ReadStage::Reset => {
                self.last_error = false;
                self.states = None;
                bus.reset_presence()?;
            }
            ReadStage::Select => bus.select_device(&self.address, immediate)?,
            ReadStage::Command => bus.write(ACCESS_READ)?,
            ReadStage::Status => self.result = bus.read()?,
            ReadStage::FinalReset => bus.reset_presence()?,
            ReadStage::Decode => {
                self.states = PinStates::from_status(self.result);
                if self.states.is_none() {
                    log::warn!(
                        "{}: PIO read failed verification (0x{:02X})",
                        self.address,
                        self.result
                    );
                    self.last_error = true;
                }
            }
            ReadStage::Finish => return Ok(Poll::Ready(())),
        }
        Ok(Poll::Pending)
    }
}
