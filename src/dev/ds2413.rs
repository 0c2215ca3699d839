//! Support for the `DS2413` "1-Wire Dual Channel Addressable Switch"
//!
//! Datasheet: https://www.analog.com/media/en/technical-documentation/data-sheets/DS2413.pdf
//!
//! The DS2413 has two open-drain PIO channels which can be driven and sampled.  It is powered
//! from the 1-Wire data line.  Channel levels follow the chip's inverted logic, see
//! [`PinStates`].
use crate::pullup::{ExternalPullup, NoPullup, StrongPullup};
use crate::transaction::{ReadTransaction, WriteStage, WriteTransaction};
use crate::{Address, Error, OneWireBus, PinStates};
use core::task::Poll;
use embedded_hal::digital::OutputPin;

/// `DS2413` "1-Wire Dual Channel Addressable Switch"
pub struct Ds2413<M>(M);

impl<B> Ds2413<core::cell::RefCell<Driver<B, NoPullup>>>
where
    B: OneWireBus,
{
    /// Create a driver for the DS2413 at `address`.
    ///
    /// To talk to several chips on the same bus, hand each one a `&RefCell` of the bus:
    ///
    /// ```
    /// # use ds2413::{Address, OneWireBus};
    /// # struct Bus;
    /// # impl OneWireBus for Bus {
    /// #     type BusError = ();
    /// #     fn reset(&mut self) -> Result<bool, ()> { Ok(true) }
    /// #     fn reset_search(&mut self) {}
    /// #     fn search(&mut self) -> Result<Option<Address>, ()> { Ok(None) }
    /// #     fn select(&mut self, _: &Address, _: bool) -> Result<bool, ()> { Ok(true) }
    /// #     fn write_byte(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
    /// #     fn read_byte(&mut self) -> Result<u8, ()> { Ok(0xaa) }
    /// # }
    /// use core::cell::RefCell;
    /// use ds2413::Ds2413;
    ///
    /// let bus = RefCell::new(Bus);
    /// let mut relay = Ds2413::new(&bus, Address::from_parts(0x3a, [1, 2, 3, 4, 5, 6]));
    /// let mut valve = Ds2413::new(&bus, Address::from_parts(0x3a, [6, 5, 4, 3, 2, 1]));
    ///
    /// let mut relay_pins = relay.split();
    /// let valve_pins = valve.split();
    /// relay_pins.gpio0.set_high().unwrap();
    /// let _open = valve_pins.gpio1.is_high();
    /// ```
    pub fn new(bus: B, address: Address) -> Self {
        Self::with_mutex(bus, address, NoPullup)
    }
}

impl<B, P> Ds2413<core::cell::RefCell<Driver<B, ExternalPullup<P>>>>
where
    B: OneWireBus,
    P: OutputPin,
{
    /// Create a driver which engages a strong pull-up on `pin` (active low) during PIO writes.
    pub fn with_pullup(bus: B, address: Address, pin: P) -> Self {
        Self::with_mutex(bus, address, ExternalPullup::new(pin))
    }
}

impl<B, P, M> Ds2413<M>
where
    B: OneWireBus,
    P: StrongPullup,
    M: crate::PortMutex<Port = Driver<B, P>>,
{
    pub fn with_mutex(bus: B, address: Address, pullup: P) -> Self {
        Self(crate::PortMutex::create(Driver::new(bus, address, pullup)))
    }

    pub fn split(&mut self) -> Parts<'_, B, P, M> {
        Parts {
            gpio0: crate::Pin::new(0, &self.0),
            gpio1: crate::Pin::new(1, &self.0),
        }
    }

    pub fn address(&self) -> Address {
        self.0.lock(|drv| drv.address)
    }

    /// Drive both channels in a single PIO write.
    pub fn set_state(&self, states: PinStates) -> Result<(), Error<B::BusError>> {
        self.0.lock(|drv| drv.write(states))
    }

    /// Sample both channels in a single PIO read.
    pub fn get_state(&self) -> Result<PinStates, Error<B::BusError>> {
        self.0.lock(|drv| drv.read())
    }

    /// Check whether the chip answers a PIO read, see [`Directory::is_connected`][crate::Directory::is_connected].
    pub fn is_connected(&self) -> Result<bool, B::BusError> {
        match self.get_state() {
            Ok(_) => Ok(true),
            Err(Error::Bus(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    /// Prepare a write to this chip for use with [`poll_write()`][Ds2413::poll_write].
    pub fn begin_write(&self, states: PinStates) -> WriteTransaction {
        WriteTransaction::new(self.address(), states)
    }

    /// Prepare a read from this chip for use with [`poll_read()`][Ds2413::poll_read].
    pub fn begin_read(&self) -> ReadTransaction {
        ReadTransaction::new(self.address())
    }

    /// Advance a write by one bus primitive, handling the strong pull-up.
    ///
    /// Only transactions for this chip are accepted, and they must not have been stepped past the
    /// latch byte by anything but this driver.  Others are refused with
    /// [`Error::ForeignTransaction`] without touching the bus.
    pub fn poll_write(
        &self,
        transaction: &mut WriteTransaction,
    ) -> Poll<Result<(), Error<B::BusError>>> {
        self.0.lock(|drv| drv.drive_write(transaction, true))
    }

    /// Advance a read by one bus primitive.  Transactions for another address are refused with
    /// [`Error::ForeignTransaction`].
    pub fn poll_read(
        &self,
        transaction: &mut ReadTransaction,
    ) -> Poll<Result<PinStates, Error<B::BusError>>> {
        self.0.lock(|drv| {
            if transaction.address() != drv.address {
                return Poll::Ready(Err(Error::ForeignTransaction));
            }
            transaction.step(&mut drv.bus)
        })
    }
}

pub struct Parts<'a, B, P = NoPullup, M = core::cell::RefCell<Driver<B, P>>>
where
    B: OneWireBus,
    P: StrongPullup,
    M: crate::PortMutex<Port = Driver<B, P>>,
{
    pub gpio0: crate::Pin<'a, crate::mode::QuasiBidirectional, M>,
    pub gpio1: crate::Pin<'a, crate::mode::QuasiBidirectional, M>,
}

pub struct Driver<B, P> {
    bus: B,
    address: Address,
    pullup: P,
    pullup_engaged: bool,
    out: u32,
}

impl<B, P> Driver<B, P>
where
    B: OneWireBus,
    P: StrongPullup,
{
    pub fn new(bus: B, address: Address, pullup: P) -> Self {
        Self {
            bus,
            address,
            pullup,
            pullup_engaged: false,
            // the chip powers up with both output transistors off
            out: PinStates::default().to_mask(),
        }
    }

    fn drive_write(
        &mut self,
        transaction: &mut WriteTransaction,
        immediate: bool,
    ) -> Poll<Result<(), Error<B::BusError>>> {
        if transaction.address() != self.address {
            return Poll::Ready(Err(Error::ForeignTransaction));
        }
        // the latch byte must have gone out with our pull-up engaged
        if transaction.stage().ordinal() > WriteStage::Latch.ordinal() && !self.pullup_engaged {
            return Poll::Ready(Err(Error::ForeignTransaction));
        }

        if transaction.stage() == WriteStage::Latch && !self.pullup_engaged {
            self.pullup.activate();
            self.pullup_engaged = true;
        }

        let result = transaction.advance(&mut self.bus, immediate);

        if let Poll::Ready(ref r) = result {
            if self.pullup_engaged {
                self.pullup.deactivate();
                self.pullup_engaged = false;
            }
            if r.is_ok() {
                self.out = transaction.states().to_mask();
            }
        }
        result
    }

    fn write(&mut self, states: PinStates) -> Result<(), Error<B::BusError>> {
        let mut transaction = WriteTransaction::new(self.address, states);
        loop {
            if let Poll::Ready(result) = self.drive_write(&mut transaction, false) {
                return result;
            }
        }
    }

    fn read(&mut self) -> Result<PinStates, Error<B::BusError>> {
        ReadTransaction::new(self.address).run(&mut self.bus)
    }
}

impl<B, P> crate::PortDriver for Driver<B, P>
where
    B: OneWireBus,
    P: StrongPullup,
{
    type Error = Error<B::BusError>;

    fn set(&mut self, mask_high: u32, mask_low: u32) -> Result<(), Self::Error> {
        let out = (self.out | mask_high) & !mask_low;
        self.write(PinStates::from_mask(out))
    }

    fn is_set(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error> {
        Ok((self.out & mask_high) | (!self.out & mask_low))
    }

    fn get(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error> {
        let in_ = self.read()?.to_mask();
        Ok((in_ & mask_high) | (!in_ & mask_low))
    }
}
