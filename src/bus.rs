use crate::{Address, Error};
use core::cell::RefCell;

/// Byte-level access to a 1-Wire bus master.
///
/// This is the boundary to whatever actually drives the bus (bit-banged GPIO, a DS2484 bridge,
/// a UART, ...).  Each method performs exactly one bus primitive so that transactions can be
/// advanced piecewise.
pub trait OneWireBus {
    type BusError;

    /// Issue a reset pulse and report whether any device answered with a presence pulse.
    fn reset(&mut self) -> Result<bool, Self::BusError>;

    /// Restart device enumeration, the next `search()` reports the first device again.
    fn reset_search(&mut self);

    /// Report the next device on the bus, `Ok(None)` once all devices were found.
    fn search(&mut self) -> Result<Option<Address>, Self::BusError>;

    /// Address a single device (MATCH ROM).
    ///
    /// `immediate` is set when the caller advances a transaction step by step and the
    /// implementation should return as soon as the ROM code is on the wire.
    fn select(&mut self, address: &Address, immediate: bool) -> Result<bool, Self::BusError>;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError>;

    fn read_byte(&mut self) -> Result<u8, Self::BusError>;

    /// CRC8 over `data` as used for ROM codes.
    fn crc8(&self, data: &[u8]) -> u8 {
        crate::address::crc8(data)
    }
}

impl<B: OneWireBus + ?Sized> OneWireBus for &mut B {
    type BusError = B::BusError;

    fn reset(&mut self) -> Result<bool, Self::BusError> {
        (**self).reset()
    }
    fn reset_search(&mut self) {
        (**self).reset_search()
    }
    fn search(&mut self) -> Result<Option<Address>, Self::BusError> {
        (**self).search()
    }
    fn select(&mut self, address: &Address, immediate: bool) -> Result<bool, Self::BusError> {
        (**self).select(address, immediate)
    }
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError> {
        (**self).write_byte(byte)
    }
    fn read_byte(&mut self) -> Result<u8, Self::BusError> {
        (**self).read_byte()
    }
    fn crc8(&self, data: &[u8]) -> u8 {
        (**self).crc8(data)
    }
}

/// Share one bus between several devices in a single execution context.
impl<B: OneWireBus> OneWireBus for &RefCell<B> {
    type BusError = B::BusError;

    fn reset(&mut self) -> Result<bool, Self::BusError> {
        self.borrow_mut().reset()
    }
    fn reset_search(&mut self) {
        self.borrow_mut().reset_search()
    }
    fn search(&mut self) -> Result<Option<Address>, Self::BusError> {
        self.borrow_mut().search()
    }
    fn select(&mut self, address: &Address, immediate: bool) -> Result<bool, Self::BusError> {
        self.borrow_mut().select(address, immediate)
    }
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError> {
        self.borrow_mut().write_byte(byte)
    }
    fn read_byte(&mut self) -> Result<u8, Self::BusError> {
        self.borrow_mut().read_byte()
    }
    fn crc8(&self, data: &[u8]) -> u8 {
        self.borrow().crc8(data)
    }
}

pub(crate) trait OneWireExt: OneWireBus {
    /// Reset the bus, failing if nobody answered.
    fn reset_presence(&mut self) -> Result<(), Error<Self::BusError>> {
        if self.reset().map_err(Error::Bus)? {
            Ok(())
        } else {
            Err(Error::NoPresence)
        }
    }

    fn select_device(
        &mut self,
        address: &Address,
        immediate: bool,
    ) -> Result<(), Error<Self::BusError>> {
        if self.select(address, immediate).map_err(Error::Bus)? {
            Ok(())
        } else {
            Err(Error::NotSelected)
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), Error<Self::BusError>> {
        self.write_byte(byte).map_err(Error::Bus)
    }

    fn read(&mut self) -> Result<u8, Error<Self::BusError>> {
        self.read_byte().map_err(Error::Bus)
    }
}

impl<B: OneWireBus + ?Sized> OneWireExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Mock};

    const ADDR: Address = Address::new([0x3a, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x1f]);

    #[test]
    fn shared_refcell_bus() {
        let expectations = [
            mock::Transaction::reset(true),
            mock::Transaction::select(ADDR),
            mock::Transaction::write(0xf5),
            mock::Transaction::read(0x0f),
        ];
        let mut bus = Mock::new(&expectations);
        let shared = RefCell::new(bus.clone());

        let mut a = &shared;
        let mut b = &shared;
        a.reset_presence().unwrap();
        b.select_device(&ADDR, false).unwrap();
        a.write(0xf5).unwrap();
        assert_eq!(b.read().unwrap(), 0x0f);
        assert_eq!(a.crc8(&ADDR.0[..7]), ADDR.crc());

        bus.done();
    }

    #[test]
    fn missing_presence_and_selection() {
        let expectations = [
            mock::Transaction::reset(false),
            mock::Transaction::select_nak_immediate(ADDR),
        ];
        let mut bus = Mock::new(&expectations);

        let mut handle = bus.clone();
        assert_eq!(handle.reset_presence(), Err(Error::NoPresence));
        assert_eq!(handle.select_device(&ADDR, true), Err(Error::NotSelected));

        bus.done();
    }
}
