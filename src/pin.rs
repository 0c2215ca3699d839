use core::marker::PhantomData;
use embedded_hal::digital::{self as hal_digital, ErrorKind, PinState};

/// Representation of a DS2413 PIO channel.
///
/// `Pin` is not constructed directly, this type is created by instanciating a [`Ds2413`][crate::Ds2413]
/// and then getting access to both its channels using the `.split()` method.
///
/// Every pin operation that touches the hardware is a complete bus transaction.
pub struct Pin<'a, MODE, MUTEX> {
    pin_mask: u32,
    port_driver: &'a MUTEX,
    _m: PhantomData<MODE>,
}

/// Error of a pin operation, wrapping the error of the underlying chip driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError<PDE> {
    driver_error: PDE,
}

impl<PDE> PinError<PDE> {
    /// The error reported by the chip driver.
    pub fn driver_error(&self) -> &PDE {
        &self.driver_error
    }
}

impl<PDE> From<PDE> for PinError<PDE> {
    fn from(driver_error: PDE) -> Self {
        Self { driver_error }
    }
}

impl<PDE: core::fmt::Debug> hal_digital::Error for PinError<PDE> {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl<'a, MODE, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub(crate) fn new(pin_number: u8, port_driver: &'a MUTEX) -> Self {
        assert!(pin_number < 32);
        Self {
            pin_mask: 1 << pin_number,
            port_driver,
            _m: PhantomData,
        }
    }

    pub(crate) fn pin_mask(&self) -> u32 {
        self.pin_mask
    }

    pub(crate) fn port_driver(&self) -> &'a MUTEX {
        self.port_driver
    }
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub fn is_high(&self) -> Result<bool, PinError<PD::Error>> {
        let mask_in = self
            .port_driver
            .lock(|drv| drv.get(self.pin_mask, 0))?;
        Ok(mask_in & self.pin_mask != 0)
    }

    pub fn is_low(&self) -> Result<bool, PinError<PD::Error>> {
        let mask_in = self
            .port_driver
            .lock(|drv| drv.get(0, self.pin_mask))?;
        Ok(mask_in & self.pin_mask != 0)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub fn set_high(&mut self) -> Result<(), PinError<PD::Error>> {
        self.port_driver
            .lock(|drv| drv.set(self.pin_mask, 0))?;
        Ok(())
    }

    pub fn set_low(&mut self) -> Result<(), PinError<PD::Error>> {
        self.port_driver
            .lock(|drv| drv.set(0, self.pin_mask))?;
        Ok(())
    }

    pub fn set_state(&mut self, state: PinState) -> Result<(), PinError<PD::Error>> {
        match state {
            PinState::High => self.set_high(),
            PinState::Low => self.set_low(),
        }
    }

    /// Return `true` if the pin was last set HIGH.  No bus traffic involved.
    pub fn is_set_high(&self) -> Result<bool, PinError<PD::Error>> {
        let mask_out = self
            .port_driver
            .lock(|drv| drv.is_set(self.pin_mask, 0))?;
        Ok(mask_out & self.pin_mask != 0)
    }

    /// Return `true` if the pin was last set LOW.  No bus traffic involved.
    pub fn is_set_low(&self) -> Result<bool, PinError<PD::Error>> {
        let mask_out = self
            .port_driver
            .lock(|drv| drv.is_set(0, self.pin_mask))?;
        Ok(mask_out & self.pin_mask != 0)
    }

    pub fn toggle(&mut self) -> Result<(), PinError<PD::Error>> {
        self.port_driver
            .lock(|drv| drv.toggle(self.pin_mask))?;
        Ok(())
    }
}

impl<'a, MODE, MUTEX, PD> hal_digital::ErrorType for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: core::fmt::Debug,
    MUTEX: crate::PortMutex<Port = PD>,
{
    type Error = PinError<PD::Error>;
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> hal_digital::InputPin for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: core::fmt::Debug,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_high(self)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_low(self)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> hal_digital::OutputPin for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: core::fmt::Debug,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Pin::set_low(self)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Pin::set_high(self)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> hal_digital::StatefulOutputPin
    for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: core::fmt::Debug,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_high(self)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_low(self)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self)
    }
}
