//! Strong pull-up control for parasite-powered buses.
//!
//! The DS2413 draws its operating power from the data line.  When its outputs switch, the
//! datasheet asks for a strong pull-up on the bus, typically a P-channel MOSFET driven by a spare
//! GPIO.  The [`Ds2413`][crate::Ds2413] driver engages it right before the PIO latch byte goes
//! out and releases it once the write transaction has finished.

use embedded_hal::digital::OutputPin;

pub trait StrongPullup {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

/// No strong pull-up fitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPullup;

impl StrongPullup for NoPullup {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
}

/// Strong pull-up switched by an active-low output pin.
#[derive(Debug)]
pub struct ExternalPullup<P> {
    pin: P,
}

impl<P: OutputPin> ExternalPullup<P> {
    /// Take ownership of an already configured output pin and drive it inactive.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_high();
        Self { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> StrongPullup for ExternalPullup<P> {
    fn activate(&mut self) {
        let _ = self.pin.set_low();
    }

    fn deactivate(&mut self) {
        let _ = self.pin.set_high();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital as mock_pin;

    #[test]
    fn external_pullup_is_active_low() {
        let expectations = [
            mock_pin::Transaction::set(mock_pin::State::High),
            mock_pin::Transaction::set(mock_pin::State::Low),
            mock_pin::Transaction::set(mock_pin::State::High),
        ];
        let mut pin = mock_pin::Mock::new(&expectations);

        let mut pullup = ExternalPullup::new(pin.clone());
        pullup.activate();
        pullup.deactivate();

        pin.done();
    }
}
