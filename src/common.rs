use embedded_hal::digital::PinState;

pub trait PortDriver {
    type Error;

    /// Set all pins in `mask_high` to HIGH and all pins in `mask_low` to LOW.
    ///
    /// The driver should implements this such that all pins change state at the same time.
    fn set(&mut self, mask_high: u32, mask_low: u32) -> Result<(), Self::Error>;

    /// Check whether pins in `mask_high` were set HIGH and pins in `mask_low` were set LOW.
    ///
    /// For each pin in either of the masks, the returned `u32` should have a 1 if they meet the
    /// expected state and a 0 otherwise.  All other bits MUST always stay 0.
    ///
    /// If a bit is set in both `mask_high` and `mask_low`, the resulting bit must be 1.
    fn is_set(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error>;

    /// Check whether pins in `mask_high` are driven HIGH and pins in `mask_low` are driven LOW.
    ///
    /// For each pin in either of the masks, the returned `u32` should have a 1 if they meet the
    /// expected state and a 0 otherwise.  All other bits MUST always stay 0.
    ///
    /// If a bit is set in both `mask_high` and `mask_low`, the resulting bit must be 1.
    fn get(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error>;

    fn toggle(&mut self, mask: u32) -> Result<(), Self::Error> {
        // for all pins which are currently low, make them high.
        let mask_high = self.is_set(0, mask)?;
        // for all pins which are currently high, make them low.
        let mask_low = self.is_set(mask, 0)?;
        self.set(mask_high, mask_low)
    }
}

const GPIO0: u8 = 0x01;
const GPIO1: u8 = 0x02;

/// Logical levels of both DS2413 PIO channels.
///
/// The chip works with inverted logic: a logical `High` turns the open-drain output transistor
/// on, which clears the corresponding latch bit.  Reads report a set bit as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinStates {
    pub gpio0: PinState,
    pub gpio1: PinState,
}

impl PinStates {
    pub const fn new(gpio0: PinState, gpio1: PinState) -> Self {
        Self { gpio0, gpio1 }
    }

    /// Latch byte for PIO ACCESS WRITE.
    pub fn to_latch(self) -> u8 {
        let mut state = 0xff;
        if self.gpio0 == PinState::High {
            state &= !GPIO0;
        }
        if self.gpio1 == PinState::High {
            state &= !GPIO1;
        }
        state
    }

    /// Decode the result byte of PIO ACCESS READ.
    ///
    /// The chip sends the pin status in the low nibble and its complement in the high nibble,
    /// `None` is returned if the two don't match.
    pub fn from_status(status: u8) -> Option<Self> {
        if (!status & 0x0f) != status >> 4 {
            return None;
        }
        Some(Self {
            gpio0: PinState::from(status & GPIO0 == 0),
            gpio1: PinState::from(status & GPIO1 == 0),
        })
    }

    /// Pin mask as used by [`PortDriver`], a 1 for every logically high channel.
    pub(crate) fn to_mask(self) -> u32 {
        (bool::from(self.gpio0) as u32) | ((bool::from(self.gpio1) as u32) << 1)
    }

    pub(crate) fn from_mask(mask: u32) -> Self {
        Self {
            gpio0: PinState::from(mask & 0x1 != 0),
            gpio1: PinState::from(mask & 0x2 != 0),
        }
    }
}

impl Default for PinStates {
    fn default() -> Self {
        Self::new(PinState::Low, PinState::Low)
    }
}

/// Pin Modes
pub mod mode {
    /// Trait for pin-modes which can be used to set a logic level.
    pub trait HasOutput {}
    /// Trait for pin-modes which can be used to read a logic level.
    pub trait HasInput {}

    /// Open-drain PIO channel which is both driven and sampled.
    pub struct QuasiBidirectional;
    impl HasInput for QuasiBidirectional {}
    impl HasOutput for QuasiBidirectional {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::PinState::{High, Low};

    /// Status byte the chip reports for a given latch: low nibble plus its complement.
    fn echo(latch: u8) -> u8 {
        let low = latch & 0x0f;
        (!low << 4) | low
    }

    #[test]
    fn latch_encoding() {
        assert_eq!(PinStates::new(Low, Low).to_latch(), 0xff);
        assert_eq!(PinStates::new(High, Low).to_latch(), 0xfe);
        assert_eq!(PinStates::new(Low, High).to_latch(), 0xfd);
        assert_eq!(PinStates::new(High, High).to_latch(), 0xfc);
    }

    #[test]
    fn status_round_trip() {
        for states in [
            PinStates::new(Low, Low),
            PinStates::new(High, Low),
            PinStates::new(Low, High),
            PinStates::new(High, High),
        ] {
            assert_eq!(PinStates::from_status(echo(states.to_latch())), Some(states));
        }
    }

    #[test]
    fn status_verification() {
        assert_eq!(PinStates::from_status(0x0f), Some(PinStates::new(Low, Low)));
        assert_eq!(PinStates::from_status(0x1e), Some(PinStates::new(High, Low)));
        assert_eq!(PinStates::from_status(0x00), None);
        assert_eq!(PinStates::from_status(0x1f), None);
        assert_eq!(PinStates::from_status(0xff), None);
    }

    #[test]
    fn masks() {
        assert_eq!(PinStates::new(High, Low).to_mask(), 0b01);
        assert_eq!(PinStates::new(Low, High).to_mask(), 0b10);
        assert_eq!(PinStates::from_mask(0b11), PinStates::new(High, High));
        assert_eq!(PinStates::from_mask(0b00), PinStates::default());
    }
}
