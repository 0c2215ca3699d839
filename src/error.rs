use core::fmt;

/// Errors reported by DS2413 transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus master itself failed.
    Bus(E),
    /// A bus reset was not answered by a presence pulse.
    NoPresence,
    /// The addressed device did not respond to MATCH ROM.
    NotSelected,
    /// A PIO write was rejected, carries the acknowledge byte read instead of `0xAA`.
    Acknowledge(u8),
    /// A PIO read failed its complemented-nibble check, carries the raw byte.
    Verification(u8),
    /// No valid device at the requested search position.
    NoDevice,
    /// A transaction handed to a device driver targets another address, or was advanced past
    /// the latch byte elsewhere.
    ForeignTransaction,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "1-Wire bus error: {:?}", e),
            Error::NoPresence => f.write_str("no presence pulse after bus reset"),
            Error::NotSelected => f.write_str("device did not respond to selection"),
            Error::Acknowledge(ack) => write!(f, "PIO write not acknowledged (0x{:02X})", ack),
            Error::Verification(b) => write!(f, "PIO read verification failed (0x{:02X})", b),
            Error::NoDevice => f.write_str("no valid device at this index"),
            Error::ForeignTransaction => f.write_str("transaction does not belong to this device"),
        }
    }
}
