use core::fmt;

const CRC: crc::Crc<u8> = crc::Crc::<u8>::new(&crc::CRC_8_MAXIM_DOW);

/// Dallas/Maxim CRC8, as used for ROM codes.
pub fn crc8(data: &[u8]) -> u8 {
    CRC.checksum(data)
}

/// ROM code of a 1-Wire device.
///
/// The 64 bits are laid out as one family-code byte, six serial-number bytes and a CRC8 over the
/// first seven bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 8]);

impl Address {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Build an address from family code and serial number, appending the matching CRC.
    pub fn from_parts(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = crc8(&bytes[..7]);
        Self(bytes)
    }

    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    pub fn serial(&self) -> &[u8] {
        &self.0[1..7]
    }

    pub const fn crc(&self) -> u8 {
        self.0[7]
    }

    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Whether this ROM code belongs to a DS2413.
    pub const fn is_ds2413(&self) -> bool {
        self.family() == crate::FAMILY_CODE
    }
}

impl From<[u8; 8]> for Address {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 8] {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
