//! Enumeration of the devices on a 1-Wire bus.

use crate::bus::OneWireExt;
use crate::transaction::{ReadTransaction, WriteTransaction};
use crate::{Address, Error, OneWireBus, PinStates};
use core::task::Poll;

/// Family code of the DS2413.
pub const FAMILY_CODE: u8 = 0x3A;

const READ_POWER_SUPPLY: u8 = 0xB4;

/// Discovery and bookkeeping of the devices on one bus.
///
/// Counts and the parasite-power flag reflect the last [`scan()`][Directory::scan] and are not
/// touched by anything else.
pub struct Directory<B> {
    bus: B,
    devices: usize,
    ds2413_count: usize,
    parasite: bool,
}

impl<B: OneWireBus> Directory<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            devices: 0,
            ds2413_count: 0,
            parasite: false,
        }
    }

    /// Enumerate the bus and count valid devices.
    ///
    /// Devices with a corrupted ROM code are skipped.
    pub fn scan(&mut self) -> Result<(), B::BusError> {
        self.devices = 0;
        self.ds2413_count = 0;
        self.parasite = false;

        self.bus.reset_search();
        while let Some(address) = self.bus.search()? {
            if !self.is_valid_address(&address) {
                log::debug!("{}: CRC mismatch, skipping", address);
                continue;
            }

            if !self.parasite {
                match self.read_power_supply(&address) {
                    Ok(parasite) => self.parasite = parasite,
                    Err(Error::Bus(e)) => return Err(e),
                    Err(_) => log::warn!("{}: power supply query failed", address),
                }
            }

            self.devices += 1;
            if address.is_ds2413() {
                self.ds2413_count += 1;
            }
        }

        log::debug!(
            "found {} devices ({} DS2413), parasite power: {}",
            self.devices,
            self.ds2413_count,
            self.parasite
        );
        Ok(())
    }

    /// Number of valid devices found by the last scan.
    pub fn device_count(&self) -> usize {
        self.devices
    }

    /// Number of DS2413 found by the last scan.
    pub fn ds2413_count(&self) -> usize {
        self.ds2413_count
    }

    /// Whether any device found by the last scan draws power from the data line.
    pub fn is_parasite_power_mode(&self) -> bool {
        self.parasite
    }

    /// Whether the CRC byte of `address` matches its first seven bytes.
    pub fn is_valid_address(&self, address: &Address) -> bool {
        self.bus.crc8(&address.0[..7]) == address.crc()
    }

    /// Whether `address` belongs to a chip family this driver supports.
    pub fn is_target_family(&self, address: &Address) -> bool {
        address.is_ds2413()
    }

    /// Find the address at search position `index`.
    ///
    /// Every search hit counts towards the position, valid or not.  If the device at `index`
    /// has a corrupted ROM code, `None` is returned even when valid devices follow.
    pub fn address_at_index(&mut self, index: usize) -> Result<Option<Address>, B::BusError> {
        self.bus.reset_search();

        let mut depth = 0;
        while depth <= index {
            let Some(address) = self.bus.search()? else {
                break;
            };
            if depth == index && self.is_valid_address(&address) {
                return Ok(Some(address));
            }
            depth += 1;
        }

        Ok(None)
    }

    /// Collect all valid addresses in search order, as many as fit into `N`.
    pub fn addresses<const N: usize>(&mut self) -> Result<heapless::Vec<Address, N>, B::BusError> {
        let mut found = heapless::Vec::new();

        self.bus.reset_search();
        while let Some(address) = self.bus.search()? {
            if !self.is_valid_address(&address) {
                continue;
            }
            if found.push(address).is_err() {
                break;
            }
        }

        Ok(found)
    }

    /// Ask a device whether it runs on parasite power.
    ///
    /// The DS2413 has no supply pin, so it is reported as parasite powered without asking.
    /// Other families answer READ POWER SUPPLY by pulling the line low when parasite powered.
    pub fn read_power_supply(&mut self, address: &Address) -> Result<bool, Error<B::BusError>> {
        if address.is_ds2413() {
            return Ok(true);
        }

        self.bus.reset_presence()?;
        self.bus.select_device(address, false)?;
        self.bus.write(READ_POWER_SUPPLY)?;
        let supply = self.bus.read()?;
        self.bus.reset_presence()?;

        Ok(supply & 0x01 == 0)
    }

    /// Set both PIO channels of the device at search position `index`.
    pub fn set_state(&mut self, index: usize, states: PinStates) -> Result<(), Error<B::BusError>> {
        let address = self
            .address_at_index(index)
            .map_err(Error::Bus)?
            .ok_or(Error::NoDevice)?;
        self.set_state_by_address(&address, states)
    }

    pub fn set_state_by_address(
        &mut self,
        address: &Address,
        states: PinStates,
    ) -> Result<(), Error<B::BusError>> {
        WriteTransaction::new(*address, states).run(&mut self.bus)
    }

    /// Read both PIO channels of the device at search position `index`.
    pub fn get_state(&mut self, index: usize) -> Result<PinStates, Error<B::BusError>> {
        let address = self
            .address_at_index(index)
            .map_err(Error::Bus)?
            .ok_or(Error::NoDevice)?;
        self.get_state_by_address(&address)
    }

    pub fn get_state_by_address(
        &mut self,
        address: &Address,
    ) -> Result<PinStates, Error<B::BusError>> {
        ReadTransaction::new(*address).run(&mut self.bus)
    }

    /// Advance a write by one bus primitive.
    pub fn poll_set_state(
        &mut self,
        transaction: &mut WriteTransaction,
    ) -> Poll<Result<(), Error<B::BusError>>> {
        transaction.step(&mut self.bus)
    }

    /// Advance a read by one bus primitive.
    pub fn poll_get_state(
        &mut self,
        transaction: &mut ReadTransaction,
    ) -> Poll<Result<PinStates, Error<B::BusError>>> {
        transaction.step(&mut self.bus)
    }

    /// Check whether the device answers a PIO read.
    ///
    /// Only bus failures are reported as errors, a missing or misbehaving device yields
    /// `Ok(false)`.
    pub fn is_connected(&mut self, address: &Address) -> Result<bool, B::BusError> {
        match self.get_state_by_address(address) {
            Ok(_) => Ok(true),
            Err(Error::Bus(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn release(self) -> B {
        self.bus
    }
}
