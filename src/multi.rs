/// Set multiple pins at the same time.
///
/// The usual method of setting multiple pins
///
/// ```no_run
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
/// # let mut ds = ds2413::Ds2413::new(Bus, Address::from_parts(0x3a, [1, 2, 3, 4, 5, 6]));
/// # let p = ds.split();
/// # let mut io0 = p.gpio0;
/// # let mut io1 = p.gpio1;
/// io0.set_high().unwrap();
/// io1.set_low().unwrap();
/// ```
///
/// can be problematic because the time between the two operations is significant (they are
/// done as two complete PIO write transactions).  If it is desired that both channels change
/// state in a single bus transaction, the `write_multiple()` function provides an interface to do
/// this.
///
/// ## Example
/// ```no_run
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
/// # let mut ds = ds2413::Ds2413::new(Bus, Address::from_parts(0x3a, [1, 2, 3, 4, 5, 6]));
/// # let p = ds.split();
/// # let mut io0 = p.gpio0;
/// # let mut io1 = p.gpio1;
/// ds2413::write_multiple(
///     [&mut io0, &mut io1],
///     [true, false],
/// ).unwrap();
/// ```
pub fn write_multiple<PD, MUTEX, MODE: crate::mode::HasOutput, const N: usize>(
    pins: [&mut crate::Pin<'_, MODE, MUTEX>; N],
    states: [bool; N],
) -> Result<(), PD::Error>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    let mut mask_set_high = 0x00;
    let mut mask_set_low = 0x00;

    let port_driver = pins[0].port_driver();
    for (pin, state) in pins.iter().zip(states.iter()) {
        assert!(core::ptr::eq(pin.port_driver(), port_driver));
        if *state {
            mask_set_high |= pin.pin_mask();
        } else {
            mask_set_low |= pin.pin_mask();
        }
    }

    port_driver.lock(|drv| drv.set(mask_set_high, mask_set_low))
}

/// Read multiple pins at the same time.
///
/// Checking the channels one after the other means two complete PIO read transactions, and the
/// inputs could change in between.  The `read_multiple()` function samples all given pins in a
/// single transaction.
///
/// ## Example
/// ```no_run
/// # use ds2413::{Address, OneWireBus};
/// # struct Bus;
/// # impl OneWireBus for Bus {
/// #     type BusError = ();
/// #     fn reset(&mut self) -> Result<bool, ()> { Ok(true) }
/// #     fn reset_search(&mut self) {}
/// #     fn search(&mut self) -> Result<Option<Address>, ()> { Ok(None) }
/// #     fn select(&mut self, _: &Address, _: bool) -> Result<bool, ()> { Ok(true) }
/// #     fn write_byte(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
/// #     fn read_byte(&mut self) -> Result<u8, ()> { Ok(0x0f) }
/// # }
/// # let mut ds = ds2413::Ds2413::new(Bus, Address::from_parts(0x3a, [1, 2, 3, 4, 5, 6]));
/// # let p = ds.split();
/// # let io0 = p.gpio0;
/// # let io1 = p.gpio1;
/// let values = ds2413::read_multiple([&io0, &io1]).unwrap();
/// if values[0] {
///     // ...
/// } else if values[1] {
///     // ...
/// }
/// ```
pub fn read_multiple<PD, MUTEX, MODE: crate::mode::HasInput, const N: usize>(
    pins: [&crate::Pin<'_, MODE, MUTEX>; N],
) -> Result<[bool; N], PD::Error>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    let mask = pins.iter().map(|p| p.pin_mask()).fold(0, |m, p| m | p);
    let port_driver = pins[0].port_driver();
    let mask_in = port_driver.lock(|drv| drv.get(mask, 0))?;

    let mut ret = [false; N];
    for (pin, state) in pins.iter().zip(ret.iter_mut()) {
        assert!(core::ptr::eq(pin.port_driver(), port_driver));
        *state = mask_in & pin.pin_mask() != 0;
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use crate::mock::{self, Mock};
    use crate::transaction::{ACCESS_READ, ACCESS_WRITE, ACK_SUCCESS};
    use crate::Address;
    use core::cell::RefCell;

    const ADDR: Address = Address::new([0x3a, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0x9f]);
    const OTHER: Address = Address::new([0x3a, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x1f]);

    #[test]
    fn ds2413_write_multiple() {
        let expectations = [
            // single write for both channels
            mock::Transaction::reset(true),
            mock::Transaction::select(ADDR),
            mock::Transaction::write(ACCESS_WRITE),
            mock::Transaction::write(0xfd),
            mock::Transaction::write(0x02),
            mock::Transaction::read(ACK_SUCCESS),
            mock::Transaction::read(0x2d),
            mock::Transaction::reset(true),
        ];
        let mut bus = Mock::new(&expectations);

        let mut ds = crate::Ds2413::new(bus.clone(), ADDR);
        let mut ds_pins = ds.split();

        super::write_multiple([&mut ds_pins.gpio0, &mut ds_pins.gpio1], [false, true]).unwrap();
        assert!(ds_pins.gpio1.is_set_high().unwrap());
        assert!(ds_pins.gpio0.is_set_low().unwrap());

        bus.done();
    }

    #[test]
    fn ds2413_read_multiple() {
        let expectations = [
            // single read for both channels
            mock::Transaction::reset(true),
            mock::Transaction::select(ADDR),
            mock::Transaction::write(ACCESS_READ),
            mock::Transaction::read(0x1e),
            mock::Transaction::reset(true),
        ];
        let mut bus = Mock::new(&expectations);

        let mut ds = crate::Ds2413::new(bus.clone(), ADDR);
        let ds_pins = ds.split();

        let res = super::read_multiple([&ds_pins.gpio1, &ds_pins.gpio0]).unwrap();
        assert_eq!(res, [false, true]);

        bus.done();
    }

    #[test]
    #[should_panic]
    fn ds2413_multiple_assert_same_chip() {
        let expectations = [
            mock::Transaction::reset(true),
            mock::Transaction::select(ADDR),
            mock::Transaction::write(ACCESS_READ),
            mock::Transaction::read(0x0f),
            mock::Transaction::reset(true),
        ];
        let bus = RefCell::new(Mock::new(&expectations));

        let mut ds0 = crate::Ds2413::new(&bus, ADDR);
        let ds0_pins = ds0.split();
        let mut ds1 = crate::Ds2413::new(&bus, OTHER);
        let ds1_pins = ds1.split();

        let _ = super::read_multiple([&ds0_pins.gpio0, &ds1_pins.gpio1]);
    }
}
