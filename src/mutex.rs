/// Common interface for mutex implementations.
///
/// `ds2413` needs a mutex to ensure only a single pin object can access a chip at the same time,
/// in concurrent situations.  `ds2413` already implements this trait for a number of existing
/// mutex types.  Most of them are guarded by a feature that needs to be enabled.  Here is an
/// overview:
///
/// | Mutex | Feature Name | Notes |
/// | --- | --- | --- |
/// | [`core::cell::RefCell`] | _always available_ | For sharing within a single execution context. |
/// | [`std::sync::Mutex`][mutex-std] | `std` | For platforms where `std` is available. |
/// | [`critical_section::Mutex`][mutex-cs] | `critical-section` | Use critical sections to ensure synchronized access, via the [`critical-section`][crate-critical-section] crate. |
///
/// [mutex-std]: https://doc.rust-lang.org/std/sync/struct.Mutex.html
/// [mutex-cs]: https://docs.rs/critical-section/latest/critical_section/struct.Mutex.html
/// [crate-critical-section]: https://crates.io/crates/critical-section
///
/// For other mutex types, a custom implementation is needed.  Due to the orphan rule, it might be
/// necessary to wrap it in a newtype.  As an example, this is what such a custom implementation
/// might look like:
///
/// ```
/// struct MyMutex<T>(std::sync::Mutex<T>);
///
/// impl<T> ds2413::PortMutex for MyMutex<T> {
///     type Port = T;
///
///     fn create(v: T) -> Self {
///         Self(std::sync::Mutex::new(v))
///     }
///
///     fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
///         let mut v = self.0.lock().unwrap();
///         f(&mut v)
///     }
/// }
/// ```
pub trait PortMutex {
    /// The actual chip driver that is wrapped inside this mutex.
    type Port;

    /// Create a new mutex of this type.
    fn create(v: Self::Port) -> Self;

    /// Lock the mutex and give a closure access to the chip driver inside.
    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R;
}

impl<T> PortMutex for core::cell::RefCell<T> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        core::cell::RefCell::new(v)
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        let mut v = self.borrow_mut();
        f(&mut v)
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> PortMutex for std::sync::Mutex<T> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        std::sync::Mutex::new(v)
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        let mut v = self.lock().unwrap();
        f(&mut v)
    }
}

#[cfg(feature = "critical-section")]
impl<T> PortMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    type Port = T;

    fn create(v: Self::Port) -> Self {
        critical_section::Mutex::new(core::cell::RefCell::new(v))
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| {
            let mut v = self.borrow_ref_mut(cs);
            f(&mut v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PortMutex;
    use crate::mock::{self, Mock};
    use crate::{Address, Ds2413, PinStates};
    use embedded_hal::digital::PinState;

    const ADDR: Address = Address::new([0x3a, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x1f]);

    #[test]
    fn std_mutex_driver() {
        let expectations = [
            mock::Transaction::reset(true),
            mock::Transaction::select(ADDR),
            mock::Transaction::write(0xf5),
            mock::Transaction::read(0x2d),
            mock::Transaction::reset(true),
        ];
        let mut bus = Mock::new(&expectations);

        let ds: Ds2413<std::sync::Mutex<_>> =
            Ds2413::with_mutex(bus.clone(), ADDR, crate::NoPullup);
        assert_eq!(
            ds.get_state().unwrap(),
            PinStates::new(PinState::Low, PinState::High)
        );

        bus.done();
    }

    #[test]
    fn refcell_lock() {
        let cell = <core::cell::RefCell<u8> as PortMutex>::create(5);
        cell.lock(|v| *v += 1);
        assert_eq!(cell.lock(|v| *v), 6);
    }
}
