//! Driver for the DS2413 dual-channel 1-Wire addressable switch.
//!
//! The crate is split into two layers:
//!
//! - [`Directory`] enumerates a bus, validates ROM codes and counts the devices found.
//! - [`WriteTransaction`] and [`ReadTransaction`] perform the chip's PIO access sequences, either
//!   to completion or one bus primitive at a time so other work can be interleaved.
//!
//! On top of that, [`Ds2413`] wraps a single chip and hands out its two channels as
//! `embedded-hal` pins.  The bus master itself is supplied by the application through the
//! [`OneWireBus`] trait.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod address;
mod bus;
mod common;
pub mod dev;
mod directory;
mod error;
mod multi;
mod mutex;
mod pin;
pub mod pullup;
pub mod transaction;

#[cfg(test)]
mod mock;

pub use address::{crc8, Address};
pub use bus::OneWireBus;
pub use common::mode;
pub use common::PinStates;
pub use directory::{Directory, FAMILY_CODE};
pub use error::Error;
pub use multi::read_multiple;
pub use multi::write_multiple;
pub use mutex::PortMutex;
pub use pin::{Pin, PinError};
pub use pullup::{ExternalPullup, NoPullup, StrongPullup};
pub use transaction::{ReadTransaction, WriteTransaction};

pub(crate) use common::PortDriver;

pub use dev::ds2413::Ds2413;
