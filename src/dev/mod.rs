//! The device module contains the internals for the supported 1-Wire chips.
//!
//! In most cases you will not need anything from here explicitly, the exposed types at the root of
//! the crate should be enough.

pub mod ds2413;
