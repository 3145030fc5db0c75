#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type HandleMap<H, V> = HashMap<H, V>;
#[cfg(not(feature = "std"))]
pub(crate) type HandleMap<H, V> = BTreeMap<H, V>;

/// Bound for element handles passed to `observe`/`unobserve`.
///
/// With `std` this is `Hash + Eq`; without it, handles are kept in a `BTreeMap` and must be `Ord`.
#[cfg(feature = "std")]
#[doc(hidden)]
pub trait HandleKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<H: core::hash::Hash + Eq> HandleKey for H {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait HandleKey: Ord {}
#[cfg(not(feature = "std"))]
impl<H: Ord> HandleKey for H {}
