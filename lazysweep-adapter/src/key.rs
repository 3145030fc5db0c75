#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type HandleMap<H, V> = HashMap<H, V>;
#[cfg(not(feature = "std"))]
pub(crate) type HandleMap<H, V> = BTreeMap<H, V>;

/// Handle bound for adapter types: a scheduler handle that can be copied into transitions.
pub trait AdapterKey: lazysweep::HandleKey + Clone {}
impl<T: lazysweep::HandleKey + Clone> AdapterKey for T {}
