//! Vessel identity resolution.

use crate::models::VesselPrefix;

/// Leading non-digit run of a cruise identifier.
///
/// `RR1905` resolves to `RR`, `SKQ201910S` to `SKQ`. The result is not
/// checked against the vessel table; lookups do that.
pub fn resolve(cruise: &str) -> VesselPrefix {
    let prefix: String = cruise.chars().take_while(|c| !c.is_ascii_digit()).collect();
    VesselPrefix::new(prefix)
}
