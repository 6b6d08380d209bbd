//! Cross-bus forwarding policy.
use crate::safety::hardware::HardwareConfig;

/// Destination bus for a frame received on `bus`, or `None` when it must not
/// be relayed.
///
/// The stock AEB frame of the route, if any, only passes while `fwd_brake` is set.
pub fn destination(config: &HardwareConfig, fwd_brake: bool, id: u32, bus: u8) -> Option<u8> {
    let route = config.route(bus)?;
    if route.blacklist.contains(&id) {
        return None;
    }
    if route.stock_brake == Some(id) && !fwd_brake {
        return None;
    }
    Some(route.to)
}
