//! Shared fixtures for the cross-crate scenario tests.

use cfgchain_model::Timestamp;

pub const RTR01_BASELINE: &str = include_str!("../../../fixtures/configs/rtr01-nyc-baseline.cfg");
/// Baseline plus two NTP servers.
pub const RTR01_NTP: &str = include_str!("../../../fixtures/configs/rtr01-nyc-ntp.cfg");
/// NTP config with telnet re-enabled on the vty lines.
pub const RTR01_TELNET: &str = include_str!("../../../fixtures/configs/rtr01-nyc-telnet.cfg");
pub const SW01_BASELINE: &str = include_str!("../../../fixtures/configs/sw01-sfo-baseline.cfg");

pub fn fixed_clock() -> Timestamp {
    Timestamp::from_raw("2024-03-15T09:00:00.000Z")
}
