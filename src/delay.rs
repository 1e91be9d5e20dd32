use std::time::Duration;
use embedded_hal::delay::DelayNs;

/// Blocks on `delay` for `duration`, at microsecond resolution. Durations past
/// `u32::MAX` microseconds are capped.
pub fn wait<D: DelayNs>(delay: &mut D, duration: Duration) {
    let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
    delay.delay_us(micros);
}
