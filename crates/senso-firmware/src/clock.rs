use embassy_time::Instant;
use senso_core::timing::Clock;

/// Milliseconds since boot from the embassy time driver, truncated to the
/// wrapping `u32` counter the sketches expect.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
