use std::time::Instant;

use vsq_engine::Clock;
use vsq_ir::Timestamp;

/// Wall clock in milliseconds since construction.
///
/// The count is truncated to `u32` and wraps after about 49.7 days, the
/// same way a microcontroller millisecond counter does.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn advances() {
        let clock = SystemClock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.now().elapsed_since(start) >= 5);
    }
}
