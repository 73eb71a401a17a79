//! SysTick-driven millisecond tick source.

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use thyra_hal::time::Monotonic;

// Single writer (the SysTick exception); thumbv6 has atomic load/store
// but no read-modify-write, so the counter is bumped in two steps.
static TICKS: AtomicU32 = AtomicU32::new(0);

/// Millisecond counter fed by the SysTick exception.
pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Configure SysTick for a 1 kHz beat off the core clock and take
    /// ownership of the counter.
    pub fn start(mut syst: SYST, core_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(core_hz / 1000 - 1);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();
        Self { _syst: syst }
    }

    /// Call from the SysTick exception handler, and nowhere else.
    pub fn on_tick() {
        TICKS.store(
            TICKS.load(Ordering::Relaxed).wrapping_add(1),
            Ordering::Relaxed,
        );
    }
}

impl Monotonic for SysTickClock {
    fn now(&self) -> u32 {
        TICKS.load(Ordering::Relaxed)
    }
}
