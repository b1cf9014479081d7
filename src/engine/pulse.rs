//! Tick driver - a periodic "check the schedule" pulse on its own thread.
//!
//! The pulse thread never touches scheduler state. It only pushes `Pulse`
//! messages; whoever owns the scheduler drains them and calls
//! `on_tick_pulse`. If the pulse thread dies, scheduling stalls silently.

use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Wall-clock interval between pulses
pub const PULSE_INTERVAL: Duration = Duration::from_millis(25);

const PULSE_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// Running count since the driver was spawned
    pub seq: u64,
}

pub struct TickDriver {
    active: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawn the pulse thread. It stays idle until activated.
    pub fn spawn(interval: Duration) -> std::io::Result<(Self, Consumer<Pulse>)> {
        let (tx, rx) = RingBuffer::<Pulse>::new(PULSE_QUEUE_SIZE);
        let active = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread = {
            let active = active.clone();
            let shutdown = shutdown.clone();
            thread::Builder::new()
                .name("beatgrid-pulse".into())
                .spawn(move || pulse_loop(tx, interval, active, shutdown))?
        };

        let driver = Self {
            active,
            shutdown,
            thread: Some(thread),
        };
        Ok((driver, rx))
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Switches the pulse source on and off from the scheduling side
pub trait PulseControl {
    fn activate(&self);
    fn deactivate(&self);
}

impl PulseControl for TickDriver {
    fn activate(&self) {
        self.active.store(true, Ordering::Release);
        if let Some(handle) = &self.thread {
            handle.thread().unpark();
        }
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Pulse switch for hosts that call `on_pulse` themselves (offline runs, tests)
#[derive(Debug, Clone, Default)]
pub struct ManualPulse {
    active: Arc<AtomicBool>,
}

impl ManualPulse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl PulseControl for ManualPulse {
    fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

fn pulse_loop(
    mut tx: Producer<Pulse>,
    interval: Duration,
    active: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) {
    let mut seq = 0u64;

    while !shutdown.load(Ordering::Acquire) {
        if !active.load(Ordering::Acquire) {
            thread::park();
            continue;
        }

        // A full queue means the consumer already has pulses waiting
        let _ = tx.push(Pulse { seq });
        seq += 1;

        thread::sleep(interval);
    }
}

/// Drain all pending pulses, returning how many arrived.
pub fn drain_pulses(rx: &mut Consumer<Pulse>) -> usize {
    let mut count = 0;
    while rx.pop().is_ok() {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn idle_until_activated() {
        let (driver, mut rx) = TickDriver::spawn(Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(20));

        assert_eq!(drain_pulses(&mut rx), 0);
        assert!(!driver.is_active());
    }

    #[test]
    fn emits_pulses_while_active() {
        let (driver, mut rx) = TickDriver::spawn(Duration::from_millis(1)).unwrap();
        driver.activate();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut received = 0;
        while received < 3 && Instant::now() < deadline {
            received += drain_pulses(&mut rx);
            thread::sleep(Duration::from_millis(2));
        }
        assert!(received >= 3, "expected pulses, got {received}");

        driver.deactivate();
        thread::sleep(Duration::from_millis(20));
        drain_pulses(&mut rx);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(drain_pulses(&mut rx), 0);
    }

    #[test]
    fn drop_joins_thread() {
        let (driver, _rx) = TickDriver::spawn(PULSE_INTERVAL).unwrap();
        driver.activate();
        drop(driver);
    }
}
