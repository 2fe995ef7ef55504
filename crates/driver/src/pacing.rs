use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info};

use crate::driver::{Driver, RenderHost};

/// Creates a linked stop handle and token.
///
/// Dropping every handle does not cancel the loop; only [`StopHandle::stop`] does.
pub fn stop_signal() -> (StopHandle, StopToken) {
    let (tx, rx) = bounded(1);
    (
        StopHandle { tx },
        StopToken {
            rx,
            stopped: Cell::new(false),
        },
    )
}

#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    /// Requests cancellation. Safe to call more than once and from any thread.
    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

#[derive(Debug)]
pub struct StopToken {
    rx: Receiver<()>,
    stopped: Cell<bool>,
}

impl StopToken {
    /// A token no handle can ever trip.
    pub fn never() -> Self {
        Self {
            rx: crossbeam_channel::never(),
            stopped: Cell::new(false),
        }
    }

    pub fn is_stopped(&self) -> bool {
        if self.stopped.get() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(()) => {
                self.stopped.set(true);
                true
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }

    /// Sleeps for up to `timeout`, returning early with `true` if a stop
    /// arrives in the meantime.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) => {
                self.stopped.set(true);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextFrame {
    Ready,
    Stopped,
}

/// Decides when the next tick may run.
pub trait FramePacer {
    fn next_frame(&mut self, stop: &StopToken) -> NextFrame;
}

/// Ticks back to back, as fast as the host renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl FramePacer for Immediate {
    fn next_frame(&mut self, stop: &StopToken) -> NextFrame {
        if stop.is_stopped() {
            NextFrame::Stopped
        } else {
            NextFrame::Ready
        }
    }
}

/// Paces ticks to a fixed interval. The first frame is ready immediately and
/// late frames are not made up with a burst.
#[derive(Debug, Clone)]
pub struct IntervalPacer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl IntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }
}

impl FramePacer for IntervalPacer {
    fn next_frame(&mut self, stop: &StopToken) -> NextFrame {
        if stop.is_stopped() {
            return NextFrame::Stopped;
        }
        let now = Instant::now();
        let target = self.deadline.unwrap_or(now);
        if target > now && stop.wait(target - now) {
            return NextFrame::Stopped;
        }
        self.deadline = Some((target + self.interval).max(Instant::now()));
        NextFrame::Ready
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    FrameLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub reason: StopReason,
    /// Every clock's `t` when the loop ended, in declaration order.
    pub clocks: Vec<(String, f64)>,
}

/// Runs the self-rescheduling frame loop until `stop` trips or `max_frames`
/// frames were rendered. A host error ends the loop and is returned.
pub fn run<H, P>(
    driver: &mut Driver,
    host: &mut H,
    pacer: &mut P,
    stop: &StopToken,
    max_frames: Option<u64>,
) -> Result<RunSummary>
where
    H: RenderHost + ?Sized,
    P: FramePacer + ?Sized,
{
    info!(max_frames = ?max_frames, "render loop started");
    let started = Instant::now();
    let mut frames = 0u64;
    let reason = loop {
        if max_frames.is_some_and(|limit| frames >= limit) {
            break StopReason::FrameLimit;
        }
        if pacer.next_frame(stop) == NextFrame::Stopped {
            break StopReason::Cancelled;
        }
        driver.tick(host)?;
        frames += 1;
        if frames % 600 == 0 {
            debug!(frames, elapsed = ?started.elapsed(), "render loop heartbeat");
        }
    };
    info!(frames, ?reason, elapsed = ?started.elapsed(), "render loop stopped");
    let clocks = driver
        .clocks()
        .iter()
        .map(|(name, clock)| (name.to_string(), clock.t()))
        .collect();
    Ok(RunSummary {
        frames,
        reason,
        clocks,
    })
}
