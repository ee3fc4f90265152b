//! Timing of the recurring frames.

use std::time::Duration;

use web_time::Instant;

use crate::error::{Error, Result};

/// Whether frames are drawn on a timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum FrameLoop {
    /// Frames are only drawn when requested.
    #[default]
    Idle,
    /// A frame is drawn every time the deadline passes.
    Running {
        /// Time between the end of a frame and the start of the next.
        interval: Duration,
        /// Deadline of the only scheduled frame.
        next_tick: Instant,
    },
}

impl FrameLoop {
    /// Start the timer, the first tick is due after the interval.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] when the timer is already started.
    pub(crate) fn start(&mut self, interval: Duration, now: Instant) -> Result<()> {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        *self = Self::Running {
            interval,
            next_tick: now + interval,
        };

        Ok(())
    }

    /// Cancel the scheduled tick.
    ///
    /// # Errors
    ///
    /// - [`Error::NotRunning`] when the timer is not started.
    pub(crate) fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            return Err(Error::NotRunning);
        }

        *self = Self::Idle;

        Ok(())
    }

    /// Whether the timer is started.
    pub(crate) const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Deadline of the next frame, `None` when idle.
    pub(crate) const fn next_tick(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Running { next_tick, .. } => Some(*next_tick),
        }
    }

    /// Whether a frame must be drawn now.
    pub(crate) fn is_due(&self, now: Instant) -> bool {
        self.next_tick().is_some_and(|next_tick| now >= next_tick)
    }

    /// Schedule the next tick an interval after the frame work finished.
    ///
    /// Does nothing when idle, so a loop stopped during the frame stays stopped.
    pub(crate) fn reschedule(&mut self, finished: Instant) {
        if let Self::Running {
            interval,
            next_tick,
        } = self
        {
            *next_tick = finished + *interval;
        }
    }
}

/// Time elapsed between frames.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameTimer {
    /// When the previous frame started, `None` before the first frame.
    last_frame: Option<Instant>,
}

impl FrameTimer {
    /// Mark the start of a frame and get the seconds since the previous one.
    ///
    /// The first frame has a delta of zero, the delta is never negative.
    pub(crate) fn delta(&mut self, now: Instant) -> f32 {
        let delta = self
            .last_frame
            .map_or(0.0, |last_frame| {
                now.saturating_duration_since(last_frame).as_secs_f32()
            });

        self.last_frame = Some(now);

        delta
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use web_time::Instant;

    use super::{FrameLoop, FrameTimer};
    use crate::error::Error;

    #[test]
    fn start_twice_fails() {
        let mut frame_loop = FrameLoop::default();
        let now = Instant::now();

        frame_loop.start(Duration::from_millis(100), now).unwrap();

        assert!(matches!(
            frame_loop.start(Duration::from_millis(100), now),
            Err(Error::AlreadyRunning)
        ));
    }

    #[test]
    fn stop_idle_fails() {
        let mut frame_loop = FrameLoop::default();

        assert!(matches!(frame_loop.stop(), Err(Error::NotRunning)));

        frame_loop.start(Duration::from_millis(10), Instant::now()).unwrap();
        frame_loop.stop().unwrap();
        assert!(matches!(frame_loop.stop(), Err(Error::NotRunning)));
        assert_eq!(frame_loop.next_tick(), None);
    }

    #[test]
    fn reschedule_after_work() {
        let mut frame_loop = FrameLoop::default();
        let start = Instant::now();
        let interval = Duration::from_millis(100);

        frame_loop.start(interval, start).unwrap();
        assert!(!frame_loop.is_due(start));
        assert!(frame_loop.is_due(start + interval));

        // The frame took 30ms, which is added to the next deadline
        let finished = start + interval + Duration::from_millis(30);
        frame_loop.reschedule(finished);
        assert_eq!(frame_loop.next_tick(), Some(finished + interval));
    }

    #[test]
    fn reschedule_idle_stays_idle() {
        let mut frame_loop = FrameLoop::default();

        frame_loop.reschedule(Instant::now());

        assert_eq!(frame_loop, FrameLoop::Idle);
    }

    #[test]
    fn first_delta_is_zero() {
        let mut timer = FrameTimer::default();
        let start = Instant::now();

        assert!(timer.delta(start).abs() < f32::EPSILON);
        assert!((timer.delta(start + Duration::from_millis(250)) - 0.25).abs() < 1e-6);

        // Going back in time never results in a negative delta
        assert!(timer.delta(start).abs() < f32::EPSILON);
    }
}
