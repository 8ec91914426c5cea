use std::fmt;
use std::time::Instant;

use tracing::info;

/// Wall-clock timer for one run.
///
/// [`ScopedTimer::stop`] hands back the measurement; a timer dropped without
/// being stopped still emits its log line through `tracing`, so a scope guard
/// around the measured call is enough.
#[derive(Debug)]
pub struct ScopedTimer {
    message: String,
    started: Instant,
    stopped: bool,
}

impl ScopedTimer {
    pub fn start(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            started: Instant::now(),
            stopped: false,
        }
    }

    pub fn stop(mut self) -> TimedRun {
        self.stopped = true;
        let run = TimedRun {
            message: std::mem::take(&mut self.message),
            elapsed_usec: elapsed_usec(self.started),
        };
        info!(target: "oesbench::timer", "{}", run);
        run
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if !self.stopped {
            let run = TimedRun {
                message: std::mem::take(&mut self.message),
                elapsed_usec: elapsed_usec(self.started),
            };
            info!(target: "oesbench::timer", "{}", run);
        }
    }
}

fn elapsed_usec(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// One measured run: the argument echo plus the elapsed microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedRun {
    pub message: String,
    pub elapsed_usec: u64,
}

impl TimedRun {
    /// `<message> computed in <usec> usec`, the line the log parsers read back.
    pub fn log_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} computed in {} usec", self.message, self.elapsed_usec)
    }
}
