//! Rate-limited proxy restarts.
//!
//! # States
//! - Stopped: the start command has never been attempted
//! - Running: the start command was attempted at least once
//!
//! # Transitions
//! ```text
//! tick:    time += 1 → start if Stopped → restart if restart_required
//! restart: time < next_restart → Deferred (restart_required kept)
//!          otherwise next_restart = time + delay
//!                    → start if Stopped → reload
//!                    → success clears restart_required
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::lifecycle::CommandRunner;
use crate::resilience::backoff::restart_delay;

/// Virtual clock and restart bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartState {
    /// Number of ticks seen so far.
    pub time: u64,
    /// Earliest tick at which the next restart is admitted.
    pub next_restart: u64,
    /// Whether the start command has been attempted.
    pub has_started: bool,
    /// An accepted write is waiting for a successful reload.
    pub restart_required: bool,
}

/// What a call to [`RestartLimiter::restart`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// Rate limited; nothing was run.
    Deferred { until: u64 },
    /// The reload command succeeded.
    Reloaded,
    /// The reload command failed; the restart stays pending.
    ReloadFailed,
}

/// Gates start/reload of the proxy behind a minimum interval plus jitter.
#[derive(Debug)]
pub struct RestartLimiter {
    state: RestartState,
    interval: u64,
    jitter: f64,
    start_command: String,
    reload_command: String,
    rng: StdRng,
}

impl RestartLimiter {
    pub fn new(
        interval: u64,
        jitter: f64,
        start_command: impl Into<String>,
        reload_command: impl Into<String>,
    ) -> Self {
        Self {
            state: RestartState::default(),
            interval,
            jitter,
            start_command: start_command.into(),
            reload_command: reload_command.into(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the jitter source, for reproducible schedules.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &RestartState {
        &self.state
    }

    /// Mark that the proxy needs a reload to pick up a new document.
    pub fn request_restart(&mut self) {
        self.state.restart_required = true;
    }

    /// Advance the virtual clock by one tick.
    ///
    /// Starts the proxy if it was never started and retries a pending
    /// restart. Returns the restart outcome when one was attempted.
    pub fn tick<C: CommandRunner + ?Sized>(&mut self, runner: &C) -> Option<RestartOutcome> {
        self.state.time += 1;

        if !self.state.has_started {
            self.start(runner);
        }

        if self.state.restart_required {
            Some(self.restart(runner))
        } else {
            None
        }
    }

    /// Reload the proxy unless rate limited.
    pub fn restart<C: CommandRunner + ?Sized>(&mut self, runner: &C) -> RestartOutcome {
        if self.state.time < self.state.next_restart {
            tracing::info!(
                time = self.state.time,
                next_restart = self.state.next_restart,
                "Waiting to restart nginx"
            );
            return RestartOutcome::Deferred {
                until: self.state.next_restart,
            };
        }

        self.state.next_restart = self
            .state
            .time
            .saturating_add(restart_delay(self.interval, self.jitter, &mut self.rng));

        if !self.state.has_started {
            self.start(runner);
        }

        let outcome = runner.run(&self.reload_command);
        if !outcome.success {
            tracing::error!(
                command = %self.reload_command,
                output = %outcome.output,
                "Failed to reload nginx"
            );
            return RestartOutcome::ReloadFailed;
        }

        tracing::info!(next_restart = self.state.next_restart, "Restarted nginx");
        self.state.restart_required = false;
        RestartOutcome::Reloaded
    }

    /// Attempt to start the proxy.
    ///
    /// Failure usually means nginx is already running, so it is logged and
    /// the proxy counts as started either way.
    pub fn start<C: CommandRunner + ?Sized>(&mut self, runner: &C) {
        tracing::info!(
            command = %self.start_command,
            "Attempting to start nginx, this can fail if nginx is already running"
        );

        let outcome = runner.run(&self.start_command);
        if !outcome.success {
            tracing::warn!(output = %outcome.output, "Error in nginx start");
        }
        self.state.has_started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CommandOutcome;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct ScriptedRunner {
        calls: RefCell<Vec<String>>,
        failing: RefCell<HashSet<String>>,
    }

    impl ScriptedRunner {
        fn fail(&self, command: &str) {
            self.failing.borrow_mut().insert(command.to_string());
        }

        fn succeed(&self, command: &str) {
            self.failing.borrow_mut().remove(command);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &str) -> CommandOutcome {
            self.calls.borrow_mut().push(command.to_string());
            if self.failing.borrow().contains(command) {
                CommandOutcome::failure("boom")
            } else {
                CommandOutcome::success("")
            }
        }
    }

    fn limiter() -> RestartLimiter {
        RestartLimiter::new(2, 0.0, "start", "reload").with_rng(StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_first_restart_starts_then_reloads() {
        let runner = ScriptedRunner::default();
        let mut limiter = limiter();
        limiter.request_restart();

        assert_eq!(limiter.restart(&runner), RestartOutcome::Reloaded);
        assert_eq!(runner.calls(), vec!["start", "reload"]);
        assert_eq!(
            *limiter.state(),
            RestartState {
                time: 0,
                next_restart: 2,
                has_started: true,
                restart_required: false,
            }
        );
    }

    #[test]
    fn test_restart_before_next_is_deferred() {
        let runner = ScriptedRunner::default();
        let mut limiter = limiter();
        limiter.restart(&runner);

        limiter.request_restart();
        assert_eq!(limiter.restart(&runner), RestartOutcome::Deferred { until: 2 });
        assert_eq!(runner.calls(), vec!["start", "reload"]);
        assert!(limiter.state().restart_required);

        // time 1: still limited
        assert_eq!(limiter.tick(&runner), Some(RestartOutcome::Deferred { until: 2 }));
        // time 2: admitted
        assert_eq!(limiter.tick(&runner), Some(RestartOutcome::Reloaded));
        assert_eq!(runner.calls(), vec!["start", "reload", "reload"]);
        assert_eq!(limiter.state().next_restart, 4);
        assert!(!limiter.state().restart_required);
    }

    #[test]
    fn test_tick_starts_once() {
        let runner = ScriptedRunner::default();
        runner.fail("start");
        let mut limiter = limiter();

        assert_eq!(limiter.tick(&runner), None);
        assert_eq!(limiter.tick(&runner), None);
        assert_eq!(runner.calls(), vec!["start"]);
        assert!(limiter.state().has_started);
        assert_eq!(limiter.state().time, 2);
    }

    #[test]
    fn test_failed_reload_stays_pending() {
        let runner = ScriptedRunner::default();
        runner.fail("reload");
        let mut limiter = limiter();
        limiter.request_restart();

        assert_eq!(limiter.restart(&runner), RestartOutcome::ReloadFailed);
        assert!(limiter.state().restart_required);
        assert_eq!(limiter.state().next_restart, 2);

        runner.succeed("reload");
        assert_eq!(limiter.tick(&runner), Some(RestartOutcome::Deferred { until: 2 }));
        assert_eq!(limiter.tick(&runner), Some(RestartOutcome::Reloaded));
        assert!(!limiter.state().restart_required);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let runner = ScriptedRunner::default();
        let mut limiter = RestartLimiter::new(u64::MAX, 4.0, "start", "reload")
            .with_rng(StdRng::seed_from_u64(5));

        assert_eq!(limiter.tick(&runner), None);
        assert_eq!(limiter.restart(&runner), RestartOutcome::Reloaded);
        assert_eq!(limiter.state().next_restart, u64::MAX);

        limiter.request_restart();
        assert_eq!(
            limiter.tick(&runner),
            Some(RestartOutcome::Deferred { until: u64::MAX })
        );
    }

    #[test]
    fn test_jitter_extends_interval() {
        let runner = ScriptedRunner::default();
        let mut limiter =
            RestartLimiter::new(10, 1.0, "start", "reload").with_rng(StdRng::seed_from_u64(3));
        limiter.restart(&runner);

        let next = limiter.state().next_restart;
        assert!((10..=20).contains(&next), "next_restart {next}");
    }
}
