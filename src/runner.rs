//! Paced, cancellable execution of many generations.

use crate::{Automaton, AutomatonHistory, Error, Result};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How many generations to run and how fast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub generations: usize,
    /// Target rate. Must be positive and finite.
    pub iterations_per_second: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            generations: 100,
            iterations_per_second: 10.0,
        }
    }
}

impl RunnerConfig {
    /// Time allotted to a single iteration.
    pub fn budget(&self) -> Result<Duration> {
        let rate = self.iterations_per_second;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::InvalidRate(rate));
        }
        Ok(Duration::from_secs_f64(1.0 / rate))
    }
}

/// Requests a running [`AutomatonRunner`] to stop after the generation in progress.
///
/// Cheap to clone and safe to use from any thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What happened during a [`AutomatonRunner::launch`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Generations computed.
    pub generations: usize,
    /// Iterations that used up their whole time budget.
    pub overruns: usize,
}

/// Drives an automaton for a number of generations at a target rate.
///
/// `launch` sleeps between generations, so it belongs on a worker thread. Stopping is
/// cooperative and only checked between generations.
#[derive(Debug)]
pub struct AutomatonRunner {
    config: RunnerConfig,
    history: Option<AutomatonHistory>,
    stop: StopHandle,
}

impl AutomatonRunner {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.budget()?;
        Ok(AutomatonRunner {
            config,
            history: None,
            stop: StopHandle::default(),
        })
    }

    /// Record every generation into `history`.
    pub fn with_history(mut self, history: AutomatonHistory) -> Self {
        self.history = Some(history);
        self
    }

    #[inline]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    #[inline]
    pub fn history(&self) -> Option<&AutomatonHistory> {
        self.history.as_ref()
    }

    #[inline]
    pub fn history_mut(&mut self) -> Option<&mut AutomatonHistory> {
        self.history.as_mut()
    }

    pub fn take_history(&mut self) -> Option<AutomatonHistory> {
        self.history.take()
    }

    /// A handle that can stop this runner from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Run the configured number of generations, calling `callback` after each one.
    ///
    /// With a history, the grid before the first generation is recorded if the history is
    /// empty, then every new generation is appended. A full history aborts the run.
    pub fn launch<F>(&mut self, automaton: &mut Automaton, mut callback: F) -> Result<RunReport>
    where
        F: FnMut(&Automaton),
    {
        let budget = self.config.budget()?;
        self.stop.reset();
        let mut report = RunReport::default();
        debug!(
            "launching {} generations at {} per second",
            self.config.generations, self.config.iterations_per_second
        );
        while !self.stop.is_stopped() && report.generations < self.config.generations {
            let started = Instant::now();
            if let Some(history) = self.history.as_mut() {
                if history.is_empty() {
                    history.append_automaton_state(automaton)?;
                }
            }

            automaton.apply_rule();
            if let Some(history) = self.history.as_mut() {
                history.append_automaton_state(automaton)?;
            }
            callback(automaton);

            let elapsed = started.elapsed();
            match budget.checked_sub(elapsed) {
                Some(rest) if rest > Duration::from_secs(0) => thread::sleep(rest),
                _ => {
                    warn!("Iteration took too long: {:?}", elapsed);
                    report.overruns += 1;
                }
            }
            report.generations += 1;
        }
        debug!("runner finished: {:?}", report);
        Ok(report)
    }

    /// [`launch`](Self::launch) without a callback.
    pub fn run(&mut self, automaton: &mut Automaton) -> Result<RunReport> {
        self.launch(automaton, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, State};
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn counting(length: usize, width: usize) -> (Automaton, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let state = State::new("state", "#000");
        let mut automaton = Automaton::new(&[length, width], Some(state.clone()));
        automaton.set_states(vec![state]);
        automaton.set_rule(move |a: &Automaton, c: &[usize]| -> Cell {
            counter.fetch_add(1, Ordering::SeqCst);
            a.cell(c).cloned()
        });
        (automaton, calls)
    }

    #[test]
    fn config_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.generations, 100);
        assert_eq!(config.budget().unwrap(), Duration::from_millis(100));
        let parsed: RunnerConfig = serde_json::from_str(r#"{"generations": 6}"#).unwrap();
        assert_eq!(parsed.generations, 6);
        assert_eq!(parsed.iterations_per_second, 10.0);
    }

    #[test]
    fn rejects_bad_rates() {
        for &rate in &[0.0, -1.0, f64::INFINITY, f64::NAN] {
            let config = RunnerConfig {
                generations: 1,
                iterations_per_second: rate,
            };
            assert!(matches!(
                AutomatonRunner::new(config),
                Err(Error::InvalidRate(_))
            ));
        }
    }

    #[test]
    fn launch_paces_generations() {
        let (mut automaton, calls) = counting(2, 3);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 6,
            iterations_per_second: 12.0,
        })
        .unwrap();
        let mut callbacks = 0;
        let started = Instant::now();
        let report = runner.launch(&mut automaton, |_| callbacks += 1).unwrap();
        let total = started.elapsed();

        assert_eq!(calls.load(Ordering::SeqCst), 36);
        assert_eq!(callbacks, 6);
        assert_eq!(report.generations, 6);
        assert!(total >= Duration::from_millis(490), "{:?}", total);
        assert!(total < Duration::from_millis(1500), "{:?}", total);
    }

    #[test]
    fn launch_reports_overruns() {
        let (mut automaton, calls) = counting(2, 3);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 5,
            iterations_per_second: 100.0,
        })
        .unwrap();
        let started = Instant::now();
        let report = runner
            .launch(&mut automaton, |_| thread::sleep(Duration::from_millis(100)))
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 30);
        assert_eq!(report, RunReport { generations: 5, overruns: 5 });
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn records_history() {
        let (mut automaton, _) = counting(2, 2);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 3,
            iterations_per_second: 1000.0,
        })
        .unwrap()
        .with_history(AutomatonHistory::new(10));
        runner.run(&mut automaton).unwrap();
        let history = runner.take_history().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.current_index(), Some(3));
    }

    #[test]
    fn full_history_aborts() {
        let (mut automaton, _) = counting(2, 2);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 5,
            iterations_per_second: 1000.0,
        })
        .unwrap()
        .with_history(AutomatonHistory::new(2));
        assert!(matches!(
            runner.run(&mut automaton),
            Err(Error::HistoryFull { capacity: 2 })
        ));
        assert_eq!(runner.history().map(AutomatonHistory::len), Some(2));
    }

    #[test]
    fn stops_between_generations() {
        let (mut automaton, _) = counting(2, 2);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 100,
            iterations_per_second: 1000.0,
        })
        .unwrap();
        let handle = runner.stop_handle();
        let mut seen = 0;
        let report = runner
            .launch(&mut automaton, |_| {
                seen += 1;
                if seen == 3 {
                    handle.stop();
                }
            })
            .unwrap();
        assert_eq!(report.generations, 3);
    }

    #[test]
    fn stops_from_another_thread() {
        let (mut automaton, _) = counting(4, 4);
        let mut runner = AutomatonRunner::new(RunnerConfig {
            generations: 10_000,
            iterations_per_second: 100.0,
        })
        .unwrap();
        let handle = runner.stop_handle();
        let (started, running) = mpsc::channel();
        let worker = thread::spawn(move || {
            runner.launch(&mut automaton, |_| {
                let _ = started.send(());
            })
        });
        running.recv().unwrap();
        handle.stop();
        let report = worker.join().unwrap().unwrap();
        assert!(report.generations < 10_000);
    }
}
