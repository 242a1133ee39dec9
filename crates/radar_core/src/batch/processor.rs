//! Runs many units through one [`Retimer`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::models::UnitDescriptor;
use crate::retime::{AudioTools, Retimer, UnitOutcome};

use super::summary::{BatchSummary, UnitReport};

/// Handle for stopping a running batch from another thread.
///
/// Units already being retimed run to completion; no new unit starts once
/// the handle has fired.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Processes a list of units, one after another or on a worker pool.
///
/// Every unit is independent: a failure is recorded and the batch moves on.
///
/// # Example
///
/// ```ignore
/// let processor = BatchProcessor::new(retimer, settings.retime.jobs);
/// let cancel = processor.cancel_handle();
/// ctrlc::set_handler(move || cancel.cancel())?;
///
/// let summary = processor.process(&units);
/// println!("{}", summary);
/// ```
pub struct BatchProcessor<T> {
    retimer: Retimer<T>,
    jobs: usize,
    cancelled: Arc<AtomicBool>,
}

impl<T: AudioTools> BatchProcessor<T> {
    /// `jobs` is the number of units retimed at once; values below 1 are
    /// treated as 1.
    pub fn new(retimer: Retimer<T>, jobs: usize) -> Self {
        Self {
            retimer,
            jobs: jobs.max(1),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn retimer(&self) -> &Retimer<T> {
        &self.retimer
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Retime every unit and collect the results in input order.
    pub fn process(&self, units: &[UnitDescriptor]) -> BatchSummary {
        tracing::info!(
            "Processing {} unit(s) with {} worker(s)",
            units.len(),
            self.jobs
        );

        let results = if self.jobs == 1 {
            self.run_sequential(units)
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .thread_name(|i| format!("radar-worker-{}", i))
                .build()
            {
                Ok(pool) => pool.install(|| {
                    units
                        .par_iter()
                        .map(|unit| self.run_one(unit))
                        .collect::<Vec<_>>()
                }),
                Err(e) => {
                    tracing::warn!("Could not start worker pool ({}), running sequentially", e);
                    self.run_sequential(units)
                }
            }
        };

        let mut summary = BatchSummary::new();
        let mut not_started = 0;
        for result in results {
            match result {
                Some(report) => summary.push(report),
                None => not_started += 1,
            }
        }
        summary.add_not_started(not_started);

        if not_started > 0 {
            tracing::warn!("Cancelled: {} unit(s) not started", not_started);
        }
        summary
    }

    fn run_sequential(&self, units: &[UnitDescriptor]) -> Vec<Option<UnitReport>> {
        units.iter().map(|unit| self.run_one(unit)).collect()
    }

    /// Retime one unit unless the batch has been cancelled.
    fn run_one(&self, unit: &UnitDescriptor) -> Option<UnitReport> {
        if self.is_cancelled() {
            return None;
        }

        let outcome = self.retimer.retime(unit);
        match &outcome {
            UnitOutcome::Success(_) => tracing::debug!("{}: done", unit.name),
            UnitOutcome::Skipped(reason) => tracing::info!("{}: skipped ({})", unit.name, reason),
            UnitOutcome::Failed(reason) => tracing::error!("{}: {}", unit.name, reason),
        }
        Some(UnitReport::new(&unit.name, outcome))
    }
}
