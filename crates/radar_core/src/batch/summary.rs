//! Per-unit results collected over a batch.

use std::fmt;

use crate::retime::UnitOutcome;

/// Outcome of one unit in a batch.
#[derive(Debug, Clone)]
pub struct UnitReport {
    /// Unit display name.
    pub name: String,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    pub fn new(name: impl Into<String>, outcome: UnitOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Results of a whole batch, in submission order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    reports: Vec<UnitReport>,
    /// Units never started because the batch was cancelled.
    not_started: usize,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, outcome: UnitOutcome) {
        self.reports.push(UnitReport::new(name, outcome));
    }

    pub(crate) fn push(&mut self, report: UnitReport) {
        self.reports.push(report);
    }

    pub(crate) fn add_not_started(&mut self, count: usize) {
        self.not_started += count;
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchSummary) {
        self.reports.extend(other.reports);
        self.not_started += other.not_started;
    }

    pub fn reports(&self) -> &[UnitReport] {
        &self.reports
    }

    pub fn succeeded(&self) -> usize {
        self.count(UnitOutcome::is_success)
    }

    pub fn skipped(&self) -> usize {
        self.count(UnitOutcome::is_skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(UnitOutcome::is_failed)
    }

    pub fn not_started(&self) -> usize {
        self.not_started
    }

    pub fn total(&self) -> usize {
        self.reports.len() + self.not_started
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: fn(&UnitOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            match &report.outcome {
                UnitOutcome::Success(r) => writeln!(
                    f,
                    "  {:<12} success  {} correction(s) -> {}",
                    report.name,
                    r.applied.len(),
                    r.dest_path.display()
                )?,
                UnitOutcome::Skipped(reason) => {
                    writeln!(f, "  {:<12} skipped  {}", report.name, reason)?
                }
                UnitOutcome::Failed(reason) => {
                    writeln!(f, "  {:<12} FAILED   {}", report.name, reason)?
                }
            }
        }
        write!(
            f,
            "{} succeeded, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )?;
        if self.not_started > 0 {
            write!(f, ", {} not started (cancelled)", self.not_started)?;
        }
        Ok(())
    }
}
