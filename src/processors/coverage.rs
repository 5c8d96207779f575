use crate::error::Result;
use crate::processors::day_deduplicator::DeduplicationIndex;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Calendar coverage of a deduplicated granule set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub present_days: usize,
    pub missing_days: Vec<NaiveDate>,
}

impl CoverageReport {
    /// Days between the first and last day, inclusive
    pub fn span_days(&self) -> usize {
        match (self.first_day, self.last_day) {
            (Some(first), Some(last)) => (last - first).num_days() as usize + 1,
            _ => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_days.is_empty()
    }
}

/// Finds calendar days with no granule between the earliest and latest day.
pub struct CoverageChecker;

impl CoverageChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, index: &DeduplicationIndex) -> Result<CoverageReport> {
        let days = index
            .iter()
            .map(|s| s.day.date())
            .collect::<Result<BTreeSet<NaiveDate>>>()?;

        let (first, last) = match (days.first(), days.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Ok(CoverageReport::default()),
        };

        let missing_days = first
            .iter_days()
            .take_while(|d| *d <= last)
            .filter(|d| !days.contains(d))
            .collect();

        Ok(CoverageReport {
            first_day: Some(first),
            last_day: Some(last),
            present_days: days.len(),
            missing_days,
        })
    }

    /// Human-readable report, like the other CLI summaries
    pub fn generate_summary(&self, report: &CoverageReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Coverage Report ===\n");
        match (report.first_day, report.last_day) {
            (Some(first), Some(last)) => {
                summary.push_str(&format!("Period: {} to {}\n", first, last));
                summary.push_str(&format!(
                    "Days with data: {} of {} ({:.1}%)\n",
                    report.present_days,
                    report.span_days(),
                    100.0 * report.present_days as f64 / report.span_days() as f64
                ));
            }
            _ => summary.push_str("No granules selected\n"),
        }

        if !report.missing_days.is_empty() {
            summary.push_str(&format!("\nMissing Days: {}\n", report.missing_days.len()));
            for day in report.missing_days.iter().take(10) {
                summary.push_str(&format!("  - {}\n", day));
            }
            if report.missing_days.len() > 10 {
                summary.push_str(&format!("  ... and {} more\n", report.missing_days.len() - 10));
            }
        }

        summary
    }
}

impl Default for CoverageChecker {
    fn default() -> Self {
        Self::new()
    }
}
