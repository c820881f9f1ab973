use chrono::{DateTime, Utc};

/// Counters for one bulk run, summed over all attempts.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub attempts: u32,
    pub pages: u32,
    /// Issues returned by the listing, including re-reads of a page.
    pub fetched: usize,
    /// Distinct issues left alone by the filter.
    pub skipped: usize,
    pub updated: usize,
    /// Distinct issues whose update failed and never succeeded on a retry.
    pub failed: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn start(dry_run: bool) -> Self {
        Self {
            attempts: 0,
            pages: 0,
            fetched: 0,
            skipped: 0,
            updated: 0,
            failed: 0,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
