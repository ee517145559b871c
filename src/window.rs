//! Time window selection and stable time ordering
//!
//! Records are buffered with their timestamps, filtered against inclusive
//! bounds as they arrive, and ordered once the input is exhausted. Sorting
//! is stable in both directions: contacts sharing a timestamp keep their
//! input order.

use crate::policy::ErrorPolicy;
use crate::record::Record;
use crate::timestamp::{extract_timestamp, TimestampError};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("start time {start} is after end time {end}")]
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("record {index}: {source}")]
    Timestamp {
        index: usize,
        #[source]
        source: TimestampError,
    },
}

/// Inclusive time range; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window admitting every timestamp
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a window, rejecting a start bound later than the end bound
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, WindowError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(WindowError::StartAfterEnd { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }
}

/// Output order of the selected records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    Descending,
    /// Input order
    Unordered,
}

impl SortOrder {
    /// Order implied by the `-r` (reverse) and `-n` (no sorting) flags
    pub fn from_flags(reverse: bool, no_sort: bool) -> Self {
        match (no_sort, reverse) {
            (true, _) => SortOrder::Unordered,
            (false, true) => SortOrder::Descending,
            (false, false) => SortOrder::Ascending,
        }
    }
}

/// Buffering window filter for one pass
#[derive(Debug)]
pub struct WindowSorter {
    window: TimeWindow,
    policy: ErrorPolicy,
    selected: Vec<(DateTime<Utc>, Record)>,
    seen: usize,
    rejected: usize,
}

impl WindowSorter {
    pub fn new(window: TimeWindow, policy: ErrorPolicy) -> Self {
        Self {
            window,
            policy,
            selected: Vec::new(),
            seen: 0,
            rejected: 0,
        }
    }

    /// Offer one record; returns whether it was kept
    pub fn push(&mut self, record: Record) -> Result<bool, WindowError> {
        self.seen += 1;
        let index = self.seen;
        let result = extract_timestamp(&record)
            .map_err(|source| WindowError::Timestamp { index, source });

        let Some(ts) = self.policy.handle(result, "time ordering")? else {
            self.rejected += 1;
            return Ok(false);
        };
        if !self.window.contains(ts) {
            return Ok(false);
        }
        self.selected.push((ts, record));
        Ok(true)
    }

    /// Records that failed timestamp extraction and were skipped
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Selected records in the requested order
    pub fn finish(mut self, order: SortOrder) -> Vec<Record> {
        match order {
            SortOrder::Unordered => {}
            // sort_by is stable, so equal timestamps keep input order
            SortOrder::Ascending => self.selected.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::Descending => self.selected.sort_by(|a, b| b.0.cmp(&a.0)),
        }
        tracing::debug!(
            seen = self.seen,
            selected = self.selected.len(),
            rejected = self.rejected,
            "time window applied"
        );
        self.selected.into_iter().map(|(_, record)| record).collect()
    }
}

/// Filter records by `window` and order them
pub fn select_and_order<I>(
    records: I,
    window: TimeWindow,
    order: SortOrder,
    policy: ErrorPolicy,
) -> Result<Vec<Record>, WindowError>
where
    I: IntoIterator<Item = Record>,
{
    let mut sorter = WindowSorter::new(window, policy);
    for record in records {
        sorter.push(record)?;
    }
    Ok(sorter.finish(order))
}
