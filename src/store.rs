//! Record store traits
//!
//! Every tool pulls records through [`RecordSource`] and pushes results
//! through [`RecordSink`]. The ADI codec implements both; the in-memory
//! variants back the unit tests and library callers that already hold
//! records.

use crate::adi::AdiError;
use crate::record::Record;

/// Sequential record reader
pub trait RecordSource {
    /// Next record, `Ok(None)` at end of stream
    fn read_record(&mut self) -> Result<Option<Record>, AdiError>;

    /// Number of records handed out so far
    fn record_count(&self) -> usize;

    /// Iterate until end of stream or the first error
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records {
            source: self,
            done: false,
        }
    }
}

/// Iterator returned by [`RecordSource::records`]
pub struct Records<'a, S: RecordSource> {
    source: &'a mut S,
    done: bool,
}

impl<S: RecordSource> Iterator for Records<'_, S> {
    type Item = Result<Record, AdiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Sequential record writer
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), AdiError>;

    /// Push everything written so far to the underlying stream
    fn flush(&mut self) -> Result<(), AdiError>;
}

/// Source over records already in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    records: std::collections::VecDeque<Record>,
    count: usize,
}

impl MemorySource {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().collect(),
            count: 0,
        }
    }
}

impl RecordSource for MemorySource {
    fn read_record(&mut self) -> Result<Option<Record>, AdiError> {
        let next = self.records.pop_front();
        if next.is_some() {
            self.count += 1;
        }
        Ok(next)
    }

    fn record_count(&self) -> usize {
        self.count
    }
}

/// Sink collecting records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Record>,
    pub flushed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, record: &Record) -> Result<(), AdiError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AdiError> {
        self.flushed = true;
        Ok(())
    }
}
