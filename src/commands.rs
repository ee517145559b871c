//! Tool runners behind the subcommands
//!
//! Each runner pulls records from a [`RecordSource`] and writes to a
//! [`RecordSink`] or a plain writer, so the same code serves the binary and
//! the tests. [`run`] resolves configuration, validates arguments, and only
//! then opens the streams: a configuration error never creates an output
//! file.

use crate::adi::AdiReader;
use crate::adi::AdiWriter;
use crate::ascii::mask_non_ascii;
use crate::cabrillo::CabrilloQso;
use crate::cli::{Cli, Command, OutputFormat};
use crate::clublog::ClublogTable;
use crate::config::{PolicyTool, ToolConfig};
use crate::csv_output::CsvOutput;
use crate::cty::CtyDatabase;
use crate::dedupe::DedupeReader;
use crate::enrich::{enrich_record, enrich_record_at, CallsignLookup, TimedCallsignLookup};
use crate::filter::FieldFilter;
use crate::io::{open_input, open_output};
use crate::policy::ErrorPolicy;
use crate::record::Record;
use crate::stats::{StatQuery, StatsAggregator};
use crate::store::{MemorySource, RecordSink, RecordSource};
use crate::timestamp::{extract_timestamp, parse_bound};
use crate::window::{SortOrder, TimeWindow, WindowSorter};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Run `step` over every record, writing what it returns
///
/// The sink is flushed even when the pass stops on an error, so records
/// written before the failure stay in the output.
fn pump<S, K, F>(source: &mut S, sink: &mut K, mut step: F) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
    F: FnMut(Record) -> Result<Option<Record>>,
{
    let mut written = 0;
    let result = pump_records(source, sink, &mut step, &mut written);
    let flushed = sink.flush().context("Failed to flush output");
    result?;
    flushed?;
    Ok(written)
}

fn pump_records<S, K, F>(source: &mut S, sink: &mut K, step: &mut F, written: &mut usize) -> Result<()>
where
    S: RecordSource,
    K: RecordSink,
    F: FnMut(Record) -> Result<Option<Record>>,
{
    while let Some(record) = source.read_record()? {
        if let Some(record) = step(record)? {
            sink.write_record(&record)?;
            *written += 1;
        }
    }
    Ok(())
}

/// Copy records unchanged
pub fn copy_records<S: RecordSource, K: RecordSink>(source: &mut S, sink: &mut K) -> Result<usize> {
    pump(source, sink, |record| Ok(Some(record)))
}

/// Remove the named fields from every record
pub fn delete_fields<S, K>(source: &mut S, sink: &mut K, fields: &[String]) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
{
    pump(source, sink, |mut record| {
        for field in fields {
            record.delete(field);
        }
        Ok(Some(record))
    })
}

/// Keep the records selected by `filter`
pub fn grep_records<S, K>(source: &mut S, sink: &mut K, filter: &FieldFilter) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
{
    pump(source, sink, |record| Ok(filter.selects(&record).then_some(record)))
}

/// Write the named fields of every record as CSV rows
pub fn write_csv<S: RecordSource, W: Write>(source: &mut S, out: W, fields: &[String]) -> Result<usize> {
    let mut csv = CsvOutput::new(out, fields);
    let result = (|| -> Result<()> {
        while let Some(record) = source.read_record()? {
            csv.write_record(&record)?;
        }
        Ok(())
    })();
    let flushed = csv.flush().context("Failed to flush output");
    result?;
    flushed?;
    Ok(csv.rows())
}

/// Write one Cabrillo `QSO:` line per usable record
pub fn write_cabrillo<S: RecordSource, W: Write>(
    source: &mut S,
    mut out: W,
    policy: ErrorPolicy,
) -> Result<usize> {
    let mut lines = 0;
    let result = (|| -> Result<()> {
        while let Some(record) = source.read_record()? {
            let index = source.record_count();
            let context = format!("record {}", index);
            if let Some(qso) = policy
                .handle(CabrilloQso::from_record(&record), &context)
                .with_context(|| format!("Cabrillo conversion failed at record {}", index))?
            {
                writeln!(out, "{}", qso.to_line())?;
                lines += 1;
            }
        }
        Ok(())
    })();
    let flushed = out.flush().context("Failed to flush output");
    result?;
    flushed?;
    Ok(lines)
}

/// Required `call` of a record, under `policy`
fn required_call(record: &Record, policy: ErrorPolicy, index: usize) -> Result<Option<String>> {
    let context = format!("record {}", index);
    Ok(policy
        .handle(record.require("call"), &context)
        .with_context(|| format!("Record {} has no callsign", index))?
        .map(str::to_string))
}

/// Fill entity fields from a callsign lookup
pub fn enrich_records<S, K, L>(
    source: &mut S,
    sink: &mut K,
    lookup: &L,
    policy: ErrorPolicy,
) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
    L: CallsignLookup,
{
    let mut index = 0;
    pump(source, sink, |mut record| {
        index += 1;
        let Some(call) = required_call(&record, policy, index)? else {
            return Ok(None);
        };
        let written = enrich_record(&mut record, &call, lookup);
        tracing::trace!(index, call = %call, fields = ?written, "enriched");
        Ok(Some(record))
    })
}

/// Fill entity fields from a time-keyed lookup
pub fn enrich_records_at<S, K, L>(
    source: &mut S,
    sink: &mut K,
    lookup: &L,
    policy: ErrorPolicy,
) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
    L: TimedCallsignLookup,
{
    let mut index = 0;
    pump(source, sink, |mut record| {
        index += 1;
        // No call is always a skip here; the policy governs the timestamp
        let Some(call) = required_call(&record, ErrorPolicy::Skip, index)? else {
            return Ok(None);
        };
        let context = format!("record {}", index);
        let Some(at) = policy
            .handle(extract_timestamp(&record), &context)
            .with_context(|| format!("Record {} has no usable timestamp", index))?
        else {
            return Ok(None);
        };
        let written = enrich_record_at(&mut record, &call, at, lookup);
        tracing::trace!(index, call = %call, fields = ?written, "enriched");
        Ok(Some(record))
    })
}

/// Aggregate the whole input
pub fn aggregate<S: RecordSource>(source: &mut S) -> Result<StatsAggregator> {
    let mut stats = StatsAggregator::new();
    while let Some(record) = source.read_record()? {
        stats.record(&record);
    }
    Ok(stats)
}

/// Render one statistics query
pub fn write_stats<W: Write>(
    stats: &StatsAggregator,
    mut out: W,
    query: StatQuery,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => out.write_all(stats.render_text(query).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &stats.render_json(query))?;
            writeln!(out)?;
        }
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}

/// Window from RFC 3339 bounds; a start after the end is an error
pub fn parse_window(start: Option<&str>, end: Option<&str>) -> Result<TimeWindow> {
    let bound = |name: &str, value: Option<&str>| -> Result<Option<DateTime<Utc>>> {
        value
            .map(|v| {
                parse_bound(v).with_context(|| format!("Invalid {} {:?} (expected RFC 3339)", name, v))
            })
            .transpose()
    };
    let window = TimeWindow::new(bound("starttime", start)?, bound("endtime", end)?)?;
    Ok(window)
}

/// Select records inside `window` and write them in `order`
pub fn time_order<S, K>(
    source: &mut S,
    sink: &mut K,
    window: TimeWindow,
    order: SortOrder,
    policy: ErrorPolicy,
) -> Result<usize>
where
    S: RecordSource,
    K: RecordSink,
{
    let mut sorter = WindowSorter::new(window, policy);
    while let Some(record) = source.read_record()? {
        sorter.push(record)?;
    }
    if sorter.rejected() > 0 {
        tracing::warn!(skipped = sorter.rejected(), "records without a usable timestamp");
    }
    let mut selected = MemorySource::new(sorter.finish(order));
    copy_records(&mut selected, sink)
}

/// Streams and options shared by every subcommand
struct Streams {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    force: bool,
}

impl Streams {
    fn input(&self) -> Result<Box<dyn BufRead>> {
        open_input(self.input.as_deref())
    }

    fn reader(&self) -> Result<AdiReader<Box<dyn BufRead>>> {
        Ok(AdiReader::new(self.input()?))
    }

    fn output(&self) -> Result<Box<dyn Write>> {
        open_output(self.output.as_deref(), self.force)
    }

    fn adi_writer(&self, tool: &str) -> Result<AdiWriter<Box<dyn Write>>> {
        Ok(AdiWriter::new(self.output()?).with_comment(format!("adiftools {}", tool)))
    }
}

fn load_cty(path: &Path) -> Result<CtyDatabase> {
    CtyDatabase::from_path(path)
        .with_context(|| format!("Failed to load cty database: {}", path.display()))
}

fn load_clublog(path: &Path) -> Result<ClublogTable> {
    ClublogTable::from_path(path)
        .with_context(|| format!("Failed to load prefix table: {}", path.display()))
}

/// Execute the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = ToolConfig::load(cli.config.as_deref())?;
    let tool = cli.command.name();
    let streams = Streams {
        input: cli.input,
        output: cli.output,
        force: cli.force,
    };
    tracing::debug!(tool, "starting pass");

    match cli.command {
        Command::Dump => {
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            copy_records(&mut reader, &mut writer)?;
            eprintln!("Total records: {}", reader.record_count());
        }
        Command::Dedupe => {
            let mut reader = DedupeReader::new(streams.reader()?);
            let mut writer = streams.adi_writer(tool)?;
            copy_records(&mut reader, &mut writer)?;
            tracing::debug!(duplicates = reader.duplicate_count(), "dedupe finished");
            eprintln!("Total records: {}", reader.record_count());
        }
        Command::Delf { fields } => {
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            delete_fields(&mut reader, &mut writer, &fields)?;
        }
        Command::Csv { fields } => {
            let mut reader = streams.reader()?;
            write_csv(&mut reader, streams.output()?, &fields)?;
        }
        Command::Grep { invert, args } => {
            let [field, pattern] = args.as_slice() else {
                anyhow::bail!(
                    "grep needs exactly two arguments: FIELD REGEX (got {})",
                    args.len()
                );
            };
            let filter = FieldFilter::new(field, pattern, invert)?;
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            grep_records(&mut reader, &mut writer, &filter)?;
        }
        Command::Cab(policy) => {
            let policy = config.policy_for(PolicyTool::Cab, policy.on_error);
            let mut reader = streams.reader()?;
            write_cabrillo(&mut reader, streams.output()?, policy)?;
        }
        Command::Dxcc { cty, policy } => {
            let policy = config.policy_for(PolicyTool::Dxcc, policy.on_error);
            let db = load_cty(&config.cty_path(cty.as_deref())?)?;
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            enrich_records(&mut reader, &mut writer, &db, policy)?;
        }
        Command::Dxcccl { clublog, policy } => {
            let policy = config.policy_for(PolicyTool::Dxcccl, policy.on_error);
            let table = load_clublog(&config.clublog_path(clublog.as_deref())?)?;
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            enrich_records_at(&mut reader, &mut writer, &table, policy)?;
        }
        Command::Stat { query, format } => {
            let mut reader = streams.reader()?;
            let stats = aggregate(&mut reader)?;
            write_stats(&stats, streams.output()?, query, format)?;
        }
        Command::Time {
            start,
            end,
            reverse,
            no_sort,
            policy,
        } => {
            let policy = config.policy_for(PolicyTool::Time, policy.on_error);
            let window = parse_window(start.as_deref(), end.as_deref())?;
            let order = SortOrder::from_flags(reverse, no_sort);
            let mut reader = streams.reader()?;
            let mut writer = streams.adi_writer(tool)?;
            time_order(&mut reader, &mut writer, window, order, policy)?;
        }
        Command::Noasciitostar => {
            let input = streams.input()?;
            mask_non_ascii(input, streams.output()?)?;
        }
    }
    Ok(())
}
