//! dump, dedupe, delf, grep and csv end to end
//!
//! Each test runs the binary on `tests/fixtures/log.adi` (four contacts, the
//! last one an exact duplicate of the second).

mod utils;

use predicates::prelude::*;
use utils::{adiftools, fixture, stdout_of};

#[test]
fn test_dump_copies_records_and_reports_count() {
    adiftools()
        .arg("dump")
        .arg("-f")
        .arg(fixture("log.adi"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("adiftools dump\n"))
        .stdout(predicate::str::contains("<adif_ver:5>3.1.4 <programid:9>adiftools <eoh>"))
        .stdout(predicate::str::contains("<call:4>W1AW <station_callsign:6>JJ1BDX "))
        .stdout(predicate::str::contains("<country:0> "))
        .stdout(predicate::str::contains("testgen").not())
        .stderr(predicate::str::contains("Total records: 4"));
}

#[test]
fn test_dump_reads_stdin() {
    adiftools()
        .arg("dump")
        .write_stdin("<call:4>W1AW<eor><call:4>K1AA<eor>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<call:4>K1AA <eor>"))
        .stderr(predicate::str::contains("Total records: 2"));
}

#[test]
fn test_dedupe_drops_exact_duplicates() {
    let output = adiftools()
        .arg("dedupe")
        .arg("-f")
        .arg(fixture("log.adi"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Total records: 3"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert_eq!(text.matches("<eor>").count(), 3);
    assert_eq!(text.matches("<call:6>JA1ABC").count(), 1);
}

#[test]
fn test_dedupe_ignores_field_order_and_name_case() {
    adiftools()
        .arg("dedupe")
        .write_stdin("<CALL:4>W1AW<band:3>20m<eor><BAND:3>20m<call:4>W1AW<eor><call:4>W1AW<band:3>20M<eor>")
        .assert()
        .success()
        .stderr(predicate::str::contains("Total records: 2"));
}

#[test]
fn test_delf_removes_named_fields() {
    adiftools()
        .args(["delf", "GRIDSQUARE", "country", "no_such_field"])
        .arg("-f")
        .arg(fixture("log.adi"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("adiftools delf\n"))
        .stdout(predicate::str::contains("gridsquare").not())
        .stdout(predicate::str::contains("<country:").not())
        .stdout(predicate::str::contains("<dxcc:3>291 "));
}

#[test]
fn test_grep_selects_matching_records() {
    let text = stdout_of(
        adiftools()
            .args(["grep", "CALL", "^JA"])
            .arg("-f")
            .arg(fixture("log.adi")),
    );
    assert!(text.starts_with("adiftools grep\n"));
    assert_eq!(text.matches("<eor>").count(), 2);
    assert!(!text.contains("W1AW"));
}

#[test]
fn test_grep_invert_and_absent_field() {
    // records without gridsquare match "^$"; -v keeps the others
    let text = stdout_of(
        adiftools()
            .args(["grep", "-v", "gridsquare", "^$"])
            .arg("-f")
            .arg(fixture("log.adi")),
    );
    assert_eq!(text.matches("<eor>").count(), 3);
    assert!(!text.contains("DL1AB"));
}

#[test]
fn test_grep_rejects_wrong_argument_count() {
    adiftools()
        .args(["grep", "call"])
        .write_stdin("<call:4>W1AW<eor>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly two arguments"));
}

#[test]
fn test_grep_rejects_invalid_regex() {
    adiftools()
        .args(["grep", "call", "(JA"])
        .write_stdin("<call:4>W1AW<eor>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid regex pattern"));
}

#[test]
fn test_csv_writes_selected_fields() {
    adiftools()
        .args(["csv", "CALL", "band", "country", "qth"])
        .arg("-f")
        .arg(fixture("log.adi"))
        .assert()
        .success()
        .stdout(
            "call,band,country,qth\n\
             W1AW,20m,UNITED STATES OF AMERICA,\n\
             JA1ABC,40m,,\n\
             DL1AB,10M,,\n\
             JA1ABC,40m,,\n",
        );
}

#[test]
fn test_csv_quotes_commas() {
    adiftools()
        .args(["csv", "call", "comment"])
        .write_stdin("<call:4>W1AW<comment:9>loud, 599<eor>")
        .assert()
        .success()
        .stdout("call,comment\nW1AW,\"loud, 599\"\n");
}

#[test]
fn test_truncated_input_fails_after_flushing() {
    adiftools()
        .arg("dump")
        .write_stdin("<call:4>W1AW<eor><call:9>K1")
        .assert()
        .failure()
        .stdout(predicate::str::contains("<call:4>W1AW <eor>"))
        .stderr(predicate::str::contains("call"));
}
