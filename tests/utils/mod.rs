// Integration test utilities shared by the end-to-end tool tests
#![allow(dead_code)]

use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command for the built binary
pub fn adiftools() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("adiftools")
}

/// Values of `call` in the order they appear in ADI output
pub fn calls_in(adi: &str) -> Vec<String> {
    adi.split("<call:")
        .skip(1)
        .filter_map(|rest| {
            let (len, value) = rest.split_once('>')?;
            let len: usize = len.parse().ok()?;
            value.get(..len).map(str::to_string)
        })
        .collect()
}

/// Run the binary and return stdout, asserting success
pub fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&output).into_owned()
}
