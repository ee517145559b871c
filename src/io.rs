//! Input and output streams for the tools
//!
//! `-f` absent reads stdin, `-o` absent writes stdout. An output file that
//! already exists is refused unless `--force` is given.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Open the input stream
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Open the output stream
pub fn open_output(path: Option<&Path>, force: bool) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    };

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options.open(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            anyhow::anyhow!(
                "Output file {} already exists (use --force to overwrite)",
                path.display()
            )
        } else {
            anyhow::Error::new(e)
                .context(format!("Failed to create output file: {}", path.display()))
        }
    })?;
    Ok(Box::new(BufWriter::new(file)))
}
