// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Prints the records of a capture index, one `key value` line each.
//!
//! Usage:
//!   cdx-dump <location> <namespace> [start-key]
//!
//! The index is opened read-only. Set `RUST_LOG=debug` for scan statistics
//! on stderr.

use std::env;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use cdxdb::{CaptureIndex, IndexConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (Some(location), Some(namespace)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: cdx-dump <location> <namespace> [start-key]");
        return ExitCode::from(2);
    };
    let start_key = args.get(3).map(String::as_str).unwrap_or_default();

    match run(PathBuf::from(location), namespace, start_key) {
        Ok(lines) => {
            tracing::info!(lines, "dump complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cdx-dump: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(location: PathBuf, namespace: &str, start_key: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let index = CaptureIndex::open(&location, namespace, IndexConfig::read_only())?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let lines = index.dump(start_key.as_bytes(), &mut out)?;
    drop(out);
    index.close()?;
    Ok(lines)
}
