use std::{process::ExitCode, time::Instant};

use tafl_core::{board::Position, perft::perft};

/// One suite line: a position and its reference node counts, depth 1 upward.
#[derive(Debug, Clone)]
struct SuiteEntry {
    fen: String,
    node_counts: Vec<u64>,
}

/// Parses the embedded suite. A line reads
/// `<fen> ;D1 20 ;D2 400 ;D3 8902`, with the depth labels running
/// consecutively from 1. The suite ships inside the binary, so a malformed
/// line is a build mistake and panics with its line number.
fn parse_suite(source: &str) -> Vec<SuiteEntry> {
    let mut entries = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_number = index + 1;

        let mut fields = line.split(" ;");
        let fen = fields.next().expect("split yields at least one field");

        let node_counts = fields
            .enumerate()
            .map(|(i, field)| {
                let label = format!("D{}", i + 1);
                match field.split_once(' ') {
                    Some((found, nodes)) if found == label => {
                        nodes.parse().unwrap_or_else(|_| {
                            panic!("suite line {line_number}: bad node count `{nodes}`")
                        })
                    }
                    _ => panic!(
                        "suite line {line_number}: expected `{label} <nodes>`, got `{field}`"
                    ),
                }
            })
            .collect();

        entries.push(SuiteEntry {
            fen: fen.to_string(),
            node_counts,
        });
    }

    entries
}

/// Counts one entry's ladder, printing a line per depth. Returns the depths
/// at which the counts diverged from the reference.
fn run_entry(entry: &SuiteEntry) -> Vec<u32> {
    let mut position = Position::try_parse_fen(&entry.fen)
        .unwrap_or_else(|e| panic!("suite position `{}` does not parse: {e}", entry.fen));

    let mut wrong_depths = Vec::new();
    for (i, &expected) in entry.node_counts.iter().enumerate() {
        let depth = i as u32 + 1;
        let start = Instant::now();
        let counted = perft(&mut position, depth);
        let elapsed = start.elapsed();

        if counted == expected {
            println!("  depth {depth}: {counted} nodes in {elapsed:.2?}");
        } else {
            println!("  depth {depth}: counted {counted}, reference says {expected}");
            wrong_depths.push(depth);
        }
    }

    wrong_depths
}

fn main() -> ExitCode {
    let entries = parse_suite(include_str!("perftsuite.epd"));
    let total = entries.len();

    let start = Instant::now();
    let mut failures = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        println!("[{}/{total}] {}", i + 1, entry.fen);
        let wrong_depths = run_entry(entry);
        if !wrong_depths.is_empty() {
            failures.push((entry.fen.as_str(), wrong_depths));
        }
    }

    println!();
    println!("Suite finished in {:.2?}.", start.elapsed());

    if failures.is_empty() {
        println!("All {total} positions match the reference counts.");
        ExitCode::SUCCESS
    } else {
        println!("{} of {total} positions diverged:", failures.len());
        for (fen, depths) in &failures {
            let depths = depths
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {fen} (depth {depths})");
        }
        ExitCode::FAILURE
    }
}
