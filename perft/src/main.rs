use std::time::{Duration, Instant};

use clap::Parser;
use tafl_core::{
    board::Position,
    perft::{perft, perft_divide},
};

/// Perft runner for Tafl.
///
/// Counts legal move tree leaves for a position to check the move generator
/// against published reference values and to measure its speed.
#[derive(Parser, Debug)]
struct Args {
    /// Starting position of the board.
    ///
    /// Expects either the string "startpos" or a valid position in
    /// Forsyth-Edwards Notation (FEN).
    #[arg(short, long, default_value = "startpos", value_parser = parse_position)]
    position: Position,

    /// Exact depth to search to.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=64), default_value_t = 6)]
    depth: u8,

    /// Run in divide mode.
    ///
    /// Runs perft at the given depth and lists each legal root move with the
    /// number of leaves found under it. Comparing the listing against a
    /// known-good engine localizes a generator bug to one root move.
    #[arg(long)]
    divide: bool,
}

fn parse_position(s: &str) -> Result<Position, String> {
    if s == "startpos" {
        Ok(Position::starting_position())
    } else {
        Position::try_parse_fen(s).map_err(|e| {
            format!("Expected `startpos` or a valid FEN string. FEN parsing error: {e}")
        })
    }
}

fn ladder_perft(mut position: Position, max_depth: u32) {
    let mut total_time = Duration::ZERO;
    let mut last_depth_time = Duration::ZERO;
    let mut total_nodes = 0;

    for depth in 0..=max_depth {
        let start_time = Instant::now();

        let nodes = perft(&mut position, depth);

        let time_taken = start_time.elapsed();

        println!(
            "Depth: {depth}\tNodes: {nodes}\tTime taken: {:.3}s",
            time_taken.as_secs_f64()
        );

        total_time += time_taken;
        last_depth_time = time_taken;
        total_nodes += nodes;
    }

    println!();

    let nodes_per_second = total_nodes as f64 / last_depth_time.as_secs_f64();

    println!(
        "Total nodes: {total_nodes}\tTotal time: {:.3}s\tNodes per second: {:.3}",
        total_time.as_secs_f64(),
        nodes_per_second
    );
}

fn divide_perft(mut position: Position, depth: u32) {
    let total = perft_divide(&mut position, depth);

    println!();
    println!("Nodes searched: {total}");
}

fn main() {
    let Args {
        position,
        depth,
        divide,
    } = Args::parse();

    if divide {
        divide_perft(position, depth as u32);
    } else {
        ladder_perft(position, depth as u32);
    }
}
