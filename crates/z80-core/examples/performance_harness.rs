//! Performance harness for z80-core benchmarking.
//!
//! Measures emulated T-states per second using the same chunked
//! `run_for` pattern a beeper player host uses.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p z80-core --example performance_harness --release
//! ```
//!
//! ## Metrics
//!
//! - Emulated T-states per second
//! - Real-time factor against a 3.5 MHz 48K machine
//!
//! The benchmark runs on several threads, each owning its own processor and
//! memory.

#![allow(clippy::pedantic)]

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use z80_core::{init_tables, FlatBus, Z80};

const CPU_HZ: f64 = 3_500_000.0;
const FRAME_TSTATES: i32 = 69_888;
const CHUNK_TSTATES: i32 = 16;
const NUM_THREADS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    tstates_per_second: f64,
    realtime_factor: f64,
}

/// `LD B,0; DJNZ $; JR 0`
const DJNZ_LOOP: &[u8] = &[0x06, 0x00, 0x10, 0xFE, 0x18, 0xFA];

/// `LD HL,0x4000; LD DE,0x8000; LD BC,0x1000; LDIR; JR 0`
const LDIR_LOOP: &[u8] = &[
    0x21, 0x00, 0x40, 0x11, 0x00, 0x80, 0x01, 0x00, 0x10, 0xED, 0xB0, 0x18, 0xF3,
];

/// `IX`-indexed arithmetic with a beeper write every pass.
const MIXED_LOOP: &[u8] = &[
    0xDD, 0x21, 0x00, 0x50, 0xDD, 0x7E, 0x01, 0xDD, 0x86, 0x02, 0xDD, 0x77, 0x03, 0xCB, 0x27,
    0xE6, 0x10, 0xD3, 0xFE, 0x18, 0xEB,
];

fn benchmark(name: &'static str, program: &'static [u8], duration: Duration) -> BenchmarkResult {
    init_tables();
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let mut cpu = Z80::new();
                let mut bus = FlatBus::with_program(0, program);
                let mut total = 0u64;
                let mut budget = CHUNK_TSTATES;
                let mut next_interrupt = FRAME_TSTATES;
                let start = Instant::now();

                while start.elapsed() < duration {
                    for _ in 0..1_000 {
                        let real = cpu.run_for(&mut bus, budget);
                        total += u64::try_from(real).unwrap_or(0);
                        budget = CHUNK_TSTATES + (CHUNK_TSTATES - real);
                        next_interrupt -= real;
                        if next_interrupt < CHUNK_TSTATES {
                            next_interrupt += FRAME_TSTATES;
                            let _ = cpu.interrupt(&mut bus);
                        }
                    }
                }

                tx.send(total).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }
    drop(tx);

    let total: u64 = rx.iter().sum();
    let tstates_per_second = total as f64 / duration.as_secs_f64();

    BenchmarkResult {
        name,
        tstates_per_second,
        realtime_factor: tstates_per_second / CPU_HZ,
    }
}

fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn print_results(results: &[BenchmarkResult]) {
    println!("\nz80-core performance harness");
    println!("  threads: {NUM_THREADS}, chunk: {CHUNK_TSTATES} T, frame: {FRAME_TSTATES} T");
    println!("{:12} {:>15} {:>12}", "benchmark", "T-states/sec", "x realtime");
    for result in results {
        println!(
            "{:12} {:>15} {:>12.1}",
            result.name,
            format_number(result.tstates_per_second),
            result.realtime_factor
        );
    }
}

fn main() {
    let duration = Duration::from_secs(2);
    let results = [
        benchmark("djnz_loop", DJNZ_LOOP, duration),
        benchmark("ldir_loop", LDIR_LOOP, duration),
        benchmark("mixed_loop", MIXED_LOOP, duration),
    ];
    print_results(&results);
}
