//! Drives a small beeper routine the way a sound-effect player host does:
//! fixed T-state chunks with overshoot carried forward and one maskable
//! interrupt per frame.

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

use z80_core::{Bus, Clock, FlatBus, MemAccess, PortAccess, PortContention, PortPhase, Z80};

const FRAME_TSTATES: i32 = 1024;
const CHUNK_TSTATES: i32 = 16;
const COUNTER_ADDR: u16 = 0x9000;
const BEEPER_BIT: u8 = 0x10;

/// `IM 1; LD SP,0xF000; EI`, a high pulse and a low pulse on port `0xFE`
/// each held for a 256-pass `DJNZ`, then a write to port `0x01` to signal
/// completion.
const ROUTINE: &[u8] = &[
    0xED, 0x56, 0x31, 0x00, 0xF0, 0xFB, 0x3E, 0x10, 0xD3, 0xFE, 0x06, 0x00, 0x10, 0xFE, 0xAF,
    0xD3, 0xFE, 0x06, 0x00, 0x10, 0xFE, 0xD3, 0x01, 0x76,
];

/// `PUSH AF; LD A,(COUNTER); INC A; LD (COUNTER),A; POP AF; EI; RET`
const ISR: &[u8] = &[
    0xF5, 0x3A, 0x00, 0x90, 0x3C, 0x32, 0x00, 0x90, 0xF1, 0xFB, 0xC9,
];

struct BeeperBus {
    ram: FlatBus,
    level: u8,
    /// Absolute T-state at which the current `run_for` chunk started.
    chunk_start: i64,
    /// Chunk-relative T-state of the last output cycle.
    port_tstate: i32,
    edges: Vec<(i64, u8)>,
    finished: bool,
}

impl BeeperBus {
    fn new() -> Self {
        let mut ram = FlatBus::with_program(0, ROUTINE);
        ram.load(0x0038, ISR);
        Self {
            ram,
            level: 0,
            chunk_start: 0,
            port_tstate: 0,
            edges: Vec::new(),
            finished: false,
        }
    }
}

impl Bus for BeeperBus {
    fn read_memory(&mut self, addr: u16, access: MemAccess) -> u8 {
        self.ram.read_memory(addr, access)
    }

    fn write_memory(&mut self, addr: u16, value: u8, access: MemAccess) {
        self.ram.write_memory(addr, value, access);
    }

    fn read_port(&mut self, _port: u16, _access: PortAccess) -> u8 {
        0
    }

    fn write_port(&mut self, port: u16, value: u8, _access: PortAccess) {
        if port & 0xFF == 0xFE {
            self.level = value & BEEPER_BIT;
            let stamp = self.chunk_start + i64::from(self.port_tstate);
            self.edges.push((stamp, self.level));
        } else {
            self.finished = true;
        }
    }

    fn port_contention(&mut self) -> Option<&mut dyn PortContention> {
        Some(self)
    }
}

impl PortContention for BeeperBus {
    fn contend_port(&mut self, clock: &mut Clock, _port: u16, tstates: i32, phase: PortPhase) {
        clock.advance(tstates);
        if phase.early && !phase.input {
            self.port_tstate = clock.tstates;
        }
    }
}

struct Playback {
    high_chunks: usize,
    accepted: u8,
}

fn play(cpu: &mut Z80, bus: &mut BeeperBus) -> Playback {
    let mut next_interrupt = FRAME_TSTATES;
    let mut budget = CHUNK_TSTATES;
    let mut playback = Playback {
        high_chunks: 0,
        accepted: 0,
    };

    for _ in 0..100_000 {
        let real = cpu.run_for(bus, budget);
        bus.chunk_start += i64::from(real);
        next_interrupt -= real;
        budget = CHUNK_TSTATES + (CHUNK_TSTATES - real);
        if bus.level != 0 {
            playback.high_chunks += 1;
        }
        if bus.finished {
            return playback;
        }
        if next_interrupt < CHUNK_TSTATES {
            next_interrupt += FRAME_TSTATES;
            if let Ok(cost) = cpu.interrupt(bus) {
                bus.chunk_start += i64::from(cost);
                playback.accepted += 1;
            }
        }
    }
    panic!("routine never signalled completion");
}

#[test]
fn routine_toggles_beeper_and_signals_completion() {
    let mut cpu = Z80::new();
    let mut bus = BeeperBus::new();
    cpu.reset();

    let playback = play(&mut cpu, &mut bus);

    let levels: Vec<u8> = bus.edges.iter().map(|(_, level)| *level).collect();
    assert_eq!(levels, vec![BEEPER_BIT, 0]);
    // IM 1, LD SP, EI and LD A take 29 T-states; the write lands 8 T-states
    // into OUT (n),A.
    assert_eq!(bus.edges[0].0, 37);
    assert!(bus.edges[1].0 - bus.edges[0].0 > 3_323);
    assert!(bus.finished);
    assert!(
        (200..=240).contains(&playback.high_chunks),
        "high for {} chunks",
        playback.high_chunks
    );
}

#[test]
fn every_accepted_frame_interrupt_runs_the_handler() {
    let mut cpu = Z80::new();
    let mut bus = BeeperBus::new();

    let playback = play(&mut cpu, &mut bus);

    assert!(playback.accepted >= 3);
    assert_eq!(
        bus.read_memory(COUNTER_ADDR, MemAccess::Other),
        playback.accepted
    );
    assert_eq!(cpu.regs().sp(), 0xF000);
    assert!(cpu.regs().iff1());
}
