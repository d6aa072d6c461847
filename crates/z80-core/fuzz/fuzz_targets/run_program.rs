#![no_main]

use libfuzzer_sys::fuzz_target;
use z80_core::{FlatBus, InterruptMode, Z80};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let mode = InterruptMode::from_bits(data[0]);
    let budget = i32::from(u16::from_le_bytes([data[1], data[2]]));
    let program = &data[3..];

    let mut cpu = Z80::new();
    let mut bus = FlatBus::with_program(0, program);
    cpu.regs_mut().set_im(mode);
    cpu.regs_mut().set_sp(0xFFF0);

    let elapsed = cpu.run_for(&mut bus, budget);
    assert!(elapsed >= budget);

    cpu.regs_mut().set_iff(true, true);
    let _ = cpu.interrupt(&mut bus);
    let _ = cpu.nmi(&mut bus);
    let _ = cpu.step(&mut bus);
});
