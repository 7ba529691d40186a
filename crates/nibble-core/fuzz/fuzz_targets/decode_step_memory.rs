#![no_main]

use libfuzzer_sys::fuzz_target;
use nibble_core::{disassemble, Cpu, Decoder, InterruptSource, IO_PORT_DATA};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let word = u16::from_be_bytes([data[0], data[1]]);
    let _ = Decoder::decode(word);
    let _ = disassemble(word);

    let mut cpu = Cpu::default();
    let _ = cpu.load_image(0x1800, &data[4..]);
    let _ = cpu.io_mut().load(IO_PORT_DATA, &data[2..3]);
    cpu.control_mut().sa = u16::from_be_bytes([data[2], data[3]]);
    if data[3] & 1 == 1 {
        cpu.raise(InterruptSource::SecondTimer);
    }
    let _ = cpu.run(256);
    let _ = cpu.decode(cpu.control().pc);
});
