use std::time::Duration;

use chippy::{Chip8Error, Config, Emulator, FONT, Quirks, u4};

// Long enough to fire every clock once per update
const STEP: Duration = Duration::from_secs(1);

fn assemble(opcodes: &[u16]) -> Vec<u8> {
    opcodes.iter().flat_map(|op| op.to_be_bytes()).collect()
}

fn emulator(quirks: Quirks, opcodes: &[u16]) -> Emulator {
    let mut config = Config::chip8().with_quirks(quirks);
    config.cpu.seed = Some(0xC8);
    Emulator::new(config, &FONT, &assemble(opcodes)).unwrap()
}

fn run(emulator: &mut Emulator, steps: usize) {
    for _ in 0..steps {
        let report = emulator.update(STEP);
        assert!(report.fault.is_none(), "unexpected fault: {:?}", report.fault);
    }
}

#[test]
fn draws_font_glyph() {
    let mut emu = emulator(
        Quirks::cosmac_vip(),
        &[
            0x6000, // V0 = 0
            0xF029, // I = glyph for V0
            0xD005, // draw 5 rows at (V0, V0)
            0x1206, // loop
        ],
    );
    run(&mut emu, 3);

    let frame = emu.take_frame().expect("drawing should produce a frame");
    // "0" is F0 90 90 90 F0
    for x in 0..4 {
        assert!(frame.pixel(x, 0));
        assert!(frame.pixel(x, 4));
    }
    for y in 1..4 {
        assert!(frame.pixel(0, y));
        assert!(!frame.pixel(1, y));
        assert!(!frame.pixel(2, y));
        assert!(frame.pixel(3, y));
    }
    assert!(!frame.pixel(4, 0));
    assert_eq!(emu.cpu().registers().v[0xF], 0);
}

#[test]
fn redrawing_erases_and_reports_collision() {
    let mut emu = emulator(
        Quirks::cosmac_vip(),
        &[
            0x6005, // V0 = 5
            0xF029, // I = glyph for 5
            0xD005,
            0xD005,
            0x1208,
        ],
    );
    run(&mut emu, 4);

    assert!(emu.display().rows().all(|row| row.iter().all(|p| !p)));
    assert_eq!(emu.cpu().registers().v[0xF], 1);
}

#[test]
fn subroutine_loop_counts_to_five() {
    let mut emu = emulator(
        Quirks::cosmac_vip(),
        &[
            0x6100, // 200: V1 = 0
            0x220A, // 202: call 20A
            0x3105, // 204: skip if V1 == 5
            0x1202, // 206: jump 202
            0x1208, // 208: halt
            0x7101, // 20A: V1 += 1
            0x00EE, // 20C: return
        ],
    );
    run(&mut emu, 100);

    let cpu = emu.cpu();
    assert_eq!(cpu.registers().v[1], 5);
    assert_eq!(cpu.registers().pc, 0x208);
    assert!(cpu.stack().is_empty());
}

#[test]
fn bcd_round_trips_through_memory() {
    let program = [
        0x609C, // V0 = 156
        0xA300, // I = 300
        0xF033, // BCD V0
        0xF265, // load V0..=V2
        0x1208,
    ];

    let mut emu = emulator(Quirks::cosmac_vip(), &program);
    run(&mut emu, 4);
    let registers = emu.cpu().registers();
    assert_eq!(&registers.v[..3], &[1, 5, 6]);
    assert_eq!(registers.i, 0x303);
    assert_eq!(&emu.cpu().memory().as_slice()[0x300..0x303], &[1, 5, 6]);

    let mut emu = emulator(Quirks::modern(), &program);
    run(&mut emu, 4);
    assert_eq!(&emu.cpu().registers().v[..3], &[1, 5, 6]);
    assert_eq!(emu.cpu().registers().i, 0x300);
}

#[test]
fn waits_for_key_then_resumes() {
    let mut emu = emulator(
        Quirks::cosmac_vip(),
        &[
            0xF30A, // V3 = next key
            0x6401, // V4 = 1
            0x1204,
        ],
    );

    for _ in 0..3 {
        assert!(emu.update(STEP).waiting_for_key);
        assert_eq!(emu.cpu().registers().pc, 0x200);
    }

    emu.set_key(u4::new(0x7), true);
    run(&mut emu, 2);
    assert_eq!(emu.cpu().registers().v[3], 0x7);
    assert_eq!(emu.cpu().registers().v[4], 0x1);
}

#[test]
fn skips_on_key_state() {
    let mut emu = emulator(
        Quirks::cosmac_vip(),
        &[
            0x6002, // V0 = 2
            0xE09E, // skip if key 2 down
            0x6A01, // VA = 1 (skipped)
            0xE0A1, // skip if key 2 up
            0x6B01, // VB = 1
            0x120A,
        ],
    );
    emu.set_key(u4::new(0x2), true);
    run(&mut emu, 4);

    assert_eq!(emu.cpu().registers().v[0xA], 0);
    assert_eq!(emu.cpu().registers().v[0xB], 1);
}

#[test]
fn random_is_deterministic_for_a_seed() {
    let program = [0xCAFF, 0xCB0F, 0x1204];

    let mut a = emulator(Quirks::cosmac_vip(), &program);
    let mut b = emulator(Quirks::cosmac_vip(), &program);
    run(&mut a, 2);
    run(&mut b, 2);

    assert_eq!(a.cpu().registers().v, b.cpu().registers().v);
    assert_eq!(a.cpu().registers().v[0xB] & 0xF0, 0);
}

#[test]
fn machine_code_call_is_a_fault() {
    let mut emu = emulator(Quirks::cosmac_vip(), &[0x0123, 0x6A09]);

    let report = emu.update(STEP);
    assert!(matches!(
        report.fault,
        Some(Chip8Error::UnknownOpcode {
            opcode: 0x0123,
            address: 0x200
        })
    ));

    run(&mut emu, 1);
    assert_eq!(emu.cpu().registers().v[0xA], 0x09);
}

#[test]
fn program_that_overflows_memory_is_rejected() {
    let mut config = Config::chip8();
    config.memory.size = 0x210;

    let result = Emulator::new(config, &FONT, &[0u8; 0x20]);
    assert!(matches!(result, Err(Chip8Error::ImageTooLarge { .. })));
}
