//! Integration tests using Tom Harte's `SingleStepTests` for the 6502.
//!
//! Each opcode file holds 10,000 tests. Every test sets up registers and
//! RAM, runs one instruction, and lists the expected final state plus the
//! exact bus activity of every cycle. Both are compared.
//!
//! Test data lives in `test-data/65x02/6502/v1/XX.json`.

use std::fs;
use std::path::Path;

use mos_6502::{Bus, M6502, Pins, flags};
use serde::Deserialize;

/// Flat 64KB RAM bus that logs every cycle.
struct TestBus {
    ram: Vec<u8>,
    cycles: Vec<(u16, u8, bool)>,
}

impl TestBus {
    fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000],
            cycles: Vec::new(),
        }
    }

    fn load_ram(&mut self, entries: &[(u16, u8)]) {
        for &(addr, value) in entries {
            self.ram[usize::from(addr)] = value;
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }
}

impl Bus for TestBus {
    fn tick(&mut self, mut pins: Pins) -> Pins {
        let addr = usize::from(pins.addr());
        if pins.is_read() {
            pins.set_data(self.ram[addr]);
        } else {
            self.ram[addr] = pins.data();
        }
        self.cycles.push((pins.addr(), pins.data(), pins.is_read()));
        pins
    }
}

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Vec<(u16, u8, String)>,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

/// Opcodes that lock the CPU. Their bus activity after the lock-up is not
/// modelled cycle for cycle.
const JAMS: [u8; 12] = [
    0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
];

fn setup(cpu: &mut M6502, bus: &mut TestBus, state: &CpuState) {
    bus.load_ram(&state.ram);
    cpu.set_pc(state.pc);
    cpu.set_s(state.s);
    cpu.set_a(state.a);
    cpu.set_x(state.x);
    cpu.set_y(state.y);
    cpu.set_p(state.p);
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &M6502, bus: &TestBus, test: &TestCase) -> Vec<String> {
    let expected = &test.final_state;
    let mut errors = Vec::new();

    for (name, got, want) in [
        ("S", cpu.s(), expected.s),
        ("A", cpu.a(), expected.a),
        ("X", cpu.x(), expected.x),
        ("Y", cpu.y(), expected.y),
    ] {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }
    if cpu.pc() != expected.pc {
        errors.push(format!(
            "PC: got ${:04X}, want ${:04X}",
            cpu.pc(),
            expected.pc
        ));
    }

    // B and U have no storage in P.
    let mask = !(flags::B | flags::U);
    if (cpu.p() ^ expected.p) & mask != 0 {
        errors.push(format!(
            "P: got ${:02X} ({:08b}), want ${:02X} ({:08b})",
            cpu.p(),
            cpu.p(),
            expected.p,
            expected.p
        ));
    }

    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    for (i, (want, got)) in test.cycles.iter().zip(&bus.cycles).enumerate() {
        let (addr, data, kind) = want;
        let want = (*addr, *data, kind == "read");
        if *got != want {
            errors.push(format!("cycle {i}: got {got:?}, want {want:?}"));
            break;
        }
    }

    errors
}

#[test]
#[ignore = "requires test-data/65x02 — run with --ignored"]
fn run_all() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/65x02/6502/v1");

    if !test_dir.exists() {
        eprintln!("Test data not found at {}", test_dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;
    let mut total_files = 0u32;

    for opcode in (0..=0xFF_u8).filter(|op| !JAMS.contains(op)) {
        let filename = format!("{opcode:02x}.json");
        let path = test_dir.join(&filename);
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        let mut file_pass = 0u32;
        let mut file_fail = 0u32;
        let mut first_failures: Vec<String> = Vec::new();

        for test in &tests {
            let mut cpu = M6502::default();
            let mut bus = TestBus::new();
            setup(&mut cpu, &mut bus, &test.initial);

            for _ in 0..test.cycles.len() {
                cpu.tick(&mut bus);
            }

            let errors = compare(&cpu, &bus, test);
            if errors.is_empty() {
                file_pass += 1;
            } else {
                file_fail += 1;
                if first_failures.len() < 5 {
                    first_failures.push(format!(
                        "  FAIL [{}]: {}",
                        test.name,
                        errors.join(", ")
                    ));
                }
            }
        }

        let status = if file_fail == 0 { "PASS" } else { "FAIL" };
        println!(
            "Opcode ${opcode:02X} ({filename}): {status} — {file_pass}/{} passed",
            file_pass + file_fail
        );
        for msg in &first_failures {
            println!("{msg}");
        }

        total_pass += u64::from(file_pass);
        total_fail += u64::from(file_fail);
        total_files += 1;
    }

    println!();
    println!("=== SingleStepTests Summary ===");
    println!(
        "Files: {total_files}, Total: {}, Pass: {total_pass}, Fail: {total_fail}",
        total_pass + total_fail
    );

    assert_eq!(total_fail, 0, "{total_fail} tests failed");
}
