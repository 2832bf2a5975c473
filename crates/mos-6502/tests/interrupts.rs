//! IRQ, NMI and BRK sequencing, including the one-instruction I flag delay.

mod common;

use common::{IRQ_HANDLER, NMI_HANDLER, ORIGIN, boot, step};
use emu_core::{Observable, Value};
use mos_6502::{Pins, flags};

#[test]
fn test_irq_masked_while_i_set() {
    let (mut cpu, mut bus) = boot(&[0xEA, 0xEA, 0xEA]);
    bus.irq_from = Some(0);
    for _ in 0..3 {
        assert_eq!(step(&mut cpu, &mut bus), 2);
    }
    assert_eq!(cpu.pc(), ORIGIN + 3);
}

#[test]
fn test_cli_takes_effect_after_next_instruction() {
    let (mut cpu, mut bus) = boot(&[
        0x58, // CLI
        0xEA, // NOP
        0xEA, // NOP
    ]);
    bus.irq_from = Some(0);

    assert_eq!(step(&mut cpu, &mut bus), 2, "no IRQ straight after CLI");
    assert_eq!(cpu.pc(), ORIGIN + 1);

    assert_eq!(step(&mut cpu, &mut bus), 2 + 7, "NOP, then the IRQ sequence");
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert!(cpu.regs.p.is_set(flags::I));

    // Return address is the instruction after the NOP; B clear in pushed P.
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x02);
    let pushed_p = bus.peek(0x01FB);
    assert_eq!(pushed_p & flags::B, 0, "IRQ pushes B clear");
    assert_eq!(pushed_p & flags::I, 0);
    assert_ne!(pushed_p & flags::U, 0);
}

#[test]
fn test_irq_right_after_sei_is_still_taken() {
    let (mut cpu, mut bus) = boot(&[
        0x58, // CLI
        0x78, // SEI
        0xEA, // NOP
    ]);
    bus.irq_from = Some(0);

    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 2 + 7, "SEI, then the IRQ sequence");
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert_ne!(bus.peek(0x01FB) & flags::I, 0, "handler sees SEI's I flag");
    assert_eq!(bus.peek(0x01FC), 0x02, "returns to the NOP");
}

#[test]
fn test_plp_clearing_i_is_delayed() {
    let (mut cpu, mut bus) = boot(&[
        0xA9, 0x00, // LDA #$00
        0x48, // PHA
        0x28, // PLP (I cleared)
        0xEA, // NOP
    ]);
    bus.irq_from = Some(0);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 4, "no IRQ straight after PLP");
    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);
}

#[test]
fn test_rti_restores_i_without_delay() {
    let (mut cpu, mut bus) = boot(&[
        0x58, // CLI
        0xEA, // NOP
    ]);
    bus.irq_from = Some(0);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    // RTI pulls I clear; the level-triggered IRQ re-enters at once.
    assert_eq!(step(&mut cpu, &mut bus), 6 + 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);
}

#[test]
fn test_interrupt_sequence_bus_trace() {
    let (mut cpu, mut bus) = boot(&[0x58, 0xEA]);
    step(&mut cpu, &mut bus);
    bus.irq_from = Some(0);
    bus.trace.clear();
    step(&mut cpu, &mut bus);

    let seq = &bus.trace[2..];
    let addrs: Vec<u16> = seq.iter().map(|p| p.addr()).collect();
    assert_eq!(
        addrs,
        [0x0202, 0x0202, 0x01FD, 0x01FC, 0x01FB, 0xFFFE, 0xFFFF]
    );
    let writes: Vec<bool> = seq.iter().map(|p| p.is_write()).collect();
    assert_eq!(writes, [false, false, true, true, true, false, false]);
    assert!(seq.iter().all(|p| !p.sync()), "no opcode fetch in the sequence");
}

#[test]
fn test_nmi_is_edge_triggered_and_ignores_i() {
    let (mut cpu, mut bus) = boot(&[0xEA, 0xEA, 0xEA]);
    // Rises during the first NOP and stays high.
    bus.nmi_from = Some(1);

    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);

    assert_eq!(step(&mut cpu, &mut bus), 6, "RTI; a held line is not a new edge");
    assert_eq!(cpu.pc(), ORIGIN + 1);
    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.pc(), ORIGIN + 2);
}

#[test]
fn test_nmi_raised_between_calls() {
    let (mut cpu, mut bus) = boot(&[0xEA, 0xEA]);
    step(&mut cpu, &mut bus);
    cpu.set_pins(cpu.pins().with(Pins::NMI));
    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn test_nmi_takes_precedence_over_irq() {
    let (mut cpu, mut bus) = boot(&[0x58, 0xEA, 0xEA]);
    step(&mut cpu, &mut bus);
    bus.trace.clear();
    bus.irq_from = Some(0);
    bus.nmi_from = Some(0);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn test_nmi_during_brk_hijacks_vector() {
    let (mut cpu, mut bus) = boot(&[0x00, 0xFF]);
    // Edge on BRK's first push.
    bus.nmi_from = Some(2);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
    assert_ne!(bus.peek(0x01FB) & flags::B, 0, "still pushed as a BRK");
}

#[test]
fn test_handler_runs_one_instruction_before_next_interrupt() {
    let (mut cpu, mut bus) = boot(&[0x58, 0xEA, 0xEA]);
    bus.load(IRQ_HANDLER, &[0xEA, 0x40]); // NOP; RTI
    step(&mut cpu, &mut bus);
    bus.trace.clear();
    bus.irq_from = Some(0);
    // NMI rises on the IRQ sequence's last vector read.
    bus.nmi_from = Some(8);

    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);

    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
    assert_eq!(&bus.addrs()[9..11], [IRQ_HANDLER, IRQ_HANDLER + 1]);
    assert!(bus.trace[9].sync(), "handler opcode fetched before the NMI");
}

#[test]
fn test_brk_handler_runs_before_pending_nmi() {
    let (mut cpu, mut bus) = boot(&[0x00, 0xFF]);
    bus.load(IRQ_HANDLER, &[0xEA, 0x40]);
    // Edge on BRK's high vector read, too late to hijack it.
    bus.nmi_from = Some(6);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert_eq!(cpu.query("nmi_pending"), Some(Value::Bool(true)));

    assert_eq!(step(&mut cpu, &mut bus), 2 + 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}
