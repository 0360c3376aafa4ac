use super::{run_to_halt, vm_with_program};
use crate::instruction::Fields;
use crate::opcode::Opcode;

#[test]
fn zero_register_reads_as_zero_and_ignores_writes() {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 0, imm: 42 }),
        (Opcode::Halt, Fields::O),
    ]);
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(0), 0);
}

#[test]
fn movz_then_movk_builds_a_64_bit_value_in_low_halfword() {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 1, imm: 0x00FF }),
        (Opcode::Movk, Fields::E { dest: 1, imm: 0xABCD }),
        (Opcode::Halt, Fields::O),
    ]);
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(1), 0xABCD);
}

#[test]
fn add_sets_zero_flag_and_dest() {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 1, imm: 5 }),
        (Opcode::Movz, Fields::E { dest: 2, imm: 5 }),
        (Opcode::Sub, Fields::A { dest: 3, a: 1, b: 2 }),
        (Opcode::Halt, Fields::O),
    ]);
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(3), 0);
    assert!(vm.registers.zero);
}

#[test]
fn addi_respects_r0_source_as_zero() {
    let mut vm = vm_with_program(&[
        (Opcode::Addi, Fields::Ai { dest: 1, a: 0, imm: 7 }),
        (Opcode::Halt, Fields::O),
    ]);
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(1), 7);
}

#[test]
fn logic_and_shift_ops() {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 1, imm: 0b1100 }),
        (Opcode::Movz, Fields::E { dest: 2, imm: 0b1010 }),
        (Opcode::And, Fields::A { dest: 3, a: 1, b: 2 }),
        (Opcode::Or, Fields::A { dest: 4, a: 1, b: 2 }),
        (Opcode::Xor, Fields::A { dest: 5, a: 1, b: 2 }),
        (Opcode::Movz, Fields::E { dest: 6, imm: 2 }),
        (Opcode::Lsl, Fields::A { dest: 7, a: 1, b: 6 }),
        (Opcode::Lsr, Fields::A { dest: 8, a: 1, b: 6 }),
        (Opcode::Halt, Fields::O),
    ]);
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(3), 0b1000);
    assert_eq!(vm.registers.get(4), 0b1110);
    assert_eq!(vm.registers.get(5), 0b0110);
    assert_eq!(vm.registers.get(7), 0b1100 << 2);
    assert_eq!(vm.registers.get(8), 0b1100 >> 2);
}
