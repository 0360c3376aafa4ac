use super::{vm_with_program, NullIo};
use crate::instruction::Fields;
use crate::opcode::Opcode;

/// Drives a single conditional branch with explicit flag values and reports
/// whether it was taken (PC moved by more than one instruction width).
fn taken(opcode: Opcode, zero: bool, negative: bool, carry: bool) -> bool {
    let mut vm = vm_with_program(&[
        (opcode, Fields::Bi { offset: 4 }),
        (Opcode::Halt, Fields::O),
    ]);
    vm.registers.zero = zero;
    vm.registers.negative = negative;
    vm.registers.carry = carry;
    let mut io = NullIo;
    vm.step(&mut io).unwrap();
    vm.pc != 4
}

#[test]
fn b_eq_follows_zero_flag() {
    assert!(taken(Opcode::BEq, true, false, false));
    assert!(!taken(Opcode::BEq, false, false, false));
}

#[test]
fn b_neq_follows_inverse_of_zero_flag() {
    assert!(!taken(Opcode::BNeq, true, false, false));
    assert!(taken(Opcode::BNeq, false, false, false));
}

#[test]
fn b_lt_takes_when_negative_differs_from_carry() {
    assert!(taken(Opcode::BLt, false, true, false));
    assert!(!taken(Opcode::BLt, false, true, true));
}

#[test]
fn b_ge_takes_when_negative_matches_carry() {
    assert!(taken(Opcode::BGe, false, true, true));
    assert!(!taken(Opcode::BGe, false, true, false));
}

#[test]
fn b_gt_requires_nonzero_and_matching_negative_carry() {
    assert!(taken(Opcode::BGt, false, false, false));
    assert!(!taken(Opcode::BGt, true, false, false));
    assert!(!taken(Opcode::BGt, false, true, false));
}

#[test]
fn b_le_is_the_negation_of_b_gt() {
    assert!(!taken(Opcode::BLe, false, false, false));
    assert!(taken(Opcode::BLe, true, false, false));
    assert!(taken(Opcode::BLe, false, true, false));
}

#[test]
fn unconditional_branch_and_link_sets_return_register() {
    let mut vm = vm_with_program(&[
        (Opcode::Bl, Fields::Bi { offset: 4 }),
        (Opcode::Halt, Fields::O),
    ]);
    let mut io = NullIo;
    vm.step(&mut io).unwrap();
    assert_eq!(vm.registers.rp(), 4);
    assert_eq!(vm.pc, 16);
}

#[test]
fn branch_to_register_jumps_to_its_value() {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 1, imm: 100 }),
        (Opcode::Breg, Fields::B { a: 1 }),
    ]);
    let mut io = NullIo;
    vm.step(&mut io).unwrap();
    vm.step(&mut io).unwrap();
    assert_eq!(vm.pc, 100);
}
