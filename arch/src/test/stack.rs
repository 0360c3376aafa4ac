use super::{run_to_halt, vm_with_program};
use crate::instruction::Fields;
use crate::opcode::Opcode;
use crate::vm::Vm;

fn vm_with_stack() -> Vm {
    let mut vm = vm_with_program(&[
        (Opcode::Movz, Fields::E { dest: 1, imm: 11 }),
        (Opcode::Movz, Fields::E { dest: 2, imm: 22 }),
        (Opcode::Push, Fields::R { a: 1 }),
        (Opcode::Push, Fields::R { a: 2 }),
        (Opcode::Pop, Fields::R { a: 3 }),
        (Opcode::Pop, Fields::R { a: 4 }),
        (Opcode::Halt, Fields::O),
    ]);
    vm.memory.mount(4096, vec![0; 1024]).unwrap();
    vm.registers.set_sp(4096 + 1024);
    vm
}

#[test]
fn push_pop_preserves_values_in_lifo_order() {
    let mut vm = vm_with_stack();
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.get(3), 22);
    assert_eq!(vm.registers.get(4), 11);
}

#[test]
fn matching_push_pop_counts_leave_stack_pointer_unchanged() {
    let mut vm = vm_with_stack();
    let initial_sp = vm.registers.sp();
    run_to_halt(&mut vm);
    assert_eq!(vm.registers.sp(), initial_sp);
}
