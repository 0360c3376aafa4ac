use arch::Opcode;

use crate::statement::{Instruction, Operand};
use crate::token::Mnemonic;

/// Rewrites the four pseudo-mnemonics into their real equivalents, per the
/// fixed expansion table. Real instructions pass through untouched.
pub fn rewrite(instr: Instruction) -> Instruction {
    let Instruction {
        mnemonic,
        operands,
        row,
        col,
    } = instr;

    match mnemonic {
        Mnemonic::Cmp => {
            let mut ops = vec![Operand::Register(0)];
            ops.extend(operands);
            Instruction {
                mnemonic: Mnemonic::Real(Opcode::Sub),
                operands: ops,
                row,
                col,
            }
        }
        Mnemonic::Cmpi => {
            let mut ops = vec![Operand::Register(0)];
            ops.extend(operands);
            Instruction {
                mnemonic: Mnemonic::Real(Opcode::Subi),
                operands: ops,
                row,
                col,
            }
        }
        Mnemonic::Mov => {
            let mut ops = operands;
            ops.push(Operand::Register(0));
            Instruction {
                mnemonic: Mnemonic::Real(Opcode::Add),
                operands: ops,
                row,
                col,
            }
        }
        Mnemonic::Adr => Instruction {
            mnemonic: Mnemonic::Real(Opcode::Movz),
            operands,
            row,
            col,
        },
        Mnemonic::Real(_) => Instruction {
            mnemonic,
            operands,
            row,
            col,
        },
    }
}
