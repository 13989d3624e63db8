/*!

  A program is a flat stream of unsigned cells read two at a time: an opcode cell followed
  by an operand cell. Opcodes are three bits wide, and so are well-formed operands, but
  the stream itself is stored as full words so that a malformed program can be represented
  and rejected when the offending cell is decoded rather than when it is loaded.

    [Opcode: Word][Operand: Word]

  How the operand cell is interpreted depends on the opcode. It is either a *combo*
  operand, resolved through `operand::ComboOperand` to a small constant or a register, a
  *literal* used as-is (an XOR mask or a jump target), or ignored altogether.

  The human readable form of a program is its assembly, one `mnemonic operand` pair per
  line. See the `assembly` module.

*/

mod assembly;
mod instruction;
mod program;

pub use assembly::{parse_assembly, parse_program};
pub use instruction::{Instruction, OperandKind, Operation};
pub use program::Program;

/// The width of a single cell of the instruction stream.
pub type Word = u64;
