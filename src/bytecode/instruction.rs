use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::bytecode::Word;
use crate::operand::ComboOperand;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its opcode, so the order the opcodes are listed
  below is significant.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Operation {
  Adv, // A <- A / 2^combo
  Bxl, // B <- B xor literal
  Bst, // B <- combo mod 8
  Jnz, // if A != 0 { IP <- literal }
  Bxc, // B <- B xor C
  Out, // output combo mod 8
  Bdv, // B <- A / 2^combo
  Cdv, // C <- A / 2^combo
}

/// How an operation reads its operand cell.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum OperandKind {
  /// Resolved through `ComboOperand`.
  Combo,
  /// Used as-is.
  Literal,
  /// Consumed but never read.
  Ignored,
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Maps an opcode cell to its operation, if there is one.
  pub fn from_word(word: Word) -> Option<Operation> {
    u8::try_from(word)
      .ok()
      .and_then(|code| Operation::try_from(code).ok())
  }

  pub fn operand_kind(&self) -> OperandKind {
    match self {
      | Operation::Adv
      | Operation::Bst
      | Operation::Out
      | Operation::Bdv
      | Operation::Cdv => OperandKind::Combo,

      | Operation::Bxl
      | Operation::Jnz => OperandKind::Literal,

      Operation::Bxc => OperandKind::Ignored,
    }
  }
}

/// A decoded (opcode, operand) pair. The operand is kept raw; it is resolved when the
/// instruction executes, because resolving a combo operand needs the machine state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub operation: Operation,
  pub operand: Word
}

impl Instruction {
  pub fn new(operation: Operation, operand: Word) -> Instruction {
    Instruction { operation, operand }
  }

  /// Returns `None` if `opcode` names no operation.
  pub fn decode(opcode: Word, operand: Word) -> Option<Instruction> {
    Operation::from_word(opcode).map(|operation| Instruction { operation, operand })
  }

  pub fn encode(&self) -> [Word; 2] {
    [self.operation.code() as Word, self.operand]
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operation.operand_kind() {

      OperandKind::Combo => {
        match ComboOperand::try_from(self.operand) {
          Ok(combo) => write!(f, "{} {}", self.operation, combo),
          // Not valid assembly, but the raw value is what the reader needs to see.
          Err(_)    => write!(f, "{} {}", self.operation, self.operand)
        }
      }

      OperandKind::Literal => {
        write!(f, "{} {}", self.operation, self.operand)
      }

      OperandKind::Ignored if self.operand == 0 => {
        write!(f, "{}", self.operation)
      }

      OperandKind::Ignored => {
        write!(f, "{} {}", self.operation, self.operand)
      }

    }
  }
}
