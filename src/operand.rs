//! Register names and the combo operand table, with some convenience functions.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

use crate::bytecode::Word;
use crate::error::InvalidComboOperand;

/// The three general purpose registers.
#[derive(StrumDisplay, EnumString, EnumIter, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Register {
  A,
  B,
  C
}

/**
  A resolved combo operand. Operands `0..=3` stand for themselves and `4..=6` name a
  register. The value `7` is reserved and never appears in a valid program.

  Resolving a `ComboOperand::Register` to a number requires a `MachineState`; see
  `MachineState::combo_operand`.
*/
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ComboOperand {
  Literal(u8),
  Register(Register)
}

impl ComboOperand {
  pub fn code(&self) -> Word {
    match self {
      ComboOperand::Literal(value)         => *value as Word,
      ComboOperand::Register(Register::A) => 4,
      ComboOperand::Register(Register::B) => 5,
      ComboOperand::Register(Register::C) => 6,
    }
  }
}

impl TryFrom<Word> for ComboOperand {
  type Error = InvalidComboOperand;

  fn try_from(operand: Word) -> Result<Self, Self::Error> {
    match operand {
      0..=3 => Ok(ComboOperand::Literal(operand as u8)),
      4     => Ok(ComboOperand::Register(Register::A)),
      5     => Ok(ComboOperand::Register(Register::B)),
      6     => Ok(ComboOperand::Register(Register::C)),
      _     => Err(InvalidComboOperand(operand))
    }
  }
}

/// Parses the assembly spelling: a digit `0` to `3` or a register name.
impl FromStr for ComboOperand {
  type Err = ();

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    if let Ok(register) = Register::from_str(text) {
      return Ok(ComboOperand::Register(register));
    }
    match text.parse::<u8>() {
      Ok(value) if value <= 3 => Ok(ComboOperand::Literal(value)),
      _                       => Err(())
    }
  }
}

impl Display for ComboOperand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ComboOperand::Literal(value)     => write!(f, "{}", value),
      ComboOperand::Register(register) => write!(f, "{}", register)
    }
  }
}
