//! The mutable half of an execution run: registers, instruction pointer and output.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_bigint::BigUint;

use crate::bytecode::Word;
use crate::error::InvalidComboOperand;
use crate::operand::{ComboOperand, Register};

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct MachineState {
  pub a: BigUint,
  pub b: BigUint,
  pub c: BigUint,
  /// Index of the next opcode cell.
  pub instruction_pointer: usize,
  /// Values written by `out`, each in `0..8`. Append only.
  pub output: Vec<u8>
}

impl MachineState {

  pub fn new<A, B, C>(a: A, b: B, c: C) -> MachineState
    where A: Into<BigUint>, B: Into<BigUint>, C: Into<BigUint>
  {
    MachineState {
      a: a.into(),
      b: b.into(),
      c: c.into(),
      instruction_pointer: 0,
      output: vec![]
    }
  }

  /// Starts over with the given registers, clearing the pointer and output.
  pub fn reset<A, B, C>(&mut self, a: A, b: B, c: C)
    where A: Into<BigUint>, B: Into<BigUint>, C: Into<BigUint>
  {
    *self = MachineState::new(a, b, c);
  }

  pub fn register(&self, register: Register) -> &BigUint {
    match register {
      Register::A => &self.a,
      Register::B => &self.b,
      Register::C => &self.c,
    }
  }

  pub fn register_mut(&mut self, register: Register) -> &mut BigUint {
    match register {
      Register::A => &mut self.a,
      Register::B => &mut self.b,
      Register::C => &mut self.c,
    }
  }

  /// Resolves a raw combo operand cell against the current registers.
  pub fn combo_operand(&self, operand: Word) -> Result<BigUint, InvalidComboOperand> {
    let value =
      match ComboOperand::try_from(operand)? {
        ComboOperand::Literal(value)     => BigUint::from(value),
        ComboOperand::Register(register) => self.register(register).clone()
      };
    Ok(value)
  }

  /// The output rendered the way the puzzle expects it, e.g. `4,6,3,5`.
  pub fn output_string(&self) -> String {
    self.output
        .iter()
        .map(u8::to_string)
        .collect::<Vec<String>>()
        .join(",")
  }
}

impl Display for MachineState {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "A: {}, B: {}, C: {}, IP: {}, Output: [{}]",
      self.a, self.b, self.c, self.instruction_pointer, self.output_string()
    )
  }
}
