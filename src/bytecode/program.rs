/*!
  The immutable instruction stream and decoding of individual instructions from it.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{parse_program, Instruction, Word};
use crate::error::{ExecutionError, ProgramError};

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Program {
  cells: Vec<Word>
}

impl Program {
  /// Fails if `cells` cannot be split into (opcode, operand) pairs.
  pub fn new(cells: Vec<Word>) -> Result<Program, ProgramError> {
    match cells.len() % 2 {
      0 => Ok(Program { cells }),
      _ => Err(ProgramError::OddLength(cells.len()))
    }
  }

  pub fn from_instructions<I>(instructions: I) -> Program
    where I: IntoIterator<Item = Instruction>
  {
    let cells = instructions.into_iter().flat_map(|i| i.encode().to_vec()).collect();
    Program { cells }
  }

  pub fn cells(&self) -> &[Word] {
    &self.cells
  }

  /// The number of cells, which is what the instruction pointer is compared against.
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /**
    Decodes the instruction whose opcode cell is at `address`, which must be even and
    inside the program.
  */
  pub fn decode_at(&self, address: usize) -> Result<Instruction, ExecutionError> {
    if address % 2 != 0 {
      return Err(ExecutionError::MisalignedPointer { address });
    }
    let (opcode, operand) =
      match (self.cells.get(address), address.checked_add(1).and_then(|i| self.cells.get(i))) {
        (Some(opcode), Some(operand)) => (*opcode, *operand),
        _ => return Err(ExecutionError::AddressOutOfRange { address })
      };
    Instruction::decode(opcode, operand)
      .ok_or(ExecutionError::UnknownOpcode { opcode, address })
  }

  /// Lists every instruction with its address. Pairs with an unknown opcode decode to
  /// `None` but still occupy their address.
  pub fn disassemble(&self) -> Vec<(usize, Option<Instruction>)> {
    self.cells
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| (2 * i, Instruction::decode(pair[0], pair[1])))
        .collect()
  }
}

/// Renders the program literal, e.g. `0,1,5,4,3,0`.
impl Display for Program {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      self.cells
          .iter()
          .map(Word::to_string)
          .collect::<Vec<String>>()
          .join(",")
    )
  }
}

impl FromStr for Program {
  type Err = ProgramError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    parse_program(text)
  }
}
