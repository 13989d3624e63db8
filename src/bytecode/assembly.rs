/*!
  The two textual forms of a program.

  The *literal* form is what the puzzle input carries: the raw cells as comma-separated
  decimal integers, `0,1,5,4,3,0`. The *assembly* form is one instruction per line, using
  the `strum` derives of `Operation` and the `FromStr` of `ComboOperand`:

  ```text
  adv 1      # A <- A / 2
  out A
  jnz 0
  ```

  The `Display` impls of `Program` and `Instruction` produce these forms respectively.
*/

use std::str::FromStr;

use nom::{
  character::complete::{alpha1, alphanumeric1, char as one_char, digit1, space1},
  combinator::{all_consuming, map_res, opt},
  multi::separated_list1,
  sequence::{pair, preceded},
  IResult
};

use super::{Instruction, OperandKind, Operation, Program, Word};
use crate::error::ProgramError;
use crate::operand::ComboOperand;

fn cell(input: &str) -> IResult<&str, Word> {
  map_res(digit1, |digits: &str| digits.parse::<Word>())(input)
}

/// `rest` is the unparsed suffix of `text` where parsing stopped.
fn syntax_error(text: &str, rest: &str) -> ProgramError {
  ProgramError::Syntax {
    column: text[..text.len() - rest.len()].chars().count() + 1,
    found: match rest.chars().next() {
      Some(c) => c.to_string(),
      None    => "end of input".to_string()
    }
  }
}

/// Parses the comma-separated program literal. Surrounding whitespace is trimmed; no
/// whitespace is allowed between cells.
pub fn parse_program(text: &str) -> Result<Program, ProgramError> {
  let text = text.trim();

  match all_consuming(separated_list1(one_char(','), cell))(text) {
    Ok((_rest, cells))             => Program::new(cells),
    | Err(nom::Err::Error(e))
    | Err(nom::Err::Failure(e))    => Err(syntax_error(text, e.input)),
    Err(nom::Err::Incomplete(_))   => Err(syntax_error(text, ""))
  }
}

/// `mnemonic` or `mnemonic operand`.
fn instruction_line(input: &str) -> IResult<&str, (&str, Option<&str>)> {
  all_consuming(pair(alpha1, opt(preceded(space1, alphanumeric1))))(input)
}

fn parse_operand(
  line: usize,
  operation: Operation,
  operand: Option<&str>
) -> Result<Word, ProgramError> {
  let invalid = |text: &str| ProgramError::InvalidOperand {
    line,
    operation,
    operand: text.to_string()
  };

  match (operation.operand_kind(), operand) {

    (OperandKind::Ignored, None) => Ok(0),

    (_, None) => Err(ProgramError::MissingOperand { line, operation }),

    (OperandKind::Combo, Some(text)) => {
      ComboOperand::from_str(text)
        .map(|combo| combo.code())
        .map_err(|_| invalid(text))
    }

    (OperandKind::Literal, Some(text))
    | (OperandKind::Ignored, Some(text)) => {
      text.parse::<Word>().map_err(|_| invalid(text))
    }

  }
}

/// Assembles mnemonic text into a program. Errors carry the 1-based line number.
pub fn parse_assembly(text: &str) -> Result<Program, ProgramError> {
  let mut instructions: Vec<Instruction> = Vec::new();

  for (index, raw_line) in text.lines().enumerate() {
    let line = index + 1;
    let code =
      match raw_line.find('#') {
        Some(start) => &raw_line[..start],
        None        => raw_line
      }.trim();

    if code.is_empty() {
      continue;
    }

    let (name, operand) =
      match instruction_line(code) {
        Ok((_rest, parsed)) => parsed,
        Err(_e) => {
          return Err(ProgramError::MalformedLine { line, text: code.to_string() });
        }
      };

    let operation =
      Operation::from_str(name)
        .map_err(|_| ProgramError::NotAnOperation { line, name: name.to_string() })?;

    let operand = parse_operand(line, operation, operand)?;
    instructions.push(Instruction::new(operation, operand));
  }

  Ok(Program::from_instructions(instructions))
}
