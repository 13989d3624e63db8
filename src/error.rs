//! Error types for building programs and for running them.

use thiserror::Error;

use crate::bytecode::{Operation, Word};

/// Errors raised while constructing a `Program`, either from raw cells, from the
/// comma-separated literal, or from assembly text.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ProgramError {
  /// The literal could not be parsed. `column` is 1-based.
  #[error("syntax error at column {column}: unexpected `{found}`")]
  Syntax {
    column: usize,
    found: String
  },
  /// Instructions are (opcode, operand) pairs, so the cell count must be even.
  #[error("program has {0} cells, but instructions come in pairs")]
  OddLength(usize),
  #[error("error on line {line}: expected `mnemonic [operand]`, found `{text}`")]
  MalformedLine {
    line: usize,
    text: String
  },
  #[error("error on line {line}: `{name}` is not an operation")]
  NotAnOperation {
    line: usize,
    name: String
  },
  #[error("error on line {line}: {operation} requires an operand")]
  MissingOperand {
    line: usize,
    operation: Operation
  },
  #[error("error on line {line}: `{operand}` is not a valid operand for {operation}")]
  InvalidOperand {
    line: usize,
    operation: Operation,
    operand: String
  },
}

/// A combo operand outside of `0..=6`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("{0} is not a valid combo operand")]
pub struct InvalidComboOperand(pub Word);

/// Fatal conditions hit while executing a program. None of these are recoverable: the
/// machine is deterministic, so running again reproduces the same failure.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExecutionError {
  #[error("unknown opcode {opcode} at address {address}")]
  UnknownOpcode {
    opcode: Word,
    address: usize
  },
  #[error("{operation} at address {address}: {source}")]
  InvalidComboOperand {
    operation: Operation,
    address: usize,
    source: InvalidComboOperand
  },
  /// A jump landed on an operand cell inside the program.
  #[error("jnz at address {address} jumps to odd address {target}")]
  MisalignedJump {
    target: Word,
    address: usize
  },
  /// The instruction pointer is on an operand cell, so there is no opcode to decode.
  #[error("instruction pointer {address} is not on an opcode cell")]
  MisalignedPointer {
    address: usize
  },
  #[error("no instruction at address {address}")]
  AddressOutOfRange {
    address: usize
  },
  #[error("machine did not halt within {limit} steps")]
  StepLimitExceeded {
    limit: usize
  },
}

impl ExecutionError {
  /// True for failures caused by the program text itself rather than by a caller-imposed
  /// limit.
  pub fn is_malformed_program(&self) -> bool {
    !matches!(self, ExecutionError::StepLimitExceeded { .. })
  }
}
