//! The register machine: decode loop, opcode dispatch, and the tabular state dump used
//! for tracing.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use log::debug;
#[cfg(feature = "trace_computation")]
use log::trace;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use prettytable::{format as TableFormat, Table};
use strum::IntoEnumIterator;

use crate::bytecode::{Instruction, Operation, Program, Word};
use crate::error::ExecutionError;
use crate::operand::Register;
use crate::state::MachineState;

/**
  Runs `program` against `state` until the instruction pointer leaves the program and
  returns the final state. The program is never modified.

  This does not return if the program loops forever. Use `run_with_limit` for programs
  that are not trusted to halt.
*/
pub fn run(program: &Program, state: MachineState) -> Result<MachineState, ExecutionError> {
  let mut machine = Machine::new(program, state);
  debug!("Running {} cells from {}", program.len(), machine.state);

  while !machine.is_halted() {
    machine.step()?;
  }

  debug!("Halted after {} steps: {}", machine.steps, machine.state);
  Ok(machine.into_state())
}

/// Like `run`, but fails with `ExecutionError::StepLimitExceeded` once `max_steps`
/// instructions have executed without the machine halting.
pub fn run_with_limit(program: &Program, state: MachineState, max_steps: usize)
  -> Result<MachineState, ExecutionError>
{
  let mut machine = Machine::new(program, state);

  while !machine.is_halted() {
    if machine.steps == max_steps {
      debug!("Giving up after {} steps: {}", max_steps, machine.state);
      return Err(ExecutionError::StepLimitExceeded { limit: max_steps });
    }
    machine.step()?;
  }

  Ok(machine.into_state())
}

/// `value / 2^exponent`. Registers are never negative, so this is a right shift. A
/// shift wider than the address space clears every bit.
fn divide_by_power_of_two(value: &BigUint, exponent: &BigUint) -> BigUint {
  match exponent.to_usize() {
    Some(shift) => value >> shift,
    None        => BigUint::zero()
  }
}

/// `value mod 8`.
fn low_three_bits(value: &BigUint) -> u8 {
  value.iter_u64_digits().next().map_or(0, |digit| (digit & 7) as u8)
}

/// A machine executing one program. The state is owned by the machine for the duration
/// of the run and handed back with `into_state`.
pub struct Machine<'p> {
  program : &'p Program,
  state   : MachineState,
  /// Number of instructions executed so far.
  steps   : usize,
}

impl<'p> Machine<'p> {

  // region Display methods

  fn make_register_table(state: &MachineState) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for register in Register::iter() {
      table.add_row(row![r->format!("{} =", register), state.register(register)]);
    }
    table.add_row(row![r->"IP =", state.instruction_pointer]);
    table
  }

  fn make_code_table(program: &Program, highlight: usize) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Instruction"]);

    for (address, instruction) in program.disassemble() {
      let text =
        match instruction {
          Some(instruction) => instruction.to_string(),
          None              => format!("?? {}", program.cells()[address])
        };

      match address == highlight {

        true  => {
          table.add_row(row![r->format!("* --> [{}]", address), text]);
        }

        false => {
          table.add_row(row![r->format!("[{}]", address), text]);
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  pub fn new(program: &'p Program, state: MachineState) -> Machine<'p> {
    Machine {
      program,
      state,
      steps: 0,
    }
  }

  pub fn program(&self) -> &Program {
    self.program
  }

  pub fn state(&self) -> &MachineState {
    &self.state
  }

  pub fn into_state(self) -> MachineState {
    self.state
  }

  pub fn steps(&self) -> usize {
    self.steps
  }

  /// The machine halts when the instruction pointer is at or past the end of the program.
  pub fn is_halted(&self) -> bool {
    self.state.instruction_pointer >= self.program.len()
  }

  /// Decodes and executes one instruction. Does nothing once the machine has halted.
  pub fn step(&mut self) -> Result<(), ExecutionError> {
    if self.is_halted() {
      return Ok(());
    }
    // A caller-built state can start anywhere; an operand cell is never executed.
    if self.state.instruction_pointer % 2 != 0 {
      return Err(ExecutionError::MisalignedPointer {
        address: self.state.instruction_pointer
      });
    }

    let instruction = self.program.decode_at(self.state.instruction_pointer)?;
    #[cfg(feature = "trace_computation")]
      trace!("[{}] {}", self.state.instruction_pointer, instruction);

    self.execute(instruction)?;
    self.steps += 1;

    #[cfg(feature = "trace_computation")]
      {
        if log::log_enabled!(log::Level::Trace) {
          trace!("\n{}", self);
        }
      }
    Ok(())
  }

  // region VM instruction methods

  fn execute(&mut self, instruction: Instruction) -> Result<(), ExecutionError> {
    let Instruction { operation, operand } = instruction;

    match operation {

      Operation::Adv => self.divide_a_into(Register::A, operation, operand)?,

      Operation::Bxl => {
        self.state.b ^= BigUint::from(operand);
      }

      Operation::Bst => {
        let value = self.combo(operation, operand)?;
        self.state.b = BigUint::from(low_three_bits(&value));
      }

      Operation::Jnz => {
        if !self.state.a.is_zero() {
          self.state.instruction_pointer = self.jump_target(operand)?;
          // The jump replaces the usual advance.
          return Ok(());
        }
      }

      Operation::Bxc => {
        let state = &mut self.state;
        state.b ^= &state.c;
      }

      Operation::Out => {
        let value = self.combo(operation, operand)?;
        self.state.output.push(low_three_bits(&value));
      }

      Operation::Bdv => self.divide_a_into(Register::B, operation, operand)?,

      Operation::Cdv => self.divide_a_into(Register::C, operation, operand)?,

    } // end match on operation

    self.state.instruction_pointer += 2;
    Ok(())
  }

  fn combo(&self, operation: Operation, operand: Word) -> Result<BigUint, ExecutionError> {
    self.state
        .combo_operand(operand)
        .map_err(|source| ExecutionError::InvalidComboOperand {
          operation,
          address: self.state.instruction_pointer,
          source
        })
  }

  /// `adv`, `bdv` and `cdv` differ only in their destination.
  fn divide_a_into(&mut self, destination: Register, operation: Operation, operand: Word)
    -> Result<(), ExecutionError>
  {
    let exponent = self.combo(operation, operand)?;
    let quotient = divide_by_power_of_two(&self.state.a, &exponent);
    *self.state.register_mut(destination) = quotient;
    Ok(())
  }

  /**
    Validates a `jnz` target. A target at or past the end of the program is fine: the
    machine simply halts. A target inside the program must land on an opcode cell.
  */
  fn jump_target(&self, target: Word) -> Result<usize, ExecutionError> {
    let address = usize::try_from(target).unwrap_or(usize::MAX);

    if address < self.program.len() && address % 2 != 0 {
      return Err(ExecutionError::MisalignedJump {
        target,
        address: self.state.instruction_pointer
      });
    }
    Ok(address)
  }

  // endregion
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<'p> Display for Machine<'p> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = Machine::make_register_table(&self.state);
    let c_table = Machine::make_code_table(self.program, self.state.instruction_pointer);

    let mut combined_table = table!([r_table, c_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Program"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let status = match self.is_halted() {
      true  => "Halted.",
      false => "Running."
    };

    write!(
      f,
      "Steps: {}\t{}\nOutput: {}\n{}",
      self.steps, status, self.state.output_string(), combined_table
    )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
  }

  fn program(literal: &str) -> Program {
    literal.parse().unwrap()
  }

  fn big(value: u64) -> BigUint {
    BigUint::from(value)
  }

  fn run_literal(literal: &str, a: u64, b: u64, c: u64) -> MachineState {
    init();
    run(&program(literal), MachineState::new(a, b, c)).unwrap()
  }

  // region End-to-end scenarios

  #[test]
  fn scenario_1() {
    let state = run_literal("0,1,5,4,3,0", 729, 0, 0);
    assert_eq!(state.output_string(), "4,6,3,5,6,3,5,2,1,0");
  }

  #[test]
  fn scenario_2() {
    let state = run_literal("5,0,5,1,5,4", 10, 0, 0);
    assert_eq!(state.output, vec![0, 1, 2]);
  }

  #[test]
  fn scenario_3() {
    let state = run_literal("0,1,5,4,3,0", 2024, 0, 0);
    assert_eq!(state.output_string(), "4,2,5,6,7,7,7,7,3,1,0");
    assert_eq!(state.a, big(0));
  }

  #[test]
  fn scenario_4() {
    let state = run_literal("1,7", 0, 29, 0);
    assert_eq!(state.b, big(26));
  }

  #[test]
  fn scenario_5() {
    let state = run_literal("4,0", 0, 2024, 43690);
    assert_eq!(state.b, big(44354));
  }

  #[test]
  fn scenario_bst_from_c() {
    let state = run_literal("2,6", 0, 0, 9);
    assert_eq!(state.b, big(1));
  }

  // endregion

  // region Individual opcodes

  #[test]
  fn divisions_by_combo_zero_copy_a() {
    assert_eq!(run_literal("0,0", 37, 0, 0).a, big(37));
    assert_eq!(run_literal("6,0", 37, 0, 0).b, big(37));
    assert_eq!(run_literal("7,0", 37, 0, 0).c, big(37));
  }

  #[test]
  fn divisions_truncate() {
    assert_eq!(run_literal("0,2", 17, 0, 0).a, big(4));
    assert_eq!(run_literal("6,1", 17, 0, 0).b, big(8));
    // cdv A: 3 / 2^3
    let state = run_literal("7,4", 3, 0, 0);
    assert_eq!(state.c, big(0));
    assert_eq!(state.a, big(3));
  }

  #[test]
  fn division_by_huge_exponent() {
    init();
    let huge = BigUint::from(1u32) << 80usize;
    let state = MachineState::new(123u32, huge, 0u32);
    let state = run(&program("0,5"), state).unwrap();
    assert_eq!(state.a, big(0));
  }

  #[test]
  fn registers_exceed_machine_words() {
    init();
    let a = (BigUint::from(1u32) << 100usize) + big(6);
    let state = run(&program("2,4,0,3"), MachineState::new(a, 0u32, 0u32)).unwrap();
    assert_eq!(state.b, big(6));
    assert_eq!(state.a, BigUint::from(1u32) << 97usize);
  }

  #[test]
  fn bxl_uses_literal_operand() {
    // Operand 4 is the number 4, not register A.
    let state = run_literal("1,4", 100, 1, 0);
    assert_eq!(state.b, big(5));
  }

  #[test]
  fn bxc_ignores_operand() {
    let state = run_literal("4,7", 0, 6, 3);
    assert_eq!(state.b, big(5));
    assert_eq!(state.c, big(3));
  }

  #[test]
  fn out_only_appends() {
    let state = run_literal("5,5,5,6,5,4", 9, 15, 8);
    assert_eq!(state.output, vec![7, 0, 1]);
    assert_eq!((state.a, state.b, state.c), (big(9), big(15), big(8)));
  }

  #[test]
  fn jnz_falls_through_when_a_is_zero() {
    let state = run_literal("3,6,5,1,5,2,5,3", 0, 0, 0);
    assert_eq!(state.output, vec![1, 2, 3]);
  }

  #[test]
  fn jnz_jumps_to_literal_target() {
    let state = run_literal("3,6,5,1,5,2,5,3", 1, 0, 0);
    assert_eq!(state.output, vec![3]);
    // Operand 4 is the address 4, not the value of A.
    let state = run_literal("3,4,5,0,5,1", 7, 0, 0);
    assert_eq!(state.output, vec![1]);
  }

  #[test]
  fn jnz_past_the_end_halts() {
    let state = run_literal("3,9,5,1", 1, 0, 0);
    assert!(state.output.is_empty());
    assert_eq!(state.instruction_pointer, 9);
  }

  // endregion

  // region Failures

  #[test]
  fn unknown_opcode() {
    init();
    let result = run(&program("5,1,8,0"), MachineState::new(0u32, 0u32, 0u32));
    let error = result.unwrap_err();
    assert_eq!(error, ExecutionError::UnknownOpcode { opcode: 8, address: 2 });
    assert!(error.is_malformed_program());
  }

  #[test]
  fn combo_operand_seven() {
    init();
    let error = run(&program("5,7"), MachineState::default()).unwrap_err();
    assert!(matches!(
      error,
      ExecutionError::InvalidComboOperand { operation: Operation::Out, address: 0, .. }
    ));
    assert!(error.is_malformed_program());
  }

  #[test]
  fn literal_seven_is_fine() {
    let state = run_literal("1,7,3,7", 0, 0, 0);
    assert_eq!(state.b, big(7));
  }

  #[test]
  fn misaligned_jump() {
    init();
    let error = run(&program("3,1,5,0"), MachineState::new(1u32, 0u32, 0u32)).unwrap_err();
    assert_eq!(error, ExecutionError::MisalignedJump { target: 1, address: 0 });
  }

  #[test]
  fn odd_starting_pointer() {
    init();
    let mut state = MachineState::new(0u32, 0u32, 0u32);
    state.instruction_pointer = 1;
    let error = run(&program("0,5,5,2"), state).unwrap_err();
    assert_eq!(error, ExecutionError::MisalignedPointer { address: 1 });
    assert!(error.is_malformed_program());
  }

  #[test]
  fn starting_pointer_on_last_cell() {
    init();
    let p = program("5,1,5,2");
    let mut state = MachineState::default();
    state.instruction_pointer = p.len() - 1;

    let mut machine = Machine::new(&p, state);
    assert_eq!(machine.step(), Err(ExecutionError::MisalignedPointer { address: 3 }));
    assert!(machine.state().output.is_empty());
    assert_eq!(machine.steps(), 0);
  }

  #[test]
  fn step_limit() {
    init();
    let error =
      run_with_limit(&program("3,0"), MachineState::new(1u32, 0u32, 0u32), 100).unwrap_err();
    assert_eq!(error, ExecutionError::StepLimitExceeded { limit: 100 });
    assert!(!error.is_malformed_program());
  }

  #[test]
  fn step_limit_not_reached() {
    init();
    let state =
      run_with_limit(&program("0,1,5,4,3,0"), MachineState::new(729u32, 0u32, 0u32), 1_000)
        .unwrap();
    assert_eq!(state.output_string(), "4,6,3,5,6,3,5,2,1,0");
  }

  // endregion

  #[test]
  fn deterministic() {
    let p = program("2,4,1,5,7,5,1,6,0,3,4,3,5,5,3,0");
    let first  = run(&p, MachineState::new(46323429u64, 0u32, 0u32)).unwrap();
    let second = run(&p, MachineState::new(46323429u64, 0u32, 0u32)).unwrap();
    assert_eq!(first, second);
    assert!(first.output.iter().all(|v| *v < 8));
  }

  #[test]
  fn stepping() {
    init();
    let p = program("0,1,5,4,3,0");
    let mut machine = Machine::new(&p, MachineState::new(2u32, 0u32, 0u32));
    assert_eq!(machine.program(), &p);

    machine.step().unwrap();
    assert_eq!(machine.state().a, big(1));
    assert_eq!(machine.state().instruction_pointer, 2);
    assert_eq!(machine.steps(), 1);

    while !machine.is_halted() {
      machine.step().unwrap();
    }
    let steps = machine.steps();
    machine.step().unwrap();
    assert_eq!(machine.steps(), steps);
    assert_eq!(machine.into_state().output_string(), "1,0");
  }

  #[test]
  fn table_display() {
    let p = program("0,1,5,4,3,0");
    let machine = Machine::new(&p, MachineState::new(729u32, 0u32, 0u32));
    let text = machine.to_string();
    assert!(text.contains("Running."));
    assert!(text.contains("* --> [0]"));
    assert!(text.contains("out A"));
    assert!(text.contains("729"));
  }
}
