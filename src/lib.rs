/*!
  An interpreter for a three-bit register machine.

  The machine has three unbounded registers `A`, `B` and `C`, an instruction pointer, and
  an output sequence. A program is a stream of (opcode, operand) cell pairs, given either as
  the comma-separated literal `0,1,5,4,3,0` or as assembly text. Execution runs until the
  instruction pointer leaves the program.

  ```
  use threebit::{run, MachineState, Program};

  let program: Program = "0,1,5,4,3,0".parse().unwrap();
  let state = run(&program, MachineState::new(729u32, 0u32, 0u32)).unwrap();
  assert_eq!(state.output_string(), "4,6,3,5,6,3,5,2,1,0");
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod error;
pub mod machine;
pub mod operand;
pub mod state;

pub use bytecode::{parse_assembly, parse_program, Instruction, Operation, Program, Word};
pub use error::{ExecutionError, InvalidComboOperand, ProgramError};
pub use machine::{run, run_with_limit, Machine};
pub use operand::{ComboOperand, Register};
pub use state::MachineState;
