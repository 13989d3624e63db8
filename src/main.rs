use threebit::{parse_assembly, run, Machine, MachineState, Program, ProgramError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED (set RUST_LOG=trace to see it)");

  let text = "
    adv 1        # A <- A / 2
    out A
    jnz 0        # until A is zero
  ";
  let program = parse_assembly(text)?;
  println!("Program: {}", program);

  let state = run(&program, MachineState::new(729u32, 0u32, 0u32))?;
  println!("Output: {}\n", state.output_string());

  let program: Program = "2,4,1,5,7,5,1,6,0,3,4,3,5,5,3,0".parse()?;
  let mut machine = Machine::new(&program, MachineState::new(46323429u32, 0u32, 0u32));
  while !machine.is_halted() {
    machine.step()?;
  }
  println!("{}", machine);

  match "0,1,5".parse::<Program>() {
    Ok(program) => println!("Unexpectedly parsed: {}", program),
    Err(e @ ProgramError::OddLength(_)) => println!("Rejected: {}", e),
    Err(e) => return Err(e.into()),
  }

  Ok(())
}
