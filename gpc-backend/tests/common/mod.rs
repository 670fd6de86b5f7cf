//! A tiny interpreter for generated function bodies
//!
//! It understands exactly the instructions the backend puts inside a body.
//! Each call gets a fresh frame keyed by `%rbp` displacement. Caller-saved
//! registers are scrambled after every call so values that were not saved
//! show up as wrong answers.

#![allow(dead_code)]

use gpc_backend::{generate_program, CodegenOptions, CodegenOutput};
use gpc_codegen::emit::{PRINTF_SYMBOL, SCANF_SYMBOL};
use gpc_codegen::{ArithOp, AsmFunction, AsmInst, AsmProgram, Operand, Reg};
use gpc_frontend::Program;
use std::collections::{HashMap, VecDeque};

const STEP_LIMIT: usize = 1_000_000;
const FRAME_LIMIT: usize = 10_000;
const GARBAGE: i32 = 0x5a5a_5a5a;
const CLOBBERED: [Reg; 5] = [Reg::Rax, Reg::Rcx, Reg::Rdx, Reg::Rsi, Reg::Rdi];

pub struct Machine<'a> {
    functions: HashMap<&'a str, &'a AsmFunction>,
    regs: HashMap<Reg, i32>,
    /// Registers holding the address of a frame slot: (frame index, disp)
    addresses: HashMap<Reg, (usize, i32)>,
    frames: Vec<HashMap<i32, i32>>,
    flags: Option<(i32, i32)>,
    input: VecDeque<i32>,
    pub output: Vec<i32>,
    steps: usize,
}

impl<'a> Machine<'a> {
    pub fn new(program: &'a AsmProgram) -> Self {
        let mut machine = Self::detached();
        for function in &program.functions {
            machine.functions.insert(function.name.as_str(), function);
        }
        machine
    }

    /// A machine with no functions, for running loose instruction lists
    pub fn detached() -> Self {
        Self {
            functions: HashMap::new(),
            regs: HashMap::new(),
            addresses: HashMap::new(),
            frames: Vec::new(),
            flags: None,
            input: VecDeque::new(),
            output: Vec::new(),
            steps: 0,
        }
    }

    pub fn with_input(mut self, input: &[i32]) -> Self {
        self.input = input.iter().copied().collect();
        self
    }

    pub fn reg(&self, reg: Reg) -> i32 {
        self.regs.get(&reg).copied().unwrap_or(GARBAGE)
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Store `value` in a slot of the innermost frame
    pub fn store(&mut self, slot: &Operand, value: i32) -> Result<(), String> {
        self.write(slot, value)
    }

    pub fn load(&self, slot: &Operand) -> Result<i32, String> {
        self.read(slot)
    }

    /// Run `body` in the current frame
    pub fn execute(&mut self, body: &[AsmInst]) -> Result<(), String> {
        let labels: HashMap<&str, usize> = body
            .iter()
            .enumerate()
            .filter_map(|(i, inst)| match inst {
                AsmInst::Label(name) => Some((name.as_str(), i)),
                _ => None,
            })
            .collect();

        let mut pc = 0;
        while pc < body.len() {
            self.steps += 1;
            if self.steps > STEP_LIMIT {
                return Err("step limit exceeded".to_string());
            }

            let inst = &body[pc];
            pc += 1;
            match inst {
                AsmInst::Movl(src, dest) => {
                    let value = self.read(src)?;
                    self.write(dest, value)?;
                }
                AsmInst::Arith(op, src, dest) => {
                    let s = self.read(src)?;
                    let d = self.read(dest)?;
                    let value = match op {
                        ArithOp::Add => d.wrapping_add(s),
                        ArithOp::Sub => d.wrapping_sub(s),
                        ArithOp::Imul => d.wrapping_mul(s),
                    };
                    self.write(dest, value)?;
                }
                AsmInst::Negl(dest) => {
                    let value = self.read(dest)?.wrapping_neg();
                    self.write(dest, value)?;
                }
                AsmInst::Cmpl(src, dest) => {
                    self.flags = Some((self.read(dest)?, self.read(src)?));
                }
                AsmInst::Cdq => {
                    let sign = if self.reg(Reg::Rax) < 0 { -1 } else { 0 };
                    self.regs.insert(Reg::Rdx, sign);
                }
                AsmInst::Idivl(divisor) => self.divide(divisor)?,
                AsmInst::Leaq(Operand::Mem { base: Reg::Rbp, disp }, reg) => {
                    let frame = self.frames.len().checked_sub(1).ok_or("leaq without a frame")?;
                    self.addresses.insert(*reg, (frame, *disp));
                    self.regs.remove(reg);
                }
                AsmInst::Leaq(Operand::RipRel(_), reg) => {
                    self.addresses.remove(reg);
                    self.regs.insert(*reg, 0);
                }
                AsmInst::Jmp(label) => pc = Self::target(&labels, label)?,
                AsmInst::Jcc(cond, label) => {
                    let (dest, src) = self.flags.ok_or("conditional jump without cmpl")?;
                    if cond.holds(dest, src) {
                        pc = Self::target(&labels, label)?;
                    }
                }
                AsmInst::Call(name) => self.call(name)?,
                AsmInst::Label(_) | AsmInst::Comment(_) => {}
                other => return Err(format!("unexpected instruction in a body: {}", other)),
            }
        }
        Ok(())
    }

    /// Call `name` the way generated code does
    pub fn call(&mut self, name: &str) -> Result<(), String> {
        let result = if name == PRINTF_SYMBOL {
            let value = self.reg(Reg::Rsi);
            self.output.push(value);
            GARBAGE
        } else if name == SCANF_SYMBOL {
            let (frame, disp) = *self.addresses.get(&Reg::Rsi).ok_or("scanf without an address")?;
            let value = self.input.pop_front().ok_or("input exhausted")?;
            self.frames[frame].insert(disp, value);
            GARBAGE
        } else {
            let function = *self
                .functions
                .get(name)
                .ok_or_else(|| format!("call to unknown function {}", name))?;
            if self.frames.len() >= FRAME_LIMIT {
                return Err("recursion too deep".to_string());
            }
            self.push_frame();
            self.execute(&function.body)?;
            self.frames.pop();
            self.reg(Reg::Rax)
        };

        for reg in CLOBBERED {
            self.regs.insert(reg, GARBAGE);
            self.addresses.remove(&reg);
        }
        self.regs.insert(Reg::Rax, result);
        Ok(())
    }

    fn divide(&mut self, divisor: &Operand) -> Result<(), String> {
        let divisor = i64::from(self.read(divisor)?);
        if divisor == 0 {
            return Err("division by zero".to_string());
        }
        let high = i64::from(self.reg(Reg::Rdx)) << 32;
        let low = i64::from(self.reg(Reg::Rax) as u32);
        let dividend = high | low;
        let quotient = i32::try_from(dividend / divisor).map_err(|_| "quotient overflow")?;
        self.regs.insert(Reg::Rax, quotient);
        self.regs.insert(Reg::Rdx, (dividend % divisor) as i32);
        Ok(())
    }

    fn target(labels: &HashMap<&str, usize>, label: &str) -> Result<usize, String> {
        labels
            .get(label)
            .copied()
            .ok_or_else(|| format!("jump to unknown label {}", label))
    }

    fn read(&self, operand: &Operand) -> Result<i32, String> {
        match operand {
            Operand::Reg(reg) => self
                .regs
                .get(reg)
                .copied()
                .ok_or_else(|| format!("read of unset register {}", reg)),
            Operand::Imm(value) => Ok(*value),
            Operand::Mem { base: Reg::Rbp, disp } => self
                .frames
                .last()
                .and_then(|frame| frame.get(disp))
                .copied()
                .ok_or_else(|| format!("read of unset slot {}(%rbp)", disp)),
            other => Err(format!("cannot read {}", other)),
        }
    }

    fn write(&mut self, operand: &Operand, value: i32) -> Result<(), String> {
        match operand {
            Operand::Reg(reg) => {
                self.addresses.remove(reg);
                self.regs.insert(*reg, value);
                Ok(())
            }
            Operand::Mem { base: Reg::Rbp, disp } => {
                let frame = self.frames.last_mut().ok_or("write without a frame")?;
                frame.insert(*disp, value);
                Ok(())
            }
            other => Err(format!("cannot write {}", other)),
        }
    }
}

/// Generate `program` with `options` and panic on failure
pub fn compile_with(program: &Program, options: CodegenOptions) -> CodegenOutput {
    match generate_program(program, options) {
        Ok(output) => output,
        Err(err) => panic!("code generation failed: {}", err),
    }
}

pub fn compile(program: &Program) -> CodegenOutput {
    compile_with(program, CodegenOptions::default())
}

/// Run the program body and return everything it wrote
pub fn run(output: &CodegenOutput, input: &[i32]) -> Vec<i32> {
    let mut machine = Machine::new(&output.program).with_input(input);
    if let Err(err) = machine.call(&output.program.entry) {
        panic!("execution failed: {}\n{}", err, output.assembly);
    }
    machine.output
}

pub fn options(register_count: usize) -> CodegenOptions {
    CodegenOptions {
        register_count,
        ..CodegenOptions::default()
    }
}
