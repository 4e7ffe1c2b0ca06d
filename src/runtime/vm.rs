// =============================================================================
// VM - Stack machine execution
// =============================================================================
//
// Registers: pc is the next instruction, bp the base of the current
// activation record, sp the stack top. Slot 0 of the stack is unused;
// slot m of the frame at base b lives at stack[b + m]. The first four
// slots of every frame hold the return value, the static link, the
// dynamic link and the return address, in that order.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use crate::bytecode::op::{IoRequest, Op, Operation};
use crate::bytecode::program::Program;
use crate::runtime::runtime_error::RuntimeError;

/// Default ceiling on the stack height, counted in value slots.
pub const MAX_STACK_HEIGHT: usize = 2000;

#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
    pub max_stack_height: usize,
}

impl Default for VmConfig {
    fn default() -> VmConfig {
        VmConfig {
            max_stack_height: MAX_STACK_HEIGHT,
        }
    }
}

/// One machine instance. The stack grows on demand up to the
/// configured ceiling; frame bases are tracked on the side so the
/// trace can mark activation record boundaries.
pub struct Vm<R, W> {
    code: Vec<Op>,
    stack: Vec<i64>,
    pc: usize,
    bp: usize,
    sp: usize,
    frames: Vec<usize>,
    input: R,
    output: W,
    config: VmConfig,
}

impl Vm<BufReader<Stdin>, Stdout> {
    pub fn new(program: Program) -> Self {
        Vm::with_io(program, BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Vm<R, W> {
    pub fn with_io(program: Program, input: R, output: W) -> Vm<R, W> {
        Vm {
            code: program.code,
            stack: vec![0],
            pc: 0,
            bp: 1,
            sp: 0,
            frames: Vec::new(),
            input,
            output,
            config: VmConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VmConfig) -> Vm<R, W> {
        self.config = config;
        self
    }

    /// Runs until a halt, until execution falls off the end of the
    /// code, or until a fault.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.execute(None)
    }

    /// Like `run`, writing a per-instruction register and stack trace.
    pub fn run_traced(&mut self, trace: &mut dyn io::Write) -> Result<(), RuntimeError> {
        self.execute(Some(trace))
    }

    fn execute(&mut self, mut trace: Option<&mut dyn io::Write>) -> Result<(), RuntimeError> {
        if let Some(out) = trace.as_deref_mut() {
            write!(out, "{:>70}", "pc      bp      sp      stack\n")?;
            writeln!(
                out,
                "{:<40}{:<8}{:<8}{:<8}",
                "Initial Values", self.pc, self.bp, self.sp
            )?;
        }

        loop {
            let Some(op) = self.code.get(self.pc).copied() else {
                break;
            };
            let addr = self.pc;
            self.pc += 1;

            if let Some(out) = trace.as_deref_mut() {
                let (_, level, operand) = op.encode();
                write!(
                    out,
                    "{:<8}{:<8}{:<8}{:<16}",
                    addr,
                    op.mnemonic(),
                    level,
                    operand
                )?;
            }

            let running = self.step(op)?;

            if let Some(out) = trace.as_deref_mut() {
                self.write_state(out)?;
            }
            if !running {
                break;
            }
        }
        Ok(())
    }

    fn step(&mut self, op: Op) -> Result<bool, RuntimeError> {
        match op {
            Op::Lit(value) => self.push(value)?,

            Op::Opr(operation) => self.operate(operation)?,

            Op::Lod(hops, slot) => {
                let frame = self.frame_base(hops)?;
                let value = self.load(frame + slot)?;
                self.push(value)?;
            }

            Op::Sto(hops, slot) => {
                let value = self.pop()?;
                let frame = self.frame_base(hops)?;
                self.store(frame + slot, value)?;
            }

            Op::Cal(hops, entry) => {
                let link = self.frame_base(hops)?;
                let base = self.sp + 1;
                self.store(base, 0)?;
                self.store(base + 1, link as i64)?;
                self.store(base + 2, self.bp as i64)?;
                self.store(base + 3, self.pc as i64)?;
                self.frames.push(base);
                self.bp = base;
                self.pc = entry;
            }

            Op::Inc(count) => {
                let target = self.sp as i64 + count;
                let sp = usize::try_from(target).map_err(|_| RuntimeError::StackUnderflow)?;
                self.ensure(sp)?;
                self.sp = sp;
            }

            Op::Jmp(target) => self.pc = target,

            Op::Jpc(target) => {
                if self.pop()? == 0 {
                    self.pc = target;
                }
            }

            Op::Sio(IoRequest::Write) => {
                let value = self.pop()?;
                writeln!(self.output, "{}", value)?;
            }

            Op::Sio(IoRequest::Read) => {
                write!(self.output, "Input an integer value: ")?;
                self.output.flush()?;

                let mut line = String::new();
                self.input.read_line(&mut line)?;
                let value = line
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| RuntimeError::ReadFailed(e.to_string()))?;
                self.push(value)?;
            }

            Op::Sio(IoRequest::Halt) => {
                self.pc = 0;
                self.bp = 0;
                self.sp = 0;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn operate(&mut self, operation: Operation) -> Result<(), RuntimeError> {
        match operation {
            Operation::Ret => self.ret(),
            Operation::Neg => {
                let value = self.pop()?;
                self.push(value.checked_neg().ok_or(RuntimeError::Overflow)?)
            }
            Operation::Odd => {
                let value = self.pop()?;
                self.push(value % 2)
            }
            Operation::Add => self.binary(|a, b| a.checked_add(b).ok_or(RuntimeError::Overflow)),
            Operation::Sub => self.binary(|a, b| a.checked_sub(b).ok_or(RuntimeError::Overflow)),
            Operation::Mul => self.binary(|a, b| a.checked_mul(b).ok_or(RuntimeError::Overflow)),
            Operation::Div => self.binary(|a, b| match a.checked_div(b) {
                Some(v) => Ok(v),
                None if b == 0 => Err(RuntimeError::DivisionByZero),
                None => Err(RuntimeError::Overflow),
            }),
            Operation::Mod => self.binary(|a, b| match a.checked_rem(b) {
                Some(v) => Ok(v),
                None if b == 0 => Err(RuntimeError::DivisionByZero),
                None => Err(RuntimeError::Overflow),
            }),
            Operation::Eql => self.binary(|a, b| Ok((a == b) as i64)),
            Operation::Neq => self.binary(|a, b| Ok((a != b) as i64)),
            Operation::Lss => self.binary(|a, b| Ok((a < b) as i64)),
            Operation::Leq => self.binary(|a, b| Ok((a <= b) as i64)),
            Operation::Gtr => self.binary(|a, b| Ok((a > b) as i64)),
            Operation::Geq => self.binary(|a, b| Ok((a >= b) as i64)),
        }
    }

    /// Discards the current frame and restores the caller's registers
    /// from the frame header.
    fn ret(&mut self) -> Result<(), RuntimeError> {
        if self.frames.pop().is_none() {
            return Err(RuntimeError::ReturnWithoutCall);
        }
        let frame = self.bp;
        self.sp = frame - 1;

        let ra = self.load(frame + 3)?;
        self.pc = usize::try_from(ra).map_err(|_| RuntimeError::CorruptFrame(ra))?;
        let dl = self.load(frame + 2)?;
        self.bp = usize::try_from(dl).map_err(|_| RuntimeError::CorruptFrame(dl))?;
        Ok(())
    }

    fn binary(
        &mut self,
        f: impl FnOnce(i64, i64) -> Result<i64, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        let value = f(a, b)?;
        self.push(value)
    }

    /// Walks the static-link chain `hops` frames out.
    fn frame_base(&self, hops: usize) -> Result<usize, RuntimeError> {
        let mut base = self.bp;
        for _ in 0..hops {
            let link = self.load(base + 1)?;
            base = usize::try_from(link).map_err(|_| RuntimeError::BadStaticLink(link))?;
            if base == 0 {
                return Err(RuntimeError::BadStaticLink(link));
            }
        }
        Ok(base)
    }

    fn ensure(&mut self, index: usize) -> Result<(), RuntimeError> {
        if index >= self.config.max_stack_height {
            return Err(RuntimeError::StackOverflow(self.config.max_stack_height));
        }
        if index >= self.stack.len() {
            self.stack.resize(index + 1, 0);
        }
        Ok(())
    }

    fn load(&self, index: usize) -> Result<i64, RuntimeError> {
        self.stack
            .get(index)
            .copied()
            .ok_or(RuntimeError::FrameAccessOutOfBounds(index))
    }

    fn store(&mut self, index: usize, value: i64) -> Result<(), RuntimeError> {
        self.ensure(index)?;
        self.stack[index] = value;
        Ok(())
    }

    fn push(&mut self, value: i64) -> Result<(), RuntimeError> {
        let sp = self.sp + 1;
        self.ensure(sp)?;
        self.sp = sp;
        self.stack[sp] = value;
        Ok(())
    }

    fn pop(&mut self) -> Result<i64, RuntimeError> {
        if self.sp == 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        let value = self.load(self.sp)?;
        self.sp -= 1;
        Ok(value)
    }

    /// One line of register and stack state, frames separated by bars.
    fn write_state(&self, out: &mut dyn io::Write) -> Result<(), RuntimeError> {
        write!(out, "{:<8}{:<8}{:<8}", self.pc, self.bp, self.sp)?;

        let mut frames = self.frames.iter().peekable();
        for i in 1..=self.sp {
            write!(out, "{} ", self.load(i).unwrap_or(0))?;
            if frames.peek() == Some(&&(i + 1)) {
                write!(out, "| ")?;
                frames.next();
            }
        }

        // A frame pushed by a call sits above the stack top until the
        // callee reserves its slots; show its header anyway.
        if self.sp > 0 && self.bp == self.sp + 1 {
            for i in self.bp..self.bp + 4 {
                write!(out, "{} ", self.load(i).unwrap_or(0))?;
            }
        }

        writeln!(out)?;
        Ok(())
    }

    #[allow(dead_code)]
    pub(crate) fn registers(&self) -> (usize, usize, usize) {
        (self.pc, self.bp, self.sp)
    }
}
