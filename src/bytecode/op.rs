// =============================================================================
// OP - Stack machine instructions
// =============================================================================

use serde::{Deserialize, Serialize};

/// One instruction. Internally a tagged variant; the flat
/// `opcode level operand` layout survives only in the text format
/// (see `Op::encode` and `program::Program::from_text`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Push a literal.
    Lit(i64),
    /// Arithmetic, relational or return operation on the stack top.
    Opr(Operation),
    /// Load a frame slot, resolving the frame by static-link hops.
    Lod(usize, usize),
    /// Pop the stack top into a frame slot.
    Sto(usize, usize),
    /// Push an activation record and enter a procedure.
    Cal(usize, usize),
    /// Adjust the stack top (reserve locals, discard copied arguments).
    Inc(i64),
    /// Unconditional jump.
    Jmp(usize),
    /// Pop; jump when the popped value is zero.
    Jpc(usize),
    /// Console write/read or halt.
    Sio(IoRequest),
}

/// `Opr` selectors. The discriminants are the wire values; the
/// relational block (`Eql`..`Geq`) must stay contiguous because the
/// translator maps relational token codes onto it by offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Ret = 0,
    Neg = 1,
    Add = 2,
    Sub = 3,
    Mul = 4,
    Div = 5,
    Odd = 6,
    Mod = 7,
    Eql = 8,
    Neq = 9,
    Lss = 10,
    Leq = 11,
    Gtr = 12,
    Geq = 13,
}

impl Operation {
    pub fn from_code(code: i64) -> Option<Operation> {
        Some(match code {
            0 => Operation::Ret,
            1 => Operation::Neg,
            2 => Operation::Add,
            3 => Operation::Sub,
            4 => Operation::Mul,
            5 => Operation::Div,
            6 => Operation::Odd,
            7 => Operation::Mod,
            8 => Operation::Eql,
            9 => Operation::Neq,
            10 => Operation::Lss,
            11 => Operation::Leq,
            12 => Operation::Gtr,
            13 => Operation::Geq,
            _ => return None,
        })
    }
}

/// `Sio` selectors (wire values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoRequest {
    Write = 1,
    Read = 2,
    Halt = 3,
}

impl IoRequest {
    pub fn from_code(code: i64) -> Option<IoRequest> {
        Some(match code {
            1 => IoRequest::Write,
            2 => IoRequest::Read,
            3 => IoRequest::Halt,
            _ => return None,
        })
    }
}

impl Op {
    /// The flat `(opcode, level, operand)` rendering used by the text
    /// format and the trace output.
    pub fn encode(&self) -> (i64, i64, i64) {
        match *self {
            Op::Lit(v) => (1, 0, v),
            Op::Opr(operation) => (2, 0, operation as i64),
            Op::Lod(l, m) => (3, l as i64, m as i64),
            Op::Sto(l, m) => (4, l as i64, m as i64),
            Op::Cal(l, m) => (5, l as i64, m as i64),
            Op::Inc(n) => (6, 0, n),
            Op::Jmp(a) => (7, 0, a as i64),
            Op::Jpc(a) => (8, 0, a as i64),
            Op::Sio(request) => (9, 0, request as i64),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Lit(_) => "lit",
            Op::Opr(_) => "opr",
            Op::Lod(..) => "lod",
            Op::Sto(..) => "sto",
            Op::Cal(..) => "cal",
            Op::Inc(_) => "inc",
            Op::Jmp(_) => "jmp",
            Op::Jpc(_) => "jpc",
            Op::Sio(_) => "sio",
        }
    }
}
