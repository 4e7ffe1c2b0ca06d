// =============================================================================
// PROGRAM - The finished instruction sequence and its text format
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::bytecode::load_error::LoadError;
use crate::bytecode::op::{IoRequest, Op, Operation};

/// Instruction-count ceiling shared by the translator and the loader.
pub const MAX_CODE_LEN: usize = 32_768;

/// An append-only instruction sequence; the index of an instruction is
/// its address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: Vec<Op>,
}

impl Program {
    pub fn new(code: Vec<Op>) -> Program {
        Program { code }
    }

    /// Serializes to the persisted hand-off format: one instruction per
    /// line, three whitespace-separated integers `opcode level operand`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for op in &self.code {
            let (opcode, level, operand) = op.encode();
            out.push_str(&format!("{} {} {}\n", opcode, level, operand));
        }
        out
    }

    /// Parses the text format back into an instruction sequence.
    /// `to_text` followed by `from_text` reproduces the sequence exactly.
    pub fn from_text(text: &str) -> Result<Program, LoadError> {
        let mut code = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace().map(|w| w.parse::<i64>());
            let (opcode, level, operand) = match (fields.next(), fields.next(), fields.next()) {
                (Some(Ok(a)), Some(Ok(b)), Some(Ok(c))) => (a, b, c),
                _ => return Err(LoadError::MalformedLine(line_no)),
            };
            if fields.next().is_some() {
                return Err(LoadError::MalformedLine(line_no));
            }

            if code.len() == MAX_CODE_LEN {
                return Err(LoadError::TooManyInstructions(MAX_CODE_LEN));
            }
            code.push(decode(line_no, opcode, level, operand)?);
        }

        Ok(Program { code })
    }
}

fn decode(line: usize, opcode: i64, level: i64, operand: i64) -> Result<Op, LoadError> {
    let hops = usize::try_from(level).map_err(|_| LoadError::NegativeField(line))?;
    let addr = || usize::try_from(operand).map_err(|_| LoadError::NegativeField(line));

    match opcode {
        1 => Ok(Op::Lit(operand)),
        2 => Operation::from_code(operand)
            .map(Op::Opr)
            .ok_or(LoadError::BadOperation {
                line,
                selector: operand,
            }),
        3 => Ok(Op::Lod(hops, addr()?)),
        4 => Ok(Op::Sto(hops, addr()?)),
        5 => Ok(Op::Cal(hops, addr()?)),
        6 => Ok(Op::Inc(operand)),
        7 => Ok(Op::Jmp(addr()?)),
        8 => Ok(Op::Jpc(addr()?)),
        9 => IoRequest::from_code(operand)
            .map(Op::Sio)
            .ok_or(LoadError::BadIoRequest {
                line,
                selector: operand,
            }),
        _ => Err(LoadError::BadOpcode { line, code: opcode }),
    }
}
