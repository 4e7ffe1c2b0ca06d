use thiserror::Error;

/// Errors raised while loading the three-column bytecode text. Any of
/// these prevents execution from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not read line {0}: expected three integers")]
    MalformedLine(usize),

    #[error("invalid opcode {code} on line {line}")]
    BadOpcode { line: usize, code: i64 },

    #[error("invalid opr selector {selector} on line {line}")]
    BadOperation { line: usize, selector: i64 },

    #[error("invalid sio selector {selector} on line {line}")]
    BadIoRequest { line: usize, selector: i64 },

    #[error("negative level or address field on line {0}")]
    NegativeField(usize),

    #[error("instruction count exceeds {0}")]
    TooManyInstructions(usize),
}
