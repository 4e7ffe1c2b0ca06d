use thiserror::Error;

/// Faults raised during execution. Each one stops the machine and
/// leaves the partial output already written.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack height exceeds {0}")]
    StackOverflow(usize),

    #[error("pop from an empty stack")]
    StackUnderflow,

    #[error("frame slot access out of bounds: {0}")]
    FrameAccessOutOfBounds(usize),

    #[error("static link chain leads outside the stack: {0}")]
    BadStaticLink(i64),

    #[error("return without a matching call")]
    ReturnWithoutCall,

    #[error("activation record holds an invalid control value: {0}")]
    CorruptFrame(i64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("could not read an integer from input: {0}")]
    ReadFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
