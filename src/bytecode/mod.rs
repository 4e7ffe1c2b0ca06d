// =============================================================================
// BYTECODE - Translation, instruction model and the persisted text format
// =============================================================================

pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod load_error;
pub mod op;
pub mod program;

pub use compile::compile;
pub use compile_error::CompileError;
pub use disasm::listing;
pub use load_error::LoadError;
pub use op::{IoRequest, Op, Operation};
pub use program::{MAX_CODE_LEN, Program};
