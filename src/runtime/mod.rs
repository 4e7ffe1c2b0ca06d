// =============================================================================
// RUNTIME - Stack machine and its faults
// =============================================================================

pub mod runtime_error;
pub mod vm;

pub use runtime_error::RuntimeError;
pub use vm::{MAX_STACK_HEIGHT, Vm, VmConfig};
