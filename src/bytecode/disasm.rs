// =============================================================================
// DISASM - Human-readable instruction listing
// =============================================================================

use crate::bytecode::program::Program;

/// Renders the program as an aligned four-column listing, one
/// instruction per line with its address and mnemonic.
pub fn listing(program: &Program) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8}{:<8}{:<8}{}\n", "Line", "OP", "L", "M"));

    for (addr, op) in program.code.iter().enumerate() {
        let (_, level, operand) = op.encode();
        out.push_str(&format!(
            "{:<8}{:<8}{:<8}{}\n",
            addr,
            op.mnemonic(),
            level,
            operand
        ));
    }
    out.push('\n');
    out
}
