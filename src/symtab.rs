// =============================================================================
// SYMTAB - Lexically scoped symbol table
// =============================================================================

use std::collections::HashMap;

use thiserror::Error;

/// A declaration whose name is already bound at the same or a deeper
/// level. Reported as a translation error rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier '{0}' is already declared in this scope")]
pub struct Redeclaration(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Constant,
    Variable,
    Procedure,
}

/// One declaration. `value` holds a constant's value or a procedure's
/// parameter count; `address` holds a variable's frame offset or a
/// procedure's entry instruction index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub value: i64,
    pub level: usize,
    pub address: usize,
}

/// Maps each name to a stack of declarations ordered by ascending
/// lexical level; the innermost visible declaration is last. Lookup
/// therefore implements shadowing, and leaving a scope is a truncation
/// of each stack's tail.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<String, Vec<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Binds `name` at `level`. Fails when the innermost visible
    /// declaration of the same name is at `level` or deeper: a scope
    /// can shadow an outer binding but never redeclare one of its own.
    pub fn declare(
        &mut self,
        kind: SymbolKind,
        name: &str,
        value: i64,
        level: usize,
        address: usize,
    ) -> Result<(), Redeclaration> {
        let stack = self.entries.entry(name.to_string()).or_default();

        if let Some(top) = stack.last() {
            if top.level >= level {
                return Err(Redeclaration(name.to_string()));
            }
        }

        stack.push(Symbol {
            name: name.to_string(),
            kind,
            value,
            level,
            address,
        });
        Ok(())
    }

    /// The innermost visible declaration of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name).and_then(|stack| stack.last())
    }

    /// Removes every declaration made at `level` or deeper. Idempotent.
    pub fn exit_scope(&mut self, level: usize) {
        self.entries.retain(|_, stack| {
            while stack.last().is_some_and(|s| s.level >= level) {
                stack.pop();
            }
            !stack.is_empty()
        });
    }
}
