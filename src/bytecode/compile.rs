// =============================================================================
// COMPILE - Recursive-descent translation fused with code emission
// =============================================================================
//
// One left-to-right pass over the token stream: declarations feed the
// symbol table, statements and expressions append instructions, and
// forward jump targets are back-patched as soon as they become known.
// Every identifier must be declared before its first reference.

use crate::bytecode::compile_error::CompileError;
use crate::bytecode::op::{IoRequest, Op, Operation};
use crate::bytecode::program::{MAX_CODE_LEN, Program};
use crate::symtab::{Symbol, SymbolKind, SymbolTable};
use crate::token::{MAX_IDENT_LEN, MAX_NUMBER, Sym, TokenStream};

/// Frame slots reserved for the activation-record header: return value,
/// static link, dynamic link, return address. Parameters and locals
/// start right above it.
const FRAME_HEADER: usize = 4;

/// Translates a scanner token stream into a bytecode program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    Compiler::new(source).translate()
}

/// One translation session: the token cursor, the output code, the
/// symbol table, and the compile-time stack depth of the frame whose
/// statements are currently being emitted (used to address the slots
/// of a pending callee frame when copying call arguments).
pub struct Compiler {
    tokens: TokenStream,
    code: Vec<Op>,
    symbols: SymbolTable,
    depth: i64,
}

impl Compiler {
    pub fn new(source: &str) -> Compiler {
        Compiler {
            tokens: TokenStream::new(source),
            code: Vec::new(),
            symbols: SymbolTable::new(),
            depth: 0,
        }
    }

    pub fn translate(mut self) -> Result<Program, CompileError> {
        self.advance()?;
        self.block(0, FRAME_HEADER)?;

        if self.tokens.sym() != Some(Sym::Period) {
            return Err(CompileError::PeriodExpected);
        }
        Ok(Program::new(self.code))
    }

    // ==========================================================================
    // Token cursor helpers
    // ==========================================================================

    fn advance(&mut self) -> Result<(), CompileError> {
        if self.tokens.advance() {
            Ok(())
        } else {
            Err(CompileError::UnexpectedEnd)
        }
    }

    fn expect(&mut self, sym: Sym, err: CompileError) -> Result<(), CompileError> {
        if self.tokens.sym() == Some(sym) {
            self.advance()
        } else {
            Err(err)
        }
    }

    /// Consumes the spelling word following an identifier code, plus
    /// the token after it. The caller has already checked the code.
    fn ident_name(&mut self) -> Result<String, CompileError> {
        self.advance()?;
        let name = self
            .tokens
            .take_text()
            .ok_or(CompileError::IdentifierExpected)?;
        if name.chars().count() > MAX_IDENT_LEN {
            return Err(CompileError::IdentifierTooLong(name));
        }
        self.advance()?;
        Ok(name)
    }

    /// Reads the current word as a bounds-checked numeric literal.
    fn number_value(&self) -> Result<i64, CompileError> {
        if self.tokens.text().is_some() {
            return Err(CompileError::IntegerExpected);
        }
        let value = self.tokens.code().ok_or(CompileError::UnexpectedEnd)?;
        if value > MAX_NUMBER {
            return Err(CompileError::NumberTooLarge(value));
        }
        Ok(value)
    }

    fn resolve(&self, name: &str) -> Result<Symbol, CompileError> {
        self.symbols
            .lookup(name)
            .cloned()
            .ok_or_else(|| CompileError::UndeclaredIdentifier(name.to_string()))
    }

    // ==========================================================================
    // Code emission
    // ==========================================================================

    fn emit(&mut self, op: Op) -> Result<usize, CompileError> {
        if self.code.len() == MAX_CODE_LEN {
            return Err(CompileError::CodeLimitExceeded(MAX_CODE_LEN));
        }
        self.track(&op);
        self.code.push(op);
        Ok(self.code.len() - 1)
    }

    /// Mirrors each instruction's runtime stack effect, so that the
    /// depth of the current frame is known at every emission point.
    fn track(&mut self, op: &Op) {
        match op {
            Op::Lit(_) | Op::Lod(..) | Op::Sio(IoRequest::Read) => self.depth += 1,
            Op::Sto(..) | Op::Jpc(_) | Op::Sio(IoRequest::Write) => self.depth -= 1,
            Op::Inc(n) => self.depth += n,
            Op::Opr(Operation::Ret) => self.depth = 0,
            Op::Opr(Operation::Neg) | Op::Opr(Operation::Odd) => {}
            Op::Opr(_) => self.depth -= 1,
            Op::Cal(..) | Op::Jmp(_) | Op::Sio(IoRequest::Halt) => {}
        }
    }

    /// Back-patches a forward jump once its target is known.
    fn patch(&mut self, addr: usize, target: usize) {
        if let Some(Op::Jmp(t) | Op::Jpc(t)) = self.code.get_mut(addr) {
            *t = target;
        }
    }

    // ==========================================================================
    // Grammar: block and declarations
    // ==========================================================================

    /// `block -> [const-decls] [var-decls] {procedure-decl} statement`
    ///
    /// `level` is this block's own lexical level, `num_locals` the frame
    /// slots already spoken for (header plus parameters).
    fn block(&mut self, level: usize, mut num_locals: usize) -> Result<(), CompileError> {
        // Skipped over the interleaved procedure bodies at run time;
        // patched to the statement part below.
        let header = self.emit(Op::Jmp(0))?;

        if self.tokens.sym() == Some(Sym::Const) {
            loop {
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Ident) {
                    return Err(CompileError::IdentifierExpected);
                }
                let name = self.ident_name()?;
                match self.tokens.sym() {
                    Some(Sym::Becomes) => return Err(CompileError::BecomesInConstDeclaration),
                    Some(Sym::Eql) => {}
                    _ => return Err(CompileError::EqualsExpected),
                }
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Number) {
                    return Err(CompileError::NumberExpected);
                }
                self.advance()?;
                let value = self.number_value()?;
                self.symbols
                    .declare(SymbolKind::Constant, &name, value, level, 0)?;
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Comma) {
                    break;
                }
            }
            self.expect(Sym::Semicolon, CompileError::SeparatorMissing)?;
        }

        if self.tokens.sym() == Some(Sym::Var) {
            loop {
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Ident) {
                    return Err(CompileError::IdentifierExpected);
                }
                let name = self.ident_name()?;
                self.symbols
                    .declare(SymbolKind::Variable, &name, 0, level, num_locals)?;
                num_locals += 1;
                if self.tokens.sym() != Some(Sym::Comma) {
                    break;
                }
            }
            self.expect(Sym::Semicolon, CompileError::SeparatorMissing)?;
        }

        while self.tokens.sym() == Some(Sym::Procedure) {
            self.advance()?;
            if self.tokens.sym() != Some(Sym::Ident) {
                return Err(CompileError::IdentifierExpected);
            }
            let name = self.ident_name()?;
            let frame = self.parameter_block(level)?;

            // Entry address: the callee's own header jump, emitted next.
            self.symbols.declare(
                SymbolKind::Procedure,
                &name,
                (frame - FRAME_HEADER) as i64,
                level,
                self.code.len(),
            )?;

            self.expect(Sym::Semicolon, CompileError::BadProcedureDeclaration)?;

            // The callee's result slot, addressable by name in its body.
            self.symbols
                .declare(SymbolKind::Variable, "return", 0, level + 1, 0)?;
            self.block(level + 1, frame)?;

            self.expect(Sym::Semicolon, CompileError::BlockSeparatorMissing)?;
        }

        let statements = self.code.len();
        self.patch(header, statements);

        self.emit(Op::Inc(num_locals as i64))?;
        self.statement(level)?;

        if level > 0 {
            self.emit(Op::Opr(Operation::Ret))?;
        } else {
            self.emit(Op::Sio(IoRequest::Halt))?;
        }

        self.symbols.exit_scope(level);
        Ok(())
    }

    /// `( [ident {, ident}] )` — declares each parameter as a variable
    /// of the procedure's body level, slots counted from the frame
    /// header upward. Returns the callee frame size so far.
    fn parameter_block(&mut self, level: usize) -> Result<usize, CompileError> {
        let mut addr = FRAME_HEADER;

        if self.tokens.sym() != Some(Sym::LParen) {
            return Err(CompileError::ParameterListExpected);
        }
        self.advance()?;

        if self.tokens.sym() == Some(Sym::Ident) {
            let name = self.ident_name()?;
            self.symbols
                .declare(SymbolKind::Variable, &name, 0, level + 1, addr)?;
            addr += 1;

            while self.tokens.sym() == Some(Sym::Comma) {
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Ident) {
                    return Err(CompileError::ParameterIdentifierExpected);
                }
                let name = self.ident_name()?;
                self.symbols
                    .declare(SymbolKind::Variable, &name, 0, level + 1, addr)?;
                addr += 1;
            }
        }

        self.expect(Sym::RParen, CompileError::RightParenMissing)?;
        Ok(addr)
    }

    // ==========================================================================
    // Grammar: statements
    // ==========================================================================

    fn statement(&mut self, level: usize) -> Result<(), CompileError> {
        match self.tokens.sym() {
            Some(Sym::Ident) => {
                let name = self.ident_name()?;
                let target = self.resolve(&name)?;
                if target.kind != SymbolKind::Variable {
                    return Err(CompileError::AssignmentToNonVariable(target.name));
                }

                self.expect(Sym::Becomes, CompileError::BecomesExpected)?;
                self.expression(level)?;
                self.emit(Op::Sto(level - target.level, target.address))?;
            }

            Some(Sym::Call) => {
                self.call(level)?;
            }

            Some(Sym::Begin) => {
                self.advance()?;
                self.statement(level)?;
                while self.tokens.sym() == Some(Sym::Semicolon) {
                    self.advance()?;
                    self.statement(level)?;
                }
                self.expect(Sym::End, CompileError::EndExpected)?;
            }

            Some(Sym::If) => {
                self.advance()?;
                self.condition(level)?;
                self.expect(Sym::Then, CompileError::ThenExpected)?;

                let skip_then = self.emit(Op::Jpc(0))?;
                self.statement(level)?;

                if self.tokens.sym() == Some(Sym::Else) {
                    let skip_else = self.emit(Op::Jmp(0))?;
                    self.patch(skip_then, self.code.len());
                    self.advance()?;
                    self.statement(level)?;
                    self.patch(skip_else, self.code.len());
                } else {
                    self.patch(skip_then, self.code.len());
                }
            }

            Some(Sym::While) => {
                let top = self.code.len();
                self.advance()?;
                self.condition(level)?;
                let exit = self.emit(Op::Jpc(0))?;

                self.expect(Sym::Do, CompileError::DoExpected)?;
                self.statement(level)?;

                self.emit(Op::Jmp(top))?;
                self.patch(exit, self.code.len());
            }

            Some(Sym::Read) => {
                self.advance()?;
                if self.tokens.sym() != Some(Sym::Ident) {
                    return Err(CompileError::ReadIdentifierExpected);
                }
                let name = self.ident_name()?;
                let target = self.resolve(&name)?;

                self.emit(Op::Sio(IoRequest::Read))?;
                if target.kind != SymbolKind::Variable {
                    return Err(CompileError::AssignmentToNonVariable(target.name));
                }
                self.emit(Op::Sto(level - target.level, target.address))?;
            }

            Some(Sym::Write) => {
                self.advance()?;
                self.expression(level)?;
                self.emit(Op::Sio(IoRequest::Write))?;
            }

            // Empty statement.
            _ => {}
        }
        Ok(())
    }

    /// `call ident ( args )` shared by statement and factor position;
    /// factor position recovers the return value afterwards.
    fn call(&mut self, level: usize) -> Result<(), CompileError> {
        self.advance()?;
        if self.tokens.sym() != Some(Sym::Ident) {
            return Err(CompileError::CallIdentifierExpected);
        }
        let name = self.ident_name()?;
        let callee = self.resolve(&name)?;

        if callee.kind != SymbolKind::Procedure {
            return Err(CompileError::CallOfNonProcedure(callee.name));
        }

        self.argument_list(level, callee.value as usize)?;
        self.emit(Op::Cal(level - callee.level, callee.address))?;
        Ok(())
    }

    /// Evaluates the actual arguments, then moves them off the
    /// evaluation stack into the pending callee frame's parameter
    /// slots, highest slot first (the last argument is on top).
    fn argument_list(&mut self, level: usize, expected: usize) -> Result<(), CompileError> {
        if self.tokens.sym() != Some(Sym::LParen) {
            return Err(CompileError::ArgumentListExpected);
        }
        self.advance()?;

        let mut count = 0;
        if self.tokens.sym() != Some(Sym::RParen) {
            self.expression(level)?;
            count += 1;
        }
        while self.tokens.sym() == Some(Sym::Comma) {
            self.advance()?;
            self.expression(level)?;
            count += 1;
        }

        if count != expected {
            return Err(CompileError::ArityMismatch {
                expected,
                found: count,
            });
        }

        for _ in 0..count {
            // The callee frame starts one past the popped stack top, so
            // the slot for the argument currently on top is the frame
            // header's width below the running depth.
            let slot = (self.depth + FRAME_HEADER as i64 - 1).max(0) as usize;
            self.emit(Op::Sto(0, slot))?;
        }

        self.expect(Sym::RParen, CompileError::RightParenMissing)?;
        Ok(())
    }

    // ==========================================================================
    // Grammar: conditions and expressions
    // ==========================================================================

    fn condition(&mut self, level: usize) -> Result<(), CompileError> {
        if self.tokens.sym() == Some(Sym::Odd) {
            self.advance()?;
            self.expression(level)?;
            self.emit(Op::Opr(Operation::Odd))?;
            return Ok(());
        }

        self.expression(level)?;

        // The relational token codes and selectors are both contiguous,
        // so the mapping is a single offset.
        let code = self.tokens.code().unwrap_or(0);
        if !(Sym::Eql as i64..=Sym::Geq as i64).contains(&code) {
            return Err(CompileError::RelationalOperatorExpected);
        }
        self.advance()?;
        self.expression(level)?;

        let selector = Operation::Eql as i64 + (code - Sym::Eql as i64);
        let operation =
            Operation::from_code(selector).ok_or(CompileError::RelationalOperatorExpected)?;
        self.emit(Op::Opr(operation))?;
        Ok(())
    }

    fn expression(&mut self, level: usize) -> Result<(), CompileError> {
        if matches!(self.tokens.sym(), Some(Sym::Plus | Sym::Minus)) {
            let negate = self.tokens.sym() == Some(Sym::Minus);
            self.advance()?;
            self.term(level)?;
            if negate {
                self.emit(Op::Opr(Operation::Neg))?;
            }
        } else {
            self.term(level)?;
        }

        while matches!(self.tokens.sym(), Some(Sym::Plus | Sym::Minus)) {
            let subtract = self.tokens.sym() == Some(Sym::Minus);
            self.advance()?;
            self.term(level)?;
            self.emit(Op::Opr(if subtract {
                Operation::Sub
            } else {
                Operation::Add
            }))?;
        }
        Ok(())
    }

    fn term(&mut self, level: usize) -> Result<(), CompileError> {
        self.factor(level)?;

        while matches!(self.tokens.sym(), Some(Sym::Times | Sym::Slash)) {
            let divide = self.tokens.sym() == Some(Sym::Slash);
            self.advance()?;
            self.factor(level)?;
            self.emit(Op::Opr(if divide {
                Operation::Div
            } else {
                Operation::Mul
            }))?;
        }
        Ok(())
    }

    fn factor(&mut self, level: usize) -> Result<(), CompileError> {
        match self.tokens.sym() {
            Some(Sym::Ident) => {
                let name = self.ident_name()?;
                let symbol = self.resolve(&name)?;
                match symbol.kind {
                    SymbolKind::Constant => self.emit(Op::Lit(symbol.value))?,
                    SymbolKind::Variable => {
                        self.emit(Op::Lod(level - symbol.level, symbol.address))?
                    }
                    SymbolKind::Procedure => {
                        return Err(CompileError::ProcedureInExpression(symbol.name));
                    }
                };
            }

            Some(Sym::Number) => {
                self.advance()?;
                let value = self.number_value()?;
                self.emit(Op::Lit(value))?;
                self.advance()?;
            }

            Some(Sym::LParen) => {
                self.advance()?;
                self.expression(level)?;
                self.expect(Sym::RParen, CompileError::RightParenMissing)?;
            }

            Some(Sym::Call) => {
                self.call(level)?;
                // The callee's result sits in the discarded frame's
                // first slot, one past the stack top.
                self.emit(Op::Inc(1))?;
            }

            _ => return Err(CompileError::BadFactorStart),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::lexemes;

    fn translate(source: &str) -> Result<Program, CompileError> {
        compile(&lexemes(source))
    }

    #[test]
    fn test_constant_fold_and_write_shape() {
        let program =
            translate("const a = 5 ; var b ; begin b := a + 3 ; write b end .").unwrap();
        assert_eq!(
            program.code,
            vec![
                Op::Jmp(1),
                Op::Inc(5),
                Op::Lit(5),
                Op::Lit(3),
                Op::Opr(Operation::Add),
                Op::Sto(0, 4),
                Op::Lod(0, 4),
                Op::Sio(IoRequest::Write),
                Op::Sio(IoRequest::Halt),
            ]
        );
    }

    #[test]
    fn test_while_exit_lands_after_back_jump() {
        let program =
            translate("var b ; begin b := 1 ; while b < 1 do b := b + 1 ; write b end .")
                .unwrap();

        let (exit, target) = program
            .code
            .iter()
            .enumerate()
            .find_map(|(i, op)| match op {
                Op::Jpc(t) => Some((i, *t)),
                _ => None,
            })
            .unwrap();
        let back = (exit..program.code.len())
            .find(|&i| matches!(program.code[i], Op::Jmp(t) if t <= exit))
            .unwrap();

        // The conditional exit lands exactly one past the back jump.
        assert_eq!(target, back + 1);
        assert!(matches!(program.code[target], Op::Lod(0, 4)));
    }

    #[test]
    fn test_if_else_patching() {
        let program =
            translate("var b ; begin if odd b then b := 1 else b := 2 ; write b end .").unwrap();

        let (cond, else_start) = program
            .code
            .iter()
            .enumerate()
            .find_map(|(i, op)| match op {
                Op::Jpc(t) => Some((i, *t)),
                _ => None,
            })
            .unwrap();

        // The instruction before the else branch skips over it.
        let Op::Jmp(join) = program.code[else_start - 1] else {
            panic!("expected a jump over the else branch");
        };
        assert!(cond < else_start);
        assert!(join > else_start);
        assert!(matches!(program.code[join], Op::Lod(0, 4)));
    }

    #[test]
    fn test_block_header_jump_skips_procedure_bodies() {
        let program =
            translate("var b ; procedure p ( ) ; b := 1 ; begin call p ( ) ; write b end .")
                .unwrap();

        let Op::Jmp(target) = program.code[0] else {
            panic!("expected a block header jump");
        };
        // Everything between the header jump and its target belongs to
        // the procedure body, which ends in a return.
        assert!(matches!(program.code[target - 1], Op::Opr(Operation::Ret)));
        assert!(matches!(program.code[target], Op::Inc(5)));
    }

    #[test]
    fn test_procedure_entry_and_call_levels() {
        let program =
            translate("var g ; procedure setg ( v ) ; g := v ; begin call setg ( 42 ) end .")
                .unwrap();

        // Body stores to the enclosing frame through one static hop.
        assert!(program.code.contains(&Op::Sto(1, 4)));
        // The call targets the procedure's own header jump at level 0.
        assert!(program.code.contains(&Op::Cal(0, 1)));
    }

    #[test]
    fn test_call_arguments_copied_into_pending_frame() {
        let program = translate(
            "var b ; procedure add2 ( x , y ) ; return := x + y ; \
             begin b := call add2 ( 1 , 2 ) ; write b end .",
        )
        .unwrap();

        // Two stores counting down into the pending frame's slots 5, 4
        // relative to the caller frame: depth 7 and 6 plus header.
        let stores: Vec<&Op> = program
            .code
            .iter()
            .filter(|op| matches!(op, Op::Sto(0, m) if *m >= 8))
            .collect();
        assert_eq!(stores, vec![&Op::Sto(0, 10), &Op::Sto(0, 9)]);

        // A call in factor position recovers the return value.
        let cal = program
            .code
            .iter()
            .position(|op| matches!(op, Op::Cal(..)))
            .unwrap();
        assert_eq!(program.code[cal + 1], Op::Inc(1));
    }

    #[test]
    fn test_arity_mismatch_is_a_translation_error() {
        let err = translate(
            "var b ; procedure p ( x , y ) ; return := x + y ; \
             begin b := call p ( 1 , 2 , 3 ) end .",
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::ArityMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_undeclared_identifier() {
        let err = translate("begin x := 1 end .").unwrap_err();
        assert_eq!(err, CompileError::UndeclaredIdentifier("x".to_string()));
    }

    #[test]
    fn test_assignment_to_constant() {
        let err = translate("const a = 1 ; a := 2 .").unwrap_err();
        assert_eq!(err, CompileError::AssignmentToNonVariable("a".to_string()));
    }

    #[test]
    fn test_call_of_variable() {
        let err = translate("var v ; call v ( ) .").unwrap_err();
        assert_eq!(err, CompileError::CallOfNonProcedure("v".to_string()));
    }

    #[test]
    fn test_procedure_in_expression() {
        let err =
            translate("var b ; procedure p ( ) ; b := 1 ; b := p + 1 .").unwrap_err();
        assert_eq!(err, CompileError::ProcedureInExpression("p".to_string()));
    }

    #[test]
    fn test_number_too_large() {
        let err = translate("var b ; b := 100000 .").unwrap_err();
        assert_eq!(err, CompileError::NumberTooLarge(100_000));
    }

    #[test]
    fn test_identifier_too_long() {
        let err = translate("var averylongname .").unwrap_err();
        assert_eq!(
            err,
            CompileError::IdentifierTooLong("averylongname".to_string())
        );
    }

    // Decision point: a same-scope redeclaration is reported instead of
    // silently dropped.
    #[test]
    fn test_redeclaration_is_a_translation_error() {
        let err = translate("var x , x ; x := 1 .").unwrap_err();
        assert!(matches!(err, CompileError::AlreadyDeclared(_)));

        let err = translate("const a = 1 ; var a ; a := 2 .").unwrap_err();
        assert!(matches!(err, CompileError::AlreadyDeclared(_)));
    }

    #[test]
    fn test_shadowing_across_levels_is_allowed() {
        // The parameter x shadows the outer variable x inside the body.
        let program = translate(
            "var x ; procedure p ( x ) ; x := x + 1 ; begin x := 7 ; call p ( x ) end .",
        )
        .unwrap();
        // Inside the body both references resolve to the parameter.
        assert!(program.code.contains(&Op::Sto(0, 4)));
        assert!(!program.code.contains(&Op::Sto(1, 4)));
    }

    #[test]
    fn test_missing_then() {
        let err = translate("var b ; begin if b = 1 b := 2 end .").unwrap_err();
        assert_eq!(err, CompileError::ThenExpected);
    }

    #[test]
    fn test_missing_do() {
        let err = translate("var b ; begin while b < 1 b := 2 end .").unwrap_err();
        assert_eq!(err, CompileError::DoExpected);
    }

    #[test]
    fn test_missing_relational_operator() {
        let err = translate("var b ; begin if b 1 then b := 2 end .").unwrap_err();
        assert_eq!(err, CompileError::RelationalOperatorExpected);
    }

    #[test]
    fn test_missing_period() {
        let err = translate("var b ; b := 1 ;").unwrap_err();
        assert_eq!(err, CompileError::PeriodExpected);
    }

    #[test]
    fn test_const_with_becomes() {
        let err = translate("const a := 5 ; a := 1 .").unwrap_err();
        assert_eq!(err, CompileError::BecomesInConstDeclaration);
    }

    #[test]
    fn test_missing_end() {
        let err = translate("var b ; begin b := 1 .").unwrap_err();
        assert_eq!(err, CompileError::EndExpected);
    }

    #[test]
    fn test_truncated_stream() {
        let err = translate("var b ; b :=").unwrap_err();
        assert_eq!(err, CompileError::UnexpectedEnd);
    }

    #[test]
    fn test_unary_minus() {
        let program = translate("var b ; begin b := - 3 ; write b end .").unwrap();
        let lit = program.code.iter().position(|op| *op == Op::Lit(3)).unwrap();
        assert_eq!(program.code[lit + 1], Op::Opr(Operation::Neg));
    }

    #[test]
    fn test_net_stack_effect_is_zero_without_procedures() {
        for source in [
            "const a = 5 ; var b ; begin b := a + 3 ; write b end .",
            "var b ; begin b := 0 ; if odd b then b := 1 else b := 2 ; write b end .",
            "var n , s ; begin n := 3 ; s := 0 ; \
             while n > 0 do begin s := s + n ; n := n - 1 end ; write s end .",
        ] {
            let program = translate(source).unwrap();
            // Skip the header jump and frame reservation, stop at the halt.
            let mut depth: i64 = 0;
            for op in &program.code[2..] {
                match op {
                    Op::Sio(IoRequest::Halt) => break,
                    Op::Lit(_) | Op::Lod(..) | Op::Sio(IoRequest::Read) => depth += 1,
                    Op::Sto(..) | Op::Jpc(_) | Op::Sio(IoRequest::Write) => depth -= 1,
                    Op::Inc(n) => depth += n,
                    Op::Opr(Operation::Neg) | Op::Opr(Operation::Odd) => {}
                    Op::Opr(_) => depth -= 1,
                    Op::Jmp(_) | Op::Cal(..) => {}
                }
            }
            assert_eq!(depth, 0, "net stack effect of {:?}", source);
        }
    }
}
