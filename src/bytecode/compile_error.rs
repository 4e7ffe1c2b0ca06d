use thiserror::Error;

use crate::symtab::Redeclaration;

/// Fatal translation errors. The first one encountered stops the
/// translation; no instruction sequence is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("use = instead of :=")]
    BecomesInConstDeclaration,

    #[error("= must be followed by a number")]
    NumberExpected,

    #[error("identifier must be followed by =")]
    EqualsExpected,

    #[error("const, var, procedure must be followed by an identifier")]
    IdentifierExpected,

    #[error("semicolon or comma missing")]
    SeparatorMissing,

    #[error("incorrect symbol after procedure declaration")]
    BadProcedureDeclaration,

    #[error("period expected")]
    PeriodExpected,

    #[error("undeclared identifier: {0}")]
    UndeclaredIdentifier(String),

    #[error("assignment to constant or procedure is not allowed: {0}")]
    AssignmentToNonVariable(String),

    #[error("assignment operator expected")]
    BecomesExpected,

    #[error("call must be followed by an identifier")]
    CallIdentifierExpected,

    #[error("call of a constant or variable is meaningless: {0}")]
    CallOfNonProcedure(String),

    #[error("then expected")]
    ThenExpected,

    #[error("semicolon expected after procedure body")]
    BlockSeparatorMissing,

    #[error("do expected")]
    DoExpected,

    #[error("end expected")]
    EndExpected,

    #[error("relational operator expected")]
    RelationalOperatorExpected,

    #[error("an expression must not contain a procedure identifier: {0}")]
    ProcedureInExpression(String),

    #[error("right parenthesis missing")]
    RightParenMissing,

    #[error("the preceding factor cannot begin with this symbol")]
    BadFactorStart,

    #[error("this number is too large: {0}")]
    NumberTooLarge(i64),

    #[error("identifier is too long: {0}")]
    IdentifierTooLong(String),

    #[error(transparent)]
    AlreadyDeclared(#[from] Redeclaration),

    #[error("procedure declaration is missing its parameter list")]
    ParameterListExpected,

    #[error("parameter identifier expected")]
    ParameterIdentifierExpected,

    #[error("identifier expected after read")]
    ReadIdentifierExpected,

    #[error("call is missing its argument list")]
    ArgumentListExpected,

    #[error("wrong number of arguments in call: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("integer value expected")]
    IntegerExpected,

    #[error("generated code exceeds {0} instructions")]
    CodeLimitExceeded(usize),

    #[error("unexpected end of token stream")]
    UnexpectedEnd,
}
