//! Error taxonomy for the lex/parse/evaluate pipeline.
//!
//! Every failure surfaces to the statement-level caller; nothing is
//! recovered from silently, and a failed statement leaves the environment
//! untouched.

use thiserror::Error;

/// Lexing failure: input the tokenizer cannot consume.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// No rule matches at the current position. Carries everything that was
    /// left unconsumed.
    #[error("invalid input: \"{remainder}\"")]
    UnrecognizedInput { remainder: String },

    #[error("integer literal too large: {digits}")]
    IntegerTooLarge { digits: String },
}

/// Parsing failure: the token sequence violates the stack automaton's shape
/// rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("operator '{op}' has no left operand")]
    MissingOperand { op: char },

    #[error("'}}' with no matching '{{'")]
    UnmatchedCloseBrace,

    #[error("set literal closed over an incomplete element")]
    IncompleteSetElement,

    #[error("')' does not close a parenthesized expression")]
    UnmatchedParen,

    #[error("unexpected token '{token}' in expression")]
    UnexpectedToken { token: String },

    #[error("empty expression")]
    EmptyExpression,

    #[error("expression does not reduce to a single value")]
    LeftoverInput,
}

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Strict evaluation reached a name with no binding.
    #[error("unknown variable {name}")]
    UnboundVariable { name: String },

    /// A chain of deferred bindings resolved through too many names,
    /// almost certainly a self-referential definition.
    #[error("binding for {name} is too deeply self-referential")]
    RecursionLimit { name: String },
}

/// Statement-level failure: the input line does not have a recognized shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatementError {
    #[error("incorrect expression")]
    Unrecognized,

    #[error("incorrect assignment")]
    MalformedAssignment,

    #[error("incorrect print statement")]
    MalformedPrint,
}

/// Any failure a single input line can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Statement(#[from] StatementError),
}
