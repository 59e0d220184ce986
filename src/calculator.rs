use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, StatementError};
use crate::interpreter::{Binding, Environment, eval};
use crate::language::Expr;
use crate::lexer::{self, Token};
use crate::parser::Parser;

// ============================================================================
// Statement Classification
// ============================================================================

// Line shapes, tried in order. The body character class is the language's
// whole lexical alphabet, so classification never rejects a line the lexer
// could consume.
static PRINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$\s*[\\{}()A-Zunx 0-9]+$").unwrap());
static EAGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+\s*=\s*[\\{}()A-Zunx 0-9]+").unwrap());
static DEFERRED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+\s*=:\s*[\\{}()A-Zunx 0-9]+").unwrap());

/// One classified, parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `$ expr`: evaluate leniently and display the result.
    Print(Expr),
    /// `NAME = expr`: evaluate strictly now, bind the result.
    Assign { name: String, expr: Expr },
    /// `NAME =: expr`: bind the expression itself, unevaluated.
    AssignDeferred { name: String, expr: Expr },
}

impl Statement {
    /// Classify and parse one input line.
    pub fn parse(line: &str) -> Result<Statement, Error> {
        if PRINT_RE.is_match(line) {
            let tokens = lexer::tokenize(line)?;
            match tokens.split_first() {
                Some((Token::Print, body)) => Ok(Statement::Print(Parser::new().parse(body)?)),
                _ => Err(StatementError::MalformedPrint.into()),
            }
        } else if EAGER_RE.is_match(line) || DEFERRED_RE.is_match(line) {
            let tokens = lexer::tokenize(line)?;
            match tokens.as_slice() {
                [Token::Ident(name), marker @ (Token::Equals | Token::DeferredEquals), body @ ..] =>
                {
                    let expr = Parser::new().parse(body)?;
                    if *marker == Token::Equals {
                        Ok(Statement::Assign {
                            name: name.clone(),
                            expr,
                        })
                    } else {
                        Ok(Statement::AssignDeferred {
                            name: name.clone(),
                            expr,
                        })
                    }
                }
                _ => Err(StatementError::MalformedAssignment.into()),
            }
        } else {
            Err(StatementError::Unrecognized.into())
        }
    }
}

// ============================================================================
// Calculator
// ============================================================================

/// A calculator session: one environment plus the statement dispatch around
/// it.
///
/// Statements are all-or-nothing. A failing parse or evaluation returns
/// before the environment changes, so an interactive session can report the
/// error and keep going with its state intact.
#[derive(Debug, Default)]
pub struct Calculator {
    env: Environment,
}

impl Calculator {
    pub fn new() -> Self {
        Calculator::default()
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Execute one classified statement. Print statements return the value
    /// to display; assignments return `None`.
    pub fn execute(&mut self, statement: Statement) -> Result<Option<Expr>, Error> {
        match statement {
            Statement::Print(expr) => {
                let value = eval(&expr, &self.env, false)?;
                debug!(value = %value, "print");
                Ok(Some(value))
            }
            Statement::Assign { name, expr } => {
                // Strict: any unbound name fails the whole assignment before
                // the environment is touched.
                let value = eval(&expr, &self.env, true)?;
                debug!(name = %name, value = %value, "bind");
                self.env.define(name, Binding::Value(value));
                Ok(None)
            }
            Statement::AssignDeferred { name, expr } => {
                debug!(name = %name, expr = %expr, "bind deferred");
                self.env.define(name, Binding::Deferred(expr));
                Ok(None)
            }
        }
    }

    /// Classify, parse, and execute one input line.
    pub fn eval_line(&mut self, line: &str) -> Result<Option<Expr>, Error> {
        self.execute(Statement::parse(line)?)
    }
}
