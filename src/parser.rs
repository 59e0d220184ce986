use crate::error::{Error, ParseError};
use crate::language::{ElementSet, Expr, OpKind};
use crate::lexer::{self, Token};

// ============================================================================
// Parser
// ============================================================================

/// One entry on the shift/apply stack.
#[derive(Debug)]
enum StackEntry {
    /// A `{` waiting for its matching `}`.
    OpenBrace,
    /// A `(` waiting for its matching `)`.
    OpenParen,
    /// An operator waiting for the operand that follows it.
    Pending(OpKind),
    /// A completed operand.
    Operand(Expr),
}

/// Single-pass stack automaton over a token sequence.
///
/// There are no precedence levels: an operator immediately consumes the next
/// completed operand, so `A u B n C` groups as `(A u B) n C` and only
/// explicit parentheses or braces change the shape.
#[derive(Debug, Default)]
pub struct Parser {
    stack: Vec<StackEntry>,
}

impl Parser {
    pub fn new() -> Self {
        Parser { stack: Vec::new() }
    }

    /// Fold a completed operand into the stack: while the top is a pending
    /// operator, pop it with the operand beneath and chain the application;
    /// otherwise shift the operand.
    fn push_operand(&mut self, mut operand: Expr) -> Result<(), ParseError> {
        while let Some(StackEntry::Pending(_)) = self.stack.last() {
            let Some(StackEntry::Pending(kind)) = self.stack.pop() else {
                unreachable!();
            };
            match self.stack.pop() {
                Some(StackEntry::Operand(left)) => {
                    operand = Expr::op(kind, left, operand);
                }
                _ => return Err(ParseError::MissingOperand { op: kind.sign() }),
            }
        }
        self.stack.push(StackEntry::Operand(operand));
        Ok(())
    }

    fn close_brace(&mut self) -> Result<(), ParseError> {
        let mut elements = Vec::new();
        loop {
            match self.stack.pop() {
                Some(StackEntry::Operand(expr)) => elements.push(expr),
                Some(StackEntry::OpenBrace) => break,
                Some(StackEntry::OpenParen) | Some(StackEntry::Pending(_)) => {
                    return Err(ParseError::IncompleteSetElement);
                }
                None => return Err(ParseError::UnmatchedCloseBrace),
            }
        }
        // Elements were popped newest-first; restore source order before
        // deduplicating.
        let set: ElementSet = elements.into_iter().rev().collect();
        self.push_operand(Expr::Set(set))
    }

    fn close_paren(&mut self) -> Result<(), ParseError> {
        match (self.stack.pop(), self.stack.pop()) {
            (Some(StackEntry::Operand(expr)), Some(StackEntry::OpenParen)) => {
                self.push_operand(expr)
            }
            _ => Err(ParseError::UnmatchedParen),
        }
    }

    /// Run the automaton over a full token sequence. The sequence must
    /// reduce to exactly one completed expression.
    pub fn parse(&mut self, tokens: &[Token]) -> Result<Expr, ParseError> {
        self.stack.clear();

        for token in tokens {
            match token {
                Token::OpenBrace => self.stack.push(StackEntry::OpenBrace),
                Token::OpenParen => self.stack.push(StackEntry::OpenParen),
                Token::Op(kind) => self.stack.push(StackEntry::Pending(*kind)),
                Token::Int(value) => self.push_operand(Expr::Constant(*value))?,
                Token::Ident(name) => self.push_operand(Expr::Variable(name.clone()))?,
                Token::CloseBrace => self.close_brace()?,
                Token::CloseParen => self.close_paren()?,
                Token::Equals | Token::DeferredEquals | Token::Print => {
                    return Err(ParseError::UnexpectedToken {
                        token: token.to_string(),
                    });
                }
            }
        }

        let mut stack = std::mem::take(&mut self.stack);
        match (stack.pop(), stack.is_empty()) {
            (Some(StackEntry::Operand(expr)), true) => Ok(expr),
            (None, _) => Err(ParseError::EmptyExpression),
            _ => Err(ParseError::LeftoverInput),
        }
    }
}

/// Lex and parse a single expression.
pub fn parse(input: &str) -> Result<Expr, Error> {
    let tokens = lexer::tokenize(input)?;
    let expr = Parser::new().parse(&tokens)?;
    Ok(expr)
}
