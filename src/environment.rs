use std::fmt;
use lalrpop_util::ParseError;
use thiserror::Error;
use crate::lexer::{LexicalError, Tok};
use crate::sym_table::SymbolTable;

pub struct Environment {
    pub sym_table: SymbolTable,
    pub warnings: Vec<FrontendWarning>,
}
impl Environment {
    pub fn new() -> Self {
        Environment {
            sym_table: SymbolTable::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error("syntax error: {message} at line {line}")]
    Syntax { line: usize, message: String },
    #[error("variable '{name}' redefined on line {line} (first defined on line {first_line})")]
    Redefinition { name: String, line: usize, first_line: usize },
    #[error("variable '{name}' used before definition on line {line}")]
    UndefinedVariable { name: String, line: usize },
}

impl From<ParseError<usize, Tok, LexicalError>> for FrontendError {
    fn from(err: ParseError<usize, Tok, LexicalError>) -> Self {
        match err {
            ParseError::User { error } => FrontendError::Lexical(error),
            ParseError::InvalidToken { location } => FrontendError::Syntax {
                line: location,
                message: "invalid token".to_string(),
            },
            ParseError::UnrecognizedEOF { location, expected } => FrontendError::Syntax {
                line: location,
                message: format!("unexpected end of input, expected {}", expected.join(", ")),
            },
            ParseError::UnrecognizedToken { token: (line, tok, _), expected } => {
                let message = if expected.is_empty() {
                    format!("unexpected token \"{}\"", tok)
                } else {
                    format!("unexpected token \"{}\", expected {}", tok, expected.join(", "))
                };
                FrontendError::Syntax { line, message }
            },
            ParseError::ExtraToken { token: (line, tok, _) } => FrontendError::Syntax {
                line,
                message: format!("unexpected extra token \"{}\" after program", tok),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendWarning {
    UnusedVariable { name: String, line: usize },
}

impl fmt::Display for FrontendWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendWarning::UnusedVariable { name, line } => {
                write!(f, "variable '{}' defined on line {} but never used", name, line)
            },
        }
    }
}

pub trait SemanticCheck {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError>;
}
