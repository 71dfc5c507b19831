//! Lexical analysis: turns source text into tokens tagged with line numbers.
//!
//! `Lexer` is the iterator LALRPOP pulls from. Locations are line numbers, so
//! every spanned triple is `(line, tok, line)`. `tokenize` gives the
//! classified `Token` records used for the `--tokens` dump.

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::ast::Number;

const MAX_IDENT_LEN: usize = 8;
const MAX_INT_DIGITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    // keywords
    Start,
    Trats,
    While,
    Var,
    Exit,
    Read,
    Print,
    If,
    Then,
    Set,
    Func,
    Program,

    Ident(String),
    Int(Number),

    // operators and delimiters
    Eq,
    Neq,
    Le,
    Ge,
    Lt,
    Gt,
    Tilde,
    Colon,
    Semicolon,
    Plus,
    Minus,
    Star,
    Percent,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

static KEYWORDS: Lazy<HashMap<&'static str, Tok>> = Lazy::new(|| {
    HashMap::from([
        ("start", Tok::Start),
        ("trats", Tok::Trats),
        ("while", Tok::While),
        ("var", Tok::Var),
        ("exit", Tok::Exit),
        ("read", Tok::Read),
        ("print", Tok::Print),
        ("if", Tok::If),
        ("then", Tok::Then),
        ("set", Tok::Set),
        ("func", Tok::Func),
        ("program", Tok::Program),
        ("eq", Tok::Eq),
        ("neq", Tok::Neq),
    ])
});

impl Tok {
    pub fn kind(&self) -> TokenKind {
        match self {
            Tok::Ident(_) => TokenKind::Identifier,
            Tok::Int(_) => TokenKind::Integer,
            Tok::Start
            | Tok::Trats
            | Tok::While
            | Tok::Var
            | Tok::Exit
            | Tok::Read
            | Tok::Print
            | Tok::If
            | Tok::Then
            | Tok::Set
            | Tok::Func
            | Tok::Program => TokenKind::Keyword,
            _ => TokenKind::Operator,
        }
    }
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Tok::Ident(name) => return f.write_str(name),
            Tok::Int(value) => return write!(f, "{}", value),
            Tok::Start => "start",
            Tok::Trats => "trats",
            Tok::While => "while",
            Tok::Var => "var",
            Tok::Exit => "exit",
            Tok::Read => "read",
            Tok::Print => "print",
            Tok::If => "if",
            Tok::Then => "then",
            Tok::Set => "set",
            Tok::Func => "func",
            Tok::Program => "program",
            Tok::Eq => "eq",
            Tok::Neq => "neq",
            Tok::Le => "<=",
            Tok::Ge => ">=",
            Tok::Lt => "<",
            Tok::Gt => ">",
            Tok::Tilde => "~",
            Tok::Colon => ":",
            Tok::Semicolon => ";",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Percent => "%",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::LBracket => "[",
            Tok::RBracket => "]",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Keyword,
    Operator,
    EndOfFile,
}

impl TokenKind {
    fn short_name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "ID",
            TokenKind::Integer => "INT",
            TokenKind::Keyword => "KW",
            TokenKind::Operator => "OP",
            TokenKind::EndOfFile => "EOF",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.short_name(), self.lexeme, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error: {kind} at line {line}")]
pub struct LexicalError {
    pub line: usize,
    pub kind: LexicalErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalErrorKind {
    #[error("unterminated comment '#...#' on same line")]
    UnterminatedComment,
    #[error("identifier length exceeds 8 characters")]
    IdentTooLong,
    #[error("integer length exceeds 8 digits")]
    IntTooLong,
    #[error("invalid word token '{0}'")]
    InvalidWord(String),
    #[error("unrecognized character '{0}'")]
    UnrecognizedChar(char),
}

pub type Spanned = (usize, Tok, usize);

pub struct Lexer<'input> {
    chars: Peekable<Chars<'input>>,
    rest: &'input str,
    line: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            rest: input,
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.rest = &self.rest[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, kind: LexicalErrorKind) -> LexicalError {
        LexicalError { line: self.line, kind }
    }

    fn skip_whitespace(&mut self) -> Result<(), LexicalError> {
        while let Some(&c) = self.chars.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                },
                '#' => {
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('#') => break,
                            Some('\n') | None => {
                                return Err(self.error(LexicalErrorKind::UnterminatedComment))
                            },
                            Some(_) => {},
                        }
                    }
                },
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_ident(&mut self) -> Result<Tok, LexicalError> {
        let mut name = String::new();
        for _ in 0..3 {
            name.extend(self.bump());
        }
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            name.extend(self.bump());
            if name.len() > MAX_IDENT_LEN {
                return Err(self.error(LexicalErrorKind::IdentTooLong));
            }
        }
        Ok(Tok::Ident(name))
    }

    fn lex_int(&mut self) -> Result<Tok, LexicalError> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.extend(self.bump());
            if digits.len() > MAX_INT_DIGITS {
                return Err(self.error(LexicalErrorKind::IntTooLong));
            }
        }
        // eight decimal digits always fit in an i32
        let value = digits
            .parse::<Number>()
            .map_err(|_| self.error(LexicalErrorKind::IntTooLong))?;
        Ok(Tok::Int(value))
    }

    fn lex_word(&mut self) -> Result<Tok, LexicalError> {
        if self.rest.starts_with("id_") {
            return self.lex_ident();
        }
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            word.extend(self.bump());
        }
        KEYWORDS
            .get(word.as_str())
            .cloned()
            .ok_or_else(|| self.error(LexicalErrorKind::InvalidWord(word)))
    }

    fn lex_operator(&mut self, c: char) -> Result<Tok, LexicalError> {
        self.bump();
        let tok = match c {
            '<' | '>' if self.chars.peek() == Some(&'=') => {
                self.bump();
                if c == '<' {
                    Tok::Le
                } else {
                    Tok::Ge
                }
            },
            '<' => Tok::Lt,
            '>' => Tok::Gt,
            '~' => Tok::Tilde,
            ':' => Tok::Colon,
            ';' => Tok::Semicolon,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '%' => Tok::Percent,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '{' => Tok::LBrace,
            '}' => Tok::RBrace,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            _ => return Err(self.error(LexicalErrorKind::UnrecognizedChar(c))),
        };
        Ok(tok)
    }

    fn next_tok(&mut self) -> Option<Result<Spanned, LexicalError>> {
        if let Err(err) = self.skip_whitespace() {
            return Some(Err(err));
        }
        let c = *self.chars.peek()?;
        let tok = if c.is_ascii_digit() {
            self.lex_int()
        } else if c.is_ascii_alphabetic() {
            self.lex_word()
        } else {
            self.lex_operator(c)
        };
        Some(tok.map(|tok| (self.line, tok, self.line)))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tok()
    }
}

/// Lex the whole input into `Token` records terminated by an end-of-file token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexicalError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    for spanned in lexer.by_ref() {
        let (line, tok, _) = spanned?;
        tokens.push(Token {
            kind: tok.kind(),
            lexeme: tok.to_string(),
            line,
        });
    }
    tokens.push(Token {
        kind: TokenKind::EndOfFile,
        lexeme: String::new(),
        line: lexer.line,
    });
    Ok(tokens)
}
