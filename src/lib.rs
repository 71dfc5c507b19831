//! Compiler from the block language to accumulator-machine assembly.
//!
//! - `lexer` turns source text into line-tagged tokens.
//! - `grammar` (generated by LALRPOP) builds the typed tree in `ast`.
//! - `sem_check` validates declarations against `sym_table`.
//! - `backend` lowers the checked tree to an `AccProgram` listing.

pub mod ast;
pub mod backend;
pub mod environment;
pub mod error;
pub mod label_gen;
pub mod lexer;
pub mod sem_check;
pub mod sym_table;

use lalrpop_util::lalrpop_mod;
use tracing::debug;
use crate::ast::Program;
use crate::backend::asm::AccProgram;
use crate::environment::{FrontendError, FrontendWarning};
use crate::lexer::Lexer;

lalrpop_mod!(pub grammar);

pub use error::{CompileError, CompileResult};

#[derive(Debug)]
pub struct Compilation {
    pub asm: AccProgram,
    pub warnings: Vec<FrontendWarning>,
}

pub fn parse(src: &str) -> Result<Program, FrontendError> {
    let program = grammar::ProgramParser::new().parse(Lexer::new(src))?;
    debug!("parse finished");
    Ok(program)
}

/// Run the whole pipeline. Warnings travel with the listing; any error
/// aborts before a listing exists.
pub fn compile(src: &str) -> CompileResult<Compilation> {
    let program = parse(src)?;
    let warnings = sem_check::check_program(&program)?;
    let asm = backend::generate_asm(&program)?;
    Ok(Compilation { asm, warnings })
}
