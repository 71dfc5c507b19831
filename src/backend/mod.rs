pub mod asm;
pub mod environment;
pub mod code_gen;
#[cfg(test)]
pub mod sim;

use std::collections::HashSet;
use tracing::debug;
use crate::ast::Program;
use crate::backend::asm::{AccProgram, Inst};
use crate::backend::code_gen::CodeGen;
use crate::backend::environment::{BackendError, Environment};

/// Lower a checked program to accumulator assembly. Nothing is returned
/// unless the listing passes `verify`.
pub fn generate_asm(program: &Program) -> Result<AccProgram, BackendError> {
    let vars = program.declared_vars();
    let mut env = Environment::new(vars.iter().map(|ident| ident.name.as_str()));
    program.code_gen(&mut env)?;
    let asm = env.finish();
    verify(&asm)?;
    debug!(
        insts = asm.text.insts.len(),
        arith = asm.text.insts.iter().filter(|inst| inst.is_arithmetic()).count(),
        vars = asm.data.vars.len(),
        temps = asm.data.temps.len(),
        "code generation finished"
    );
    Ok(asm)
}

fn verify(asm: &AccProgram) -> Result<(), BackendError> {
    let mut storage = HashSet::new();
    for name in asm.data.vars.iter().chain(asm.data.temps.iter()) {
        if !storage.insert(name.as_str()) {
            return Err(BackendError::DuplicateStorage(name.clone()));
        }
    }

    let mut labels = HashSet::new();
    for inst in asm.text.insts.iter() {
        if let Inst::Label(label) = inst {
            if !labels.insert(label.as_str()) {
                return Err(BackendError::DuplicateLabel(label.clone()));
            }
        }
    }
    for inst in asm.text.insts.iter() {
        match inst {
            Inst::Br(target) | Inst::BrIf(_, target) => {
                if !labels.contains(target.as_str()) {
                    return Err(BackendError::UndefinedLabel(target.clone()));
                }
            },
            _ => {},
        }
    }
    Ok(())
}
