use std::collections::HashSet;
use thiserror::Error;
use crate::backend::asm::{AccBinaryOp, AccProgram, DataSection, Inst, Operand, TextSection};
use crate::label_gen::LabelGenerator;

/// State of one generation run. Built fresh by `generate_asm`, so nothing
/// leaks from one program into the next.
pub struct Environment {
    pub insts: Vec<Inst>,
    pub vars: Vec<String>,
    pub temps: Vec<String>,
    pub label_gen: LabelGenerator,
    declared: HashSet<String>,
}
impl Environment {
    pub fn new<'a>(vars: impl IntoIterator<Item = &'a str>) -> Self {
        let mut env = Environment {
            insts: Vec::new(),
            vars: Vec::new(),
            temps: Vec::new(),
            label_gen: LabelGenerator::new(),
            declared: HashSet::new(),
        };
        for name in vars {
            env.declared.insert(name.to_string());
            env.vars.push(name.to_string());
        }
        env
    }

    pub fn new_temp(&mut self) -> String {
        let name = format!("T{}", self.temps.len());
        self.declared.insert(name.clone());
        self.temps.push(name.clone());
        name
    }

    pub fn new_label(&mut self, name: &str) -> String {
        self.label_gen.get_label(name)
    }

    pub fn emit(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    /// Variables and temporaries are the only addressable storage.
    pub fn operand(&self, name: &str) -> Result<String, BackendError> {
        if self.declared.contains(name) {
            Ok(name.to_string())
        } else {
            Err(BackendError::UnknownOperand(name.to_string()))
        }
    }

    pub fn add_load(&mut self, operand: Operand) {
        self.emit(Inst::Load(operand));
    }

    pub fn add_store(&mut self, dest: String) {
        self.emit(Inst::Store(dest));
    }

    /// `LOAD lhs`, `op rhs`, `STORE` into a fresh temporary, which is returned.
    pub fn add_binary_inst(&mut self, op: AccBinaryOp, lhs: String, rhs: String) -> String {
        let res = self.new_temp();
        self.add_load(Operand::Name(lhs));
        self.emit(Inst::Binary(op, rhs));
        self.add_store(res.clone());
        res
    }

    pub fn finish(self) -> AccProgram {
        AccProgram {
            text: TextSection { insts: self.insts },
            data: DataSection { vars: self.vars, temps: self.temps },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("internal error: operand '{0}' is neither a declared variable nor a temporary")]
    UnknownOperand(String),
    #[error("internal error: branch to undefined label '{0}'")]
    UndefinedLabel(String),
    #[error("internal error: label '{0}' defined more than once")]
    DuplicateLabel(String),
    #[error("internal error: storage for '{0}' emitted more than once")]
    DuplicateStorage(String),
}
