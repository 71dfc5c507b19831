use tracing::{debug, warn};
use crate::ast::*;
use crate::environment::*;

/// Run static semantics over the tree. Errors stop at the first offence;
/// unused declarations come back as warnings.
pub fn check_program(program: &Program) -> Result<Vec<FrontendWarning>, FrontendError> {
    let mut env = Environment::new();
    program.check(&mut env)?;
    for entry in env.sym_table.unused() {
        let warning = FrontendWarning::UnusedVariable {
            name: entry.name.clone(),
            line: entry.def_line,
        };
        warn!("{}", warning);
        env.warnings.push(warning);
    }
    debug!(warnings = env.warnings.len(), "static semantics passed");
    Ok(env.warnings)
}

impl SemanticCheck for Program {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        self.vars.check(env)?;
        self.block.check(env)
    }
}

impl SemanticCheck for VarDecl {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        for var_def in self.var_defs.iter() {
            env.sym_table.insert_var(&var_def.ident)?;
        }
        Ok(())
    }
}

impl SemanticCheck for Block {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        self.vars.check(env)?;
        for stmt in self.stmts.iter() {
            stmt.check(env)?;
        }
        Ok(())
    }
}

impl SemanticCheck for Stmt {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        match self {
            Stmt::Read(ident) => env.sym_table.mark_used(ident),
            Stmt::Print(exp) => exp.check(env),
            Stmt::Block(block) => block.check(env),
            Stmt::If(cond, body) | Stmt::While(cond, body) => {
                cond.check(env)?;
                body.check(env)
            },
            Stmt::Assign(ident, exp) => {
                env.sym_table.mark_used(ident)?;
                exp.check(env)
            },
        }
    }
}

impl SemanticCheck for Cond {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        env.sym_table.mark_used(&self.left)?;
        self.right.check(env)
    }
}

impl SemanticCheck for Exp {
    fn check(&self, env: &mut Environment) -> Result<(), FrontendError> {
        match self {
            Exp::Num(_) => Ok(()),
            Exp::LVal(ident) => env.sym_table.mark_used(ident),
            Exp::Neg(_, exp) => exp.check(env),
            Exp::BinaryExp(_, lhs, rhs) => {
                lhs.check(env)?;
                rhs.check(env)
            },
        }
    }
}
