use tracing::debug;
use crate::ast::*;
use crate::backend::asm::{AccBinaryOp, Inst, Operand, SignTest};
use crate::backend::environment::{BackendError, Environment};

pub trait CodeGen {
    type Output;
    fn code_gen(&self, env: &mut Environment) -> Result<Self::Output, BackendError>;
}

impl CodeGen for Program {
    type Output = ();
    fn code_gen(&self, env: &mut Environment) -> Result<Self::Output, BackendError> {
        // declarations emit no code, their storage is laid out by `finish`
        self.block.code_gen(env)?;
        env.emit(Inst::Stop);
        Ok(())
    }
}

impl CodeGen for Block {
    type Output = ();
    fn code_gen(&self, env: &mut Environment) -> Result<Self::Output, BackendError> {
        for stmt in self.stmts.iter() {
            stmt.code_gen(env)?;
        }
        Ok(())
    }
}

impl CodeGen for Stmt {
    type Output = ();
    fn code_gen(&self, env: &mut Environment) -> Result<Self::Output, BackendError> {
        match self {
            Stmt::Read(ident) => {
                let dest = env.operand(&ident.name)?;
                env.emit(Inst::Read(dest));
            },
            Stmt::Print(exp) => {
                let value = exp.code_gen(env)?;
                env.emit(Inst::Write(value));
            },
            Stmt::Block(block) => {
                block.code_gen(env)?;
            },
            Stmt::If(cond, body) => {
                let end_label = env.new_label("if_end");
                debug!(label = %end_label, "lowering if");
                cond.code_gen_false_branch(env, &end_label)?;
                body.code_gen(env)?;
                env.emit(Inst::Label(end_label));
            },
            Stmt::While(cond, body) => {
                let top_label = env.new_label("while_top");
                let end_label = env.new_label("while_end");
                debug!(top = %top_label, end = %end_label, "lowering while");
                env.emit(Inst::Label(top_label.clone()));
                cond.code_gen_false_branch(env, &end_label)?;
                body.code_gen(env)?;
                env.emit(Inst::Br(top_label));
                env.emit(Inst::Label(end_label));
            },
            Stmt::Assign(ident, exp) => {
                let value = exp.code_gen(env)?;
                let dest = env.operand(&ident.name)?;
                env.add_load(Operand::Name(value));
                env.add_store(dest);
            },
        }
        Ok(())
    }
}

impl Cond {
    /// Leave `left - right` in the accumulator and branch to `false_label`
    /// exactly when the comparison does not hold. Falls through otherwise.
    pub fn code_gen_false_branch(&self, env: &mut Environment, false_label: &str) -> Result<(), BackendError> {
        let right = self.right.code_gen(env)?;
        let left = env.operand(&self.left.name)?;
        env.add_load(Operand::Name(left));
        env.emit(Inst::Binary(AccBinaryOp::Sub, right));
        for &test in false_branch_tests(self.op.value) {
            env.emit(Inst::BrIf(test, false_label.to_string()));
        }
        Ok(())
    }
}

/// Sign tests on `d = left - right` that fire exactly when `op` is false.
fn false_branch_tests(op: RelOp) -> &'static [SignTest] {
    match op {
        RelOp::Gt => &[SignTest::Neg, SignTest::Zero],
        RelOp::Ge => &[SignTest::Neg],
        RelOp::Lt => &[SignTest::Pos, SignTest::Zero],
        RelOp::Le => &[SignTest::Pos],
        RelOp::Eq => &[SignTest::Neg, SignTest::Pos],
        RelOp::Neq => &[SignTest::Zero],
    }
}

impl CodeGen for Exp {
    type Output = String;
    fn code_gen(&self, env: &mut Environment) -> Result<Self::Output, BackendError> {
        match self {
            Exp::Num(lit) => {
                let temp = env.new_temp();
                env.add_load(Operand::Imm(lit.value));
                env.add_store(temp.clone());
                Ok(temp)
            },
            Exp::LVal(ident) => env.operand(&ident.name),
            Exp::Neg(_, exp) => {
                let value = exp.code_gen(env)?;
                let temp = env.new_temp();
                env.add_load(Operand::Imm(0));
                env.emit(Inst::Binary(AccBinaryOp::Sub, value));
                env.add_store(temp.clone());
                Ok(temp)
            },
            Exp::BinaryExp(op, lhs, rhs) => {
                let lhs_val = lhs.code_gen(env)?;
                let rhs_val = rhs.code_gen(env)?;
                let res = match op.value {
                    BinaryOp::Add => env.add_binary_inst(AccBinaryOp::Add, lhs_val, rhs_val),
                    BinaryOp::Sub => env.add_binary_inst(AccBinaryOp::Sub, lhs_val, rhs_val),
                    BinaryOp::Mul => env.add_binary_inst(AccBinaryOp::Mult, lhs_val, rhs_val),
                    // no remainder instruction: r = lhs - (lhs / rhs) * rhs
                    BinaryOp::Mod => {
                        let quot = env.add_binary_inst(AccBinaryOp::Div, lhs_val.clone(), rhs_val.clone());
                        let prod = env.add_binary_inst(AccBinaryOp::Mult, quot, rhs_val);
                        env.add_binary_inst(AccBinaryOp::Sub, lhs_val, prod)
                    },
                };
                Ok(res)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::generate_asm;
    use crate::backend::sim::run;
    use crate::parse;

    fn asm_lines(src: &str) -> Vec<String> {
        let program = parse(src).unwrap();
        let asm = generate_asm(&program).unwrap();
        asm.to_string().lines().map(str::to_string).collect()
    }

    fn run_src(src: &str, input: &[Number]) -> Vec<Number> {
        let program = parse(src).unwrap();
        let asm = generate_asm(&program).unwrap();
        run(&asm, input)
    }

    #[test]
    fn test_assign_precedence() {
        let lines = asm_lines("start var id_1 ~ 0 : { set id_1 ~ 3 + 4 * 2 : } trats");
        let expected = vec![
            "LOAD 3", "STORE T0",
            "LOAD 4", "STORE T1",
            "LOAD 2", "STORE T2",
            "LOAD T1", "MULT T2", "STORE T3",
            "LOAD T0", "ADD T3", "STORE T4",
            "LOAD T4", "STORE id_1",
            "STOP",
            "id_1 0", "T0 0", "T1 0", "T2 0", "T3 0", "T4 0",
        ];
        assert_eq!(lines, expected);
        assert_eq!(run_src("start var id_1 ~ 0 : { set id_1 ~ 3 + 4 * 2 : print id_1 : } trats", &[]), vec![11]);
    }

    #[test]
    fn test_storage_declared_once() {
        let src = "start var id_a ~ 5 id_b ~ 6 :\n\
                   { var id_c ~ 1 : read id_a : read id_a : print id_a : set id_b ~ id_a : \
                   { print id_b : read id_c : } print 7 : } trats";
        let program = parse(src).unwrap();
        let asm = generate_asm(&program).unwrap();
        assert_eq!(asm.data.vars, vec!["id_a", "id_b", "id_c"]);
        assert_eq!(asm.data.temps, vec!["T0"]);
        let text = asm.to_string();
        for name in ["id_a", "id_b", "id_c", "T0"] {
            let entries = text.lines().filter(|l| *l == format!("{} 0", name)).count();
            assert_eq!(entries, 1, "storage for {}", name);
        }
        let storage_start = text.lines().position(|l| l == "STOP").unwrap();
        assert_eq!(text.lines().count(), storage_start + 1 + 4);
    }

    #[test]
    fn test_literal_values_survive() {
        let src = "start var id_a ~ 0 : { print 42 : set id_a ~ 12345678 : print id_a : print 0 : } trats";
        assert_eq!(run_src(src, &[]), vec![42, 12345678, 0]);
    }

    #[test]
    fn test_one_arithmetic_inst_per_operator() {
        let src = "start var id_a ~ 0 id_b ~ 0 : \
                   { print id_a - -(id_b + 2) * 3 - id_a : } trats";
        let program = parse(src).unwrap();
        let asm = generate_asm(&program).unwrap();
        // three binary minus/plus, one multiply, one unary minus
        let arith = asm.text.insts.iter().filter(|inst| inst.is_arithmetic()).count();
        assert_eq!(arith, 5);
    }

    #[test]
    fn test_modulo_sequence() {
        let lines = asm_lines("start var id_a ~ 0 id_b ~ 0 : { print id_a % id_b : } trats");
        let expected = vec![
            "LOAD id_a", "DIV id_b", "STORE T0",
            "LOAD T0", "MULT id_b", "STORE T1",
            "LOAD id_a", "SUB T1", "STORE T2",
            "WRITE T2",
            "STOP",
        ];
        assert_eq!(&lines[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_modulo_truncates() {
        let src = "start var id_a ~ 0 id_b ~ 0 : { read id_a : read id_b : print id_a % id_b : } trats";
        for (a, b) in [(17, 5), (-17, 5), (17, -5), (-17, -5), (4, 4), (0, 3), (3, 7)] {
            assert_eq!(run_src(src, &[a, b]), vec![a - (a / b) * b], "{} % {}", a, b);
        }
    }

    #[test]
    fn test_relational_round_trip() {
        let ops: [(&str, fn(Number, Number) -> bool); 6] = [
            (">", |l, r| l > r),
            (">=", |l, r| l >= r),
            ("<", |l, r| l < r),
            ("<=", |l, r| l <= r),
            ("eq", |l, r| l == r),
            ("neq", |l, r| l != r),
        ];
        for (symbol, holds) in ops {
            let src = format!(
                "start var id_l ~ 0 id_r ~ 0 : \
                 {{ read id_l : read id_r : if [ id_l {} id_r ] print 1 : print 0 : }} trats",
                symbol
            );
            for left in [-4, 0, 4] {
                for right in [-4, 0, 4] {
                    let expected = if holds(left, right) { vec![1, 0] } else { vec![0] };
                    assert_eq!(run_src(&src, &[left, right]), expected, "{} {} {}", left, symbol, right);
                }
            }
        }
    }

    #[test]
    fn test_branch_counts_per_operator() {
        for (symbol, branches) in [(">", 2), (">=", 1), ("<", 2), ("<=", 1), ("eq", 2), ("neq", 1)] {
            let src = format!("start var id_a ~ 0 : {{ if [ id_a {} 1 ] read id_a : }} trats", symbol);
            let program = parse(&src).unwrap();
            let asm = generate_asm(&program).unwrap();
            let count = asm.text.insts.iter().filter(|inst| matches!(inst, Inst::BrIf(_, _))).count();
            assert_eq!(count, branches, "operator {}", symbol);
        }
    }

    #[test]
    fn test_if_shape() {
        let lines = asm_lines("start var id_a ~ 0 : { read id_a : if [ id_a > 10 ] print id_a : } trats");
        let expected = vec![
            "READ id_a",
            "LOAD 10", "STORE T0",
            "LOAD id_a", "SUB T0",
            "BRNEG if_end0", "BRZERO if_end0",
            "WRITE id_a",
            "if_end0: NOOP",
            "STOP",
            "id_a 0", "T0 0",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_while_shape() {
        let src = "start var id_a ~ 0 : { read id_a : \
                   while [ id_a > 0 ] { print id_a : set id_a ~ id_a - 1 : } } trats";
        let expected = vec![
            "READ id_a",
            "while_top0: NOOP",
            "LOAD 0", "STORE T0",
            "LOAD id_a", "SUB T0",
            "BRNEG while_end1", "BRZERO while_end1",
            "WRITE id_a",
            "LOAD 1", "STORE T1",
            "LOAD id_a", "SUB T1", "STORE T2",
            "LOAD T2", "STORE id_a",
            "BR while_top0",
            "while_end1: NOOP",
            "STOP",
            "id_a 0", "T0 0", "T1 0", "T2 0",
        ];
        assert_eq!(asm_lines(src), expected);
        assert_eq!(run_src(src, &[3]), vec![3, 2, 1]);
        assert_eq!(run_src(src, &[0]), Vec::<Number>::new());
        assert_eq!(run_src(src, &[-2]), Vec::<Number>::new());
    }

    #[test]
    fn test_nested_control_flow() {
        let src = "start var id_i ~ 0 id_n ~ 0 id_r ~ 0 : { read id_n : set id_i ~ 0 : \
                   while [ id_i < id_n ] { set id_r ~ id_i % 2 : \
                   if [ id_r eq 0 ] print id_i : set id_i ~ id_i + 1 : } } trats";
        assert_eq!(run_src(src, &[7]), vec![0, 2, 4, 6]);
        let lines = asm_lines(src);
        assert!(lines.contains(&"while_top0: NOOP".to_string()));
        assert!(lines.contains(&"while_end1: NOOP".to_string()));
        assert!(lines.contains(&"if_end2: NOOP".to_string()));
    }

    #[test]
    fn test_right_recursive_subtraction() {
        // exp -> M - exp groups to the right
        let src = "start var id_a ~ 0 : { print 10 - 4 - 3 : } trats";
        assert_eq!(run_src(src, &[]), vec![9]);
    }

    #[test]
    fn test_generation_is_repeatable() {
        let program = parse("start var id_a ~ 0 : { while [ id_a < 3 ] set id_a ~ id_a + 1 : } trats").unwrap();
        let first = generate_asm(&program).unwrap().to_string();
        let second = generate_asm(&program).unwrap().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_operand_is_internal_error() {
        // bypasses static semantics on purpose
        let program = parse("start { print id_q : } trats").unwrap();
        assert_eq!(
            generate_asm(&program).unwrap_err(),
            BackendError::UnknownOperand("id_q".to_string())
        );
    }
}
