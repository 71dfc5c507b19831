//! Reference interpreter for accumulator listings, used by the tests to
//! check what generated code does rather than only how it reads.

use std::collections::HashMap;
use crate::ast::Number;
use crate::backend::asm::{AccBinaryOp, AccProgram, Inst, Operand, SignTest};

const STEP_LIMIT: usize = 1_000_000;

/// Execute `asm`, feeding `READ` from `input` in order. Returns every value
/// written. Panics on malformed listings, exhausted input or a runaway loop.
pub fn run(asm: &AccProgram, input: &[Number]) -> Vec<Number> {
    let insts = &asm.text.insts;
    let mut labels = HashMap::new();
    for (i, inst) in insts.iter().enumerate() {
        if let Inst::Label(label) = inst {
            labels.insert(label.as_str(), i);
        }
    }
    let mut memory: HashMap<&str, Number> = asm
        .data
        .vars
        .iter()
        .chain(asm.data.temps.iter())
        .map(|name| (name.as_str(), 0))
        .collect();

    let mut acc: Number = 0;
    let mut input = input.iter();
    let mut output = Vec::new();
    let mut pc = 0;
    let mut steps = 0;
    while pc < insts.len() {
        steps += 1;
        assert!(steps <= STEP_LIMIT, "step limit exceeded");
        let mut next = pc + 1;
        match &insts[pc] {
            Inst::Load(Operand::Imm(value)) => acc = *value,
            Inst::Load(Operand::Name(name)) => acc = load(&memory, name),
            Inst::Store(name) => {
                *memory.get_mut(name.as_str()).unwrap_or_else(|| panic!("no storage for {}", name)) = acc;
            },
            Inst::Binary(op, name) => {
                let rhs = load(&memory, name);
                acc = match op {
                    AccBinaryOp::Add => acc.wrapping_add(rhs),
                    AccBinaryOp::Sub => acc.wrapping_sub(rhs),
                    AccBinaryOp::Mult => acc.wrapping_mul(rhs),
                    AccBinaryOp::Div => acc / rhs,
                };
            },
            Inst::Read(name) => {
                let value = *input.next().expect("input exhausted");
                *memory.get_mut(name.as_str()).unwrap_or_else(|| panic!("no storage for {}", name)) = value;
            },
            Inst::Write(name) => output.push(load(&memory, name)),
            Inst::Br(label) => next = labels[label.as_str()],
            Inst::BrIf(test, label) => {
                let taken = match test {
                    SignTest::Neg => acc < 0,
                    SignTest::Pos => acc > 0,
                    SignTest::Zero => acc == 0,
                };
                if taken {
                    next = labels[label.as_str()];
                }
            },
            Inst::Label(_) => {},
            Inst::Stop => break,
        }
        pc = next;
    }
    output
}

fn load(memory: &HashMap<&str, Number>, name: &str) -> Number {
    *memory.get(name).unwrap_or_else(|| panic!("no storage for {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::asm::{DataSection, TextSection};

    #[test]
    fn test_branches_keep_accumulator() {
        let asm = AccProgram {
            text: TextSection {
                insts: vec![
                    Inst::Load(Operand::Imm(-3)),
                    Inst::BrIf(SignTest::Pos, "skip".to_string()),
                    Inst::BrIf(SignTest::Zero, "skip".to_string()),
                    Inst::Store("x".to_string()),
                    Inst::Write("x".to_string()),
                    Inst::Label("skip".to_string()),
                    Inst::Stop,
                ],
            },
            data: DataSection { vars: vec!["x".to_string()], temps: Vec::new() },
        };
        assert_eq!(run(&asm, &[]), vec![-3]);
    }
}
