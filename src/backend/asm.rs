use std::fmt;
use crate::ast::Number;

#[derive(Debug)]
pub struct AccProgram {
    pub text: TextSection,
    pub data: DataSection,
}
#[derive(Debug)]
pub struct TextSection {
    pub insts: Vec<Inst>,
}
/// Declared variables first, then temporaries in creation order.
#[derive(Debug)]
pub struct DataSection {
    pub vars: Vec<String>,
    pub temps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccBinaryOp {
    Add,
    Sub,
    Mult,
    Div,
}

/// Sign tests on the accumulator, the only conditional branches available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignTest {
    Neg,
    Pos,
    Zero,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Name(String),
    Imm(Number),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Load(Operand),
    Store(String),
    Binary(AccBinaryOp, String),
    Read(String),
    Write(String),
    Br(String),
    BrIf(SignTest, String),
    Label(String),
    Stop,
}

impl Inst {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Inst::Binary(_, _))
    }
}

impl fmt::Display for AccBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccBinaryOp::Add => "ADD",
            AccBinaryOp::Sub => "SUB",
            AccBinaryOp::Mult => "MULT",
            AccBinaryOp::Div => "DIV",
        })
    }
}

impl fmt::Display for SignTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignTest::Neg => "BRNEG",
            SignTest::Pos => "BRPOS",
            SignTest::Zero => "BRZERO",
        })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(name) => f.write_str(name),
            Operand::Imm(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Load(operand) => write!(f, "LOAD {}", operand),
            Inst::Store(name) => write!(f, "STORE {}", name),
            Inst::Binary(op, name) => write!(f, "{} {}", op, name),
            Inst::Read(name) => write!(f, "READ {}", name),
            Inst::Write(name) => write!(f, "WRITE {}", name),
            Inst::Br(label) => write!(f, "BR {}", label),
            Inst::BrIf(test, label) => write!(f, "{} {}", test, label),
            Inst::Label(label) => write!(f, "{}: NOOP", label),
            Inst::Stop => f.write_str("STOP"),
        }
    }
}

impl fmt::Display for AccProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in self.text.insts.iter() {
            writeln!(f, "{}", inst)?;
        }
        for name in self.data.vars.iter().chain(self.data.temps.iter()) {
            writeln!(f, "{} 0", name)?;
        }
        Ok(())
    }
}
