use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub struct Program {
    pub vars: VarDecl,
    pub block: Rc<Block>,
}

#[derive(Debug, Default)]
pub struct VarDecl {
    pub var_defs: Vec<VarDef>,
}

/// `identifier ~ integer` inside a `var ... :` list.
#[derive(Debug)]
pub struct VarDef {
    pub ident: Ident,
    pub init: Located<Number>,
}

#[derive(Debug)]
pub struct Block {
    pub vars: VarDecl,
    pub stmts: Rc<Vec<Stmt>>,
}

#[derive(Debug)]
pub enum Stmt {
    Read(Ident),
    Print(Rc<Exp>),
    Block(Rc<Block>),
    If(Cond, Rc<Stmt>),
    While(Cond, Rc<Stmt>),
    Assign(Ident, Rc<Exp>),
}

/// The bracketed test of `if`/`while`: `[ identifier <relational> <exp> ]`.
#[derive(Debug)]
pub struct Cond {
    pub left: Ident,
    pub op: Located<RelOp>,
    pub right: Rc<Exp>,
}

#[derive(Debug)]
pub enum Exp {
    Num(Located<Number>),
    LVal(Ident),
    /// Carries the line of the minus sign.
    Neg(usize, Rc<Exp>),
    BinaryExp(Located<BinaryOp>, Rc<Exp>, Rc<Exp>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Neq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub line: usize,
}

/// A literal or operator token together with its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub line: usize,
}

pub type Number = i32;

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Mod => "%",
        }
    }
}

impl Exp {
    pub fn binary(op: BinaryOp, line: usize, lhs: Exp, rhs: Exp) -> Exp {
        Exp::BinaryExp(Located { value: op, line }, Rc::new(lhs), Rc::new(rhs))
    }
}

impl RelOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Eq => "eq",
            RelOp::Neq => "neq",
        }
    }
}

impl Program {
    /// Every declared name in declaration order, nested blocks included.
    pub fn declared_vars(&self) -> Vec<&Ident> {
        let mut vars = Vec::new();
        self.vars.collect(&mut vars);
        self.block.collect_vars(&mut vars);
        vars
    }
}

impl VarDecl {
    fn collect<'a>(&'a self, vars: &mut Vec<&'a Ident>) {
        vars.extend(self.var_defs.iter().map(|def| &def.ident));
    }
}

impl Block {
    fn collect_vars<'a>(&'a self, vars: &mut Vec<&'a Ident>) {
        self.vars.collect(vars);
        for stmt in self.stmts.iter() {
            stmt.collect_vars(vars);
        }
    }
}

impl Stmt {
    fn collect_vars<'a>(&'a self, vars: &mut Vec<&'a Ident>) {
        match self {
            Stmt::Block(block) => block.collect_vars(vars),
            Stmt::If(_, body) | Stmt::While(_, body) => body.collect_vars(vars),
            Stmt::Read(_) | Stmt::Print(_) | Stmt::Assign(_, _) => {},
        }
    }
}

// Parse tree dump: one node per line, two spaces of indent per level and
// tokens written as KIND:lexeme:line.
struct TreePrinter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl TreePrinter<'_, '_> {
    fn node(&mut self, depth: usize, label: &str, tokens: &[String]) -> fmt::Result {
        write!(self.f, "{}{}", "  ".repeat(depth), label)?;
        for token in tokens {
            write!(self.f, " {}", token)?;
        }
        writeln!(self.f)
    }

    fn vars(&mut self, depth: usize, vars: &VarDecl) -> fmt::Result {
        if vars.var_defs.is_empty() {
            return Ok(());
        }
        self.node(depth, "vars", &[])?;
        for def in vars.var_defs.iter() {
            self.node(depth + 1, "varDef", &[ident_token(&def.ident), token("INT", def.init.value, def.init.line)])?;
        }
        Ok(())
    }

    fn block(&mut self, depth: usize, block: &Block) -> fmt::Result {
        self.node(depth, "block", &[])?;
        self.vars(depth + 1, &block.vars)?;
        self.node(depth + 1, "stats", &[])?;
        for stmt in block.stmts.iter() {
            self.stmt(depth + 2, stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, depth: usize, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Read(ident) => self.node(depth, "read", &[ident_token(ident)]),
            Stmt::Print(exp) => {
                self.node(depth, "print", &[])?;
                self.exp(depth + 1, exp)
            },
            Stmt::Block(block) => self.block(depth, block),
            Stmt::If(cond, body) => {
                self.node(depth, "cond", &[ident_token(&cond.left)])?;
                self.cond(depth + 1, cond)?;
                self.stmt(depth + 1, body)
            },
            Stmt::While(cond, body) => {
                self.node(depth, "loop", &[ident_token(&cond.left)])?;
                self.cond(depth + 1, cond)?;
                self.stmt(depth + 1, body)
            },
            Stmt::Assign(ident, exp) => {
                self.node(depth, "assign", &[ident_token(ident)])?;
                self.exp(depth + 1, exp)
            },
        }
    }

    fn cond(&mut self, depth: usize, cond: &Cond) -> fmt::Result {
        self.node(depth, "relational", &[token("OP", cond.op.value.symbol(), cond.op.line)])?;
        self.exp(depth, &cond.right)
    }

    fn exp(&mut self, depth: usize, exp: &Exp) -> fmt::Result {
        match exp {
            Exp::Num(lit) => self.node(depth, "R", &[token("INT", lit.value, lit.line)]),
            Exp::LVal(ident) => self.node(depth, "R", &[ident_token(ident)]),
            Exp::Neg(line, operand) => {
                self.node(depth, "N", &[token("OP", "-", *line)])?;
                self.exp(depth + 1, operand)
            },
            Exp::BinaryExp(op, lhs, rhs) => {
                let label = match op.value {
                    BinaryOp::Add | BinaryOp::Sub => "exp",
                    BinaryOp::Mul => "M",
                    BinaryOp::Mod => "N",
                };
                self.node(depth, label, &[token("OP", op.value.symbol(), op.line)])?;
                self.exp(depth + 1, lhs)?;
                self.exp(depth + 1, rhs)
            },
        }
    }
}

fn token(kind: &str, lexeme: impl fmt::Display, line: usize) -> String {
    format!("{}:{}:{}", kind, lexeme, line)
}

fn ident_token(ident: &Ident) -> String {
    token("ID", &ident.name, ident.line)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = TreePrinter { f };
        printer.node(0, "program", &[])?;
        printer.vars(1, &self.vars)?;
        printer.block(1, &self.block)
    }
}
