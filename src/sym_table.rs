use std::collections::HashMap;
use crate::ast::Ident;
use crate::environment::FrontendError;

#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub name: String,
    pub def_line: usize,
    pub used: bool,
}

/// One flat table for the whole program: a name declared in any block is
/// visible everywhere after its declaration.
pub struct SymbolTable {
    symbols: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}
impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn insert_var(&mut self, ident: &Ident) -> Result<(), FrontendError> {
        if let Some(&pos) = self.index.get(&ident.name) {
            return Err(FrontendError::Redefinition {
                name: ident.name.clone(),
                line: ident.line,
                first_line: self.symbols[pos].def_line,
            });
        }
        self.index.insert(ident.name.clone(), self.symbols.len());
        self.symbols.push(SymbolEntry {
            name: ident.name.clone(),
            def_line: ident.line,
            used: false,
        });
        Ok(())
    }

    pub fn mark_used(&mut self, ident: &Ident) -> Result<(), FrontendError> {
        match self.index.get(&ident.name) {
            Some(&pos) => {
                self.symbols[pos].used = true;
                Ok(())
            },
            None => Err(FrontendError::UndefinedVariable {
                name: ident.name.clone(),
                line: ident.line,
            }),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.index.get(name).map(|&pos| &self.symbols[pos])
    }

    /// Entries that were declared but never referenced, in declaration order.
    pub fn unused(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.symbols.iter().filter(|entry| !entry.used)
    }
}
