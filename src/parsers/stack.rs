use crate::error::EngineError;
use crate::grammars::{NonTerminal, Symbol, Terminal};
use std::fmt;

/// LIFO store of grammar symbols driving the predictive parse.
///
/// Growth goes through `try_reserve`, so allocation failure surfaces as
/// [`EngineError::ResourceExhaustion`] instead of aborting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolStack {
    /// Bottom of the stack first
    symbols: Vec<Symbol>,
}

impl SymbolStack {
    pub fn new() -> Self {
        SymbolStack {
            symbols: Vec::new(),
        }
    }

    /// Stack seeded with `[$, start]`, the start symbol on top
    pub fn seeded(start: NonTerminal) -> Result<Self, EngineError> {
        let mut stack = SymbolStack::new();
        stack.push(Symbol::Terminal(Terminal::EndOfInput))?;
        stack.push(Symbol::NonTerminal(start))?;
        Ok(stack)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// The top symbol without removing it, `None` on an empty stack
    pub fn top(&self) -> Option<Symbol> {
        self.symbols.last().copied()
    }

    pub fn push(&mut self, symbol: Symbol) -> Result<(), EngineError> {
        self.symbols.try_reserve(1)?;
        self.symbols.push(symbol);
        Ok(())
    }

    /// Push a right-hand side so that its first symbol ends up on top
    pub fn push_reversed(&mut self, sequence: &[Symbol]) -> Result<(), EngineError> {
        self.symbols.try_reserve(sequence.len())?;
        self.symbols.extend(sequence.iter().rev().copied());
        Ok(())
    }

    /// Remove and return the top symbol.
    ///
    /// # Panics
    ///
    /// Popping an empty stack is a contract violation: the driver checks
    /// for emptiness before every step.
    pub fn pop(&mut self) -> Symbol {
        match self.symbols.pop() {
            Some(symbol) => symbol,
            None => panic!("pop called on an empty symbol stack"),
        }
    }

    /// Copy of the contents, bottom first
    pub fn snapshot(&self) -> Vec<Symbol> {
        self.symbols.clone()
    }
}

/// Top first, the way the stack reads while parsing
impl fmt::Display for SymbolStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.symbols.iter().rev().map(|s| s.to_string()).collect();
        write!(f, "[{}]", rendered.join(" "))
    }
}
