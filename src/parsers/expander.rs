use super::stack::SymbolStack;
use crate::error::EngineError;
use crate::grammars::{Lookahead, NonTerminal, Production, Symbol, PARSE_TABLE};

/// Replace `non_terminal` on top of the stack with the right-hand side of the
/// production selected by `(non_terminal, lookahead)`, first symbol on top.
///
/// Lookaheads outside the selecting sets fall through to the default branch;
/// an invalid lookahead surfaces later as a terminal mismatch in the driver.
pub fn expand(
    stack: &mut SymbolStack,
    non_terminal: NonTerminal,
    lookahead: Lookahead,
) -> Result<&'static Production, EngineError> {
    let top = stack.pop();
    assert_eq!(
        top,
        Symbol::NonTerminal(non_terminal),
        "expanded non-terminal must be on top of the stack"
    );

    let production = PARSE_TABLE.select(non_terminal, lookahead);
    stack.push_reversed(production.rhs)?;
    Ok(production)
}
