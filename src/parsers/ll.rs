use super::expander::expand;
use super::stack::SymbolStack;
use crate::config::ParserConfig;
use crate::error::{EngineError, ParseOutcome, Rejection};
use crate::grammars::{tokenize, Lookahead, NonTerminal, Symbol};
use crate::trace::{Action, Trace, TraceStep};
use log::{debug, trace};

/// Outcome of a parse together with its diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub outcome: ParseOutcome,
    /// Number of driver loop iterations executed
    pub steps: usize,
    /// Present when tracing was requested
    pub trace: Option<Trace>,
}

/// Table-driven predictive parser for the expression grammar.
///
/// Holds no state between calls; every parse builds its own stack and cursor.
#[derive(Debug, Clone, Default)]
pub struct LLParser {
    config: ParserConfig,
}

impl LLParser {
    pub fn new(config: ParserConfig) -> Self {
        LLParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an input string. The caller is responsible for the trailing `$`
    pub fn parse(&self, input: &str) -> Result<ParseOutcome, EngineError> {
        self.parse_symbols(&tokenize(input), false)
            .map(|report| report.outcome)
    }

    /// Parse and keep a trace if the config asks for one
    pub fn parse_report(&self, input: &str) -> Result<ParseReport, EngineError> {
        self.parse_symbols(&tokenize(input), self.config.record_trace)
    }

    /// Parse and always record a trace
    pub fn parse_traced(&self, input: &str) -> Result<(ParseOutcome, Trace), EngineError> {
        let report = self.parse_symbols(&tokenize(input), true)?;
        Ok((report.outcome, report.trace.unwrap_or_default()))
    }

    /// Returns true if the input is accepted by the grammar
    pub fn recognize(&self, input: &str) -> bool {
        matches!(self.parse(input), Ok(ParseOutcome::Accepted))
    }

    /// Run the driver loop over an already tokenized input
    pub fn parse_symbols(
        &self,
        input: &[Lookahead],
        record_trace: bool,
    ) -> Result<ParseReport, EngineError> {
        let mut stack = SymbolStack::seeded(NonTerminal::Start)?;
        let mut trace = record_trace.then(Trace::new);
        let mut cursor = 0;
        let mut steps = 0;

        while let Some(top) = stack.top() {
            if let Some(limit) = self.config.max_steps {
                if steps >= limit {
                    debug!("iteration cap of {} reached at position {}", limit, cursor);
                    return Err(EngineError::IterationCapExceeded { limit });
                }
            }
            steps += 1;

            // Reading past the end never matches a terminal
            let position = cursor;
            let lookahead = input.get(position).copied().unwrap_or(Lookahead::Exhausted);
            trace!("step {}: stack {} lookahead {} at {}", steps, stack, lookahead, position);
            let before = trace.as_ref().map(|_| stack.snapshot());

            let action = match top {
                Symbol::Terminal(expected) => {
                    if lookahead.matches(expected) {
                        stack.pop();
                        cursor += 1;
                        debug!("matched '{}' at {}", expected, position);
                        Action::Match { terminal: expected }
                    } else {
                        record(&mut trace, before, steps, lookahead, position, Action::Reject);
                        let reason = Rejection::TerminalMismatch {
                            expected,
                            found: lookahead,
                            position,
                        };
                        debug!("rejected: {}", reason);
                        return Ok(ParseReport {
                            outcome: ParseOutcome::Rejected(reason),
                            steps,
                            trace,
                        });
                    }
                }
                Symbol::NonTerminal(nt) => {
                    let production = expand(&mut stack, nt, lookahead)?;
                    debug!("expanded {} on {}", production, lookahead);
                    Action::Expand {
                        non_terminal: nt,
                        production: production.id,
                    }
                }
            };
            record(&mut trace, before, steps, lookahead, position, action);
        }

        let outcome = if cursor >= input.len() {
            debug!("accepted after {} steps", steps);
            ParseOutcome::Accepted
        } else {
            let reason = Rejection::TrailingInput {
                position: cursor,
                remaining: input.len() - cursor,
            };
            debug!("rejected: {}", reason);
            ParseOutcome::Rejected(reason)
        };

        Ok(ParseReport {
            outcome,
            steps,
            trace,
        })
    }
}

/// Parse with the default configuration
pub fn parse(input: &str) -> Result<ParseOutcome, EngineError> {
    LLParser::default().parse(input)
}

/// Returns true if the input is accepted with the default configuration
pub fn recognize(input: &str) -> bool {
    LLParser::default().recognize(input)
}

fn record(
    trace: &mut Option<Trace>,
    stack: Option<Vec<Symbol>>,
    step: usize,
    lookahead: Lookahead,
    position: usize,
    action: Action,
) {
    if let (Some(trace), Some(stack)) = (trace.as_mut(), stack) {
        trace.push(TraceStep {
            step,
            stack,
            lookahead,
            position,
            action,
        });
    }
}

#[cfg(test)]
#[path = "ll_tests.rs"]
mod tests;
