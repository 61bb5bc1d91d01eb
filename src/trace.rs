use crate::grammars::{Lookahead, NonTerminal, Symbol, Terminal, PRODUCTIONS};
use serde::Serialize;
use std::fmt;

/// What the driver did at one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Stack-top terminal equalled the lookahead; both consumed
    Match { terminal: Terminal },
    /// Non-terminal replaced by the right-hand side of `production`
    Expand {
        non_terminal: NonTerminal,
        production: usize,
    },
    /// Terminal mismatch; the parse stops here
    Reject,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Match { terminal } => write!(f, "match '{}'", terminal),
            Action::Expand { production, .. } => write!(f, "expand {}", PRODUCTIONS[*production]),
            Action::Reject => f.write_str("reject"),
        }
    }
}

/// One iteration of the driver loop, captured before the action is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    /// 1-based iteration number
    pub step: usize,
    /// Stack contents, bottom first
    pub stack: Vec<Symbol>,
    pub lookahead: Lookahead,
    pub position: usize,
    pub action: Action,
}

/// Diagnostic record of a parse. Has no effect on the outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    pub fn new() -> Self {
        Trace { steps: Vec::new() }
    }

    pub fn push(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Production indices in the order they were applied
    pub fn expansions(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter_map(|s| match s.action {
                Action::Expand { production, .. } => Some(production),
                _ => None,
            })
            .collect()
    }

    /// One line per step: stack (top first), lookahead and action
    pub fn render(&self) -> String {
        let rows: Vec<(String, &TraceStep)> = self
            .steps
            .iter()
            .map(|s| {
                let stack: Vec<String> = s.stack.iter().rev().map(|sym| sym.to_string()).collect();
                (stack.join(" "), s)
            })
            .collect();
        let width = rows.iter().map(|(stack, _)| stack.len()).max().unwrap_or(0);

        rows.iter()
            .map(|(stack, s)| {
                format!(
                    "{:>4}  Stack: {:<width$}  @{:<3} {:<14} {}",
                    s.step,
                    stack,
                    s.position,
                    s.lookahead.to_string(),
                    s.action,
                    width = width
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
