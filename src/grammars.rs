// Grammars module - the fixed expression grammar, its parse table and FIRST/FOLLOW analysis
//
//   S -> T I
//   I -> + T I | - T I | epsilon
//   T -> F H
//   H -> * F H | / F H | epsilon
//   F -> ( S ) | id

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Grammar Symbols
// ============================================================================

/// A terminal of the expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminal {
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    /// Any identifier or constant (a single digit in the input)
    Id,
    EndOfInput,
}

impl Terminal {
    pub const ALL: [Terminal; 8] = [
        Terminal::Plus,
        Terminal::Minus,
        Terminal::Star,
        Terminal::Slash,
        Terminal::LParen,
        Terminal::RParen,
        Terminal::Id,
        Terminal::EndOfInput,
    ];

    /// Classify an input character. Returns None for characters outside the alphabet
    pub fn from_char(c: char) -> Option<Terminal> {
        match c {
            '+' => Some(Terminal::Plus),
            '-' => Some(Terminal::Minus),
            '*' => Some(Terminal::Star),
            '/' => Some(Terminal::Slash),
            '(' => Some(Terminal::LParen),
            ')' => Some(Terminal::RParen),
            '$' => Some(Terminal::EndOfInput),
            c if c.is_ascii_digit() => Some(Terminal::Id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::Plus => "+",
            Terminal::Minus => "-",
            Terminal::Star => "*",
            Terminal::Slash => "/",
            Terminal::LParen => "(",
            Terminal::RParen => ")",
            Terminal::Id => "id",
            Terminal::EndOfInput => "$",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A non-terminal of the grammar after left-recursion elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Start,
    ExprTail,
    Term,
    TermTail,
    Factor,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 5] = [
        NonTerminal::Start,
        NonTerminal::ExprTail,
        NonTerminal::Term,
        NonTerminal::TermTail,
        NonTerminal::Factor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NonTerminal::Start => "Start",
            NonTerminal::ExprTail => "ExprTail",
            NonTerminal::Term => "Term",
            NonTerminal::TermTail => "TermTail",
            NonTerminal::Factor => "Factor",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A grammar symbol - either a terminal or a non-terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Check if this is a terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Check if this is a non-terminal
    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::NonTerminal(nt) => write!(f, "{}", nt),
        }
    }
}

/// An input-side symbol as seen by the driver's one-symbol lookahead.
///
/// Characters outside the alphabet are kept as `Unknown` instead of being
/// rejected up front; they fail later when compared against a terminal.
/// `Exhausted` is what the cursor reads once it has run past the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookahead {
    Terminal(Terminal),
    Unknown(char),
    Exhausted,
}

impl Lookahead {
    pub fn from_char(c: char) -> Self {
        match Terminal::from_char(c) {
            Some(t) => Lookahead::Terminal(t),
            None => Lookahead::Unknown(c),
        }
    }

    /// The terminal this lookahead stands for, if any
    pub fn terminal(&self) -> Option<Terminal> {
        match self {
            Lookahead::Terminal(t) => Some(*t),
            _ => None,
        }
    }

    pub fn matches(&self, expected: Terminal) -> bool {
        self.terminal() == Some(expected)
    }
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Terminal(t) => write!(f, "'{}'", t),
            Lookahead::Unknown(c) => write!(f, "'{}'", c.escape_debug()),
            Lookahead::Exhausted => f.write_str("end of input"),
        }
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_display!(Terminal, NonTerminal, Symbol, Lookahead);

/// Convert an input string into the lookahead sequence consumed by the driver.
/// Whitespace is skipped; every other character yields exactly one symbol.
pub fn tokenize(input: &str) -> Vec<Lookahead> {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(Lookahead::from_char)
        .collect()
}

// ============================================================================
// Productions
// ============================================================================

/// A production `lhs -> rhs`. An empty right-hand side is an epsilon production
#[derive(Debug, PartialEq, Eq)]
pub struct Production {
    /// Index into [`PRODUCTIONS`]
    pub id: usize,
    pub lhs: NonTerminal,
    pub rhs: &'static [Symbol],
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            return f.write_str(" ε");
        }
        for sym in self.rhs {
            match sym {
                Symbol::Terminal(t) => write!(f, " '{}'", t)?,
                Symbol::NonTerminal(nt) => write!(f, " {}", nt)?,
            }
        }
        Ok(())
    }
}

const S: Symbol = Symbol::NonTerminal(NonTerminal::Start);
const I: Symbol = Symbol::NonTerminal(NonTerminal::ExprTail);
const T: Symbol = Symbol::NonTerminal(NonTerminal::Term);
const H: Symbol = Symbol::NonTerminal(NonTerminal::TermTail);
const F: Symbol = Symbol::NonTerminal(NonTerminal::Factor);
const PLUS: Symbol = Symbol::Terminal(Terminal::Plus);
const MINUS: Symbol = Symbol::Terminal(Terminal::Minus);
const STAR: Symbol = Symbol::Terminal(Terminal::Star);
const SLASH: Symbol = Symbol::Terminal(Terminal::Slash);
const LPAREN: Symbol = Symbol::Terminal(Terminal::LParen);
const RPAREN: Symbol = Symbol::Terminal(Terminal::RParen);
const ID: Symbol = Symbol::Terminal(Terminal::Id);

/// Every production of the grammar, indexed by `Production::id`
pub static PRODUCTIONS: [Production; 10] = [
    Production { id: 0, lhs: NonTerminal::Start, rhs: &[T, I] },
    Production { id: 1, lhs: NonTerminal::ExprTail, rhs: &[PLUS, T, I] },
    Production { id: 2, lhs: NonTerminal::ExprTail, rhs: &[MINUS, T, I] },
    Production { id: 3, lhs: NonTerminal::ExprTail, rhs: &[] },
    Production { id: 4, lhs: NonTerminal::Term, rhs: &[F, H] },
    Production { id: 5, lhs: NonTerminal::TermTail, rhs: &[STAR, F, H] },
    Production { id: 6, lhs: NonTerminal::TermTail, rhs: &[SLASH, F, H] },
    Production { id: 7, lhs: NonTerminal::TermTail, rhs: &[] },
    Production { id: 8, lhs: NonTerminal::Factor, rhs: &[LPAREN, S, RPAREN] },
    Production { id: 9, lhs: NonTerminal::Factor, rhs: &[ID] },
];

/// Get the productions of a non-terminal, in declaration order
pub fn productions_of(nt: NonTerminal) -> impl Iterator<Item = &'static Production> {
    PRODUCTIONS.iter().filter(move |p| p.lhs == nt)
}

/// Render the production listing, one production per line
pub fn grammar_listing() -> String {
    PRODUCTIONS
        .iter()
        .map(|p| format!("  [{}] {}", p.id, p))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Parse Table
// ============================================================================

/// Declared table rows: (non-terminal, lookahead, production). A `None`
/// lookahead is the "anything else" branch taken when no explicit row matches.
const TABLE_ROWS: &[(NonTerminal, Option<Terminal>, usize)] = &[
    (NonTerminal::Start, None, 0),
    (NonTerminal::ExprTail, Some(Terminal::Plus), 1),
    (NonTerminal::ExprTail, Some(Terminal::Minus), 2),
    (NonTerminal::ExprTail, None, 3),
    (NonTerminal::Term, None, 4),
    (NonTerminal::TermTail, Some(Terminal::Star), 5),
    (NonTerminal::TermTail, Some(Terminal::Slash), 6),
    (NonTerminal::TermTail, None, 7),
    (NonTerminal::Factor, Some(Terminal::LParen), 8),
    (NonTerminal::Factor, None, 9),
];

/// The process-wide parse table, built once on first use
pub static PARSE_TABLE: Lazy<ParseTable> = Lazy::new(ParseTable::new);

/// LL(1) parse table: (NonTerminal, Lookahead Terminal) -> Production Index.
/// A `None` lookahead key holds the non-terminal's default branch.
#[derive(Debug, Clone)]
pub struct ParseTable {
    table: FxHashMap<(NonTerminal, Option<Terminal>), usize>,
}

impl ParseTable {
    pub fn new() -> Self {
        let mut table = FxHashMap::default();
        for &(nt, lookahead, prod_idx) in TABLE_ROWS {
            assert_eq!(
                PRODUCTIONS[prod_idx].lhs, nt,
                "Table row for {} points at production {} of another non-terminal",
                nt, prod_idx
            );
            if let Some(existing) = table.insert((nt, lookahead), prod_idx) {
                panic!(
                    "LL(1) Conflict at NonTerminal {}, Lookahead {:?}. Rules {} and {}",
                    nt, lookahead, existing, prod_idx
                );
            }
        }
        for nt in NonTerminal::ALL {
            assert!(
                table.contains_key(&(nt, None)),
                "NonTerminal {} has no default branch",
                nt
            );
        }
        ParseTable { table }
    }

    /// Select the production for `nt` given the current lookahead.
    /// Explicit rows win; otherwise the default branch applies.
    pub fn select(&self, nt: NonTerminal, lookahead: Lookahead) -> &'static Production {
        let explicit = lookahead
            .terminal()
            .and_then(|t| self.table.get(&(nt, Some(t))));
        match explicit.or_else(|| self.table.get(&(nt, None))) {
            Some(&prod_idx) => &PRODUCTIONS[prod_idx],
            None => panic!("No production for NonTerminal {} on {}", nt, lookahead),
        }
    }

    /// All rows sorted by (non-terminal, lookahead), default branches first
    pub fn rows(&self) -> Vec<(NonTerminal, Option<Terminal>, usize)> {
        let mut rows: Vec<_> = self
            .table
            .iter()
            .map(|(&(nt, la), &prod_idx)| (nt, la, prod_idx))
            .collect();
        rows.sort();
        rows
    }

    /// Check the declared table against the strict LL(1) table derived from
    /// FIRST/FOLLOW. Every derived cell must select the same production as
    /// the declared table, and the derivation itself must be conflict-free.
    pub fn check_ll1(&self, analysis: &GrammarAnalysis) -> Vec<Ll1Violation> {
        let mut violations = Vec::new();
        let mut derived: FxHashMap<(NonTerminal, Terminal), usize> = FxHashMap::default();

        for production in PRODUCTIONS.iter() {
            let nt = production.lhs;
            let (mut selecting, nullable) = analysis.first_of_sequence(production.rhs);
            if nullable {
                selecting.extend(analysis.follow(nt));
            }
            for t in selecting {
                if let Some(existing) = derived.insert((nt, t), production.id) {
                    if existing != production.id {
                        violations.push(Ll1Violation::Conflict {
                            non_terminal: nt,
                            terminal: t,
                            first: existing,
                            second: production.id,
                        });
                    }
                }
            }
        }

        let mut cells: Vec<_> = derived.into_iter().collect();
        cells.sort();
        for ((nt, t), derived_idx) in cells {
            let declared = self.select(nt, Lookahead::Terminal(t)).id;
            if declared != derived_idx {
                violations.push(Ll1Violation::Disagreement {
                    non_terminal: nt,
                    terminal: t,
                    declared,
                    derived: derived_idx,
                });
            }
        }

        violations
    }
}

impl Default for ParseTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A disagreement between the declared table and FIRST/FOLLOW
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ll1Violation {
    #[error("LL(1) conflict at {non_terminal} on '{terminal}': rules {first} and {second}")]
    Conflict {
        non_terminal: NonTerminal,
        terminal: Terminal,
        first: usize,
        second: usize,
    },
    #[error("table selects rule {declared} for {non_terminal} on '{terminal}', FIRST/FOLLOW select rule {derived}")]
    Disagreement {
        non_terminal: NonTerminal,
        terminal: Terminal,
        declared: usize,
        derived: usize,
    },
}

// ============================================================================
// FIRST / FOLLOW / NULLABLE
// ============================================================================

/// FIRST, FOLLOW and NULLABLE sets of the grammar
#[derive(Debug, Clone)]
pub struct GrammarAnalysis {
    first: FxHashMap<NonTerminal, FxHashSet<Terminal>>,
    follow: FxHashMap<NonTerminal, FxHashSet<Terminal>>,
    nullable: FxHashSet<NonTerminal>,
}

impl GrammarAnalysis {
    /// Compute the sets by fixed-point iteration over [`PRODUCTIONS`]
    pub fn compute() -> Self {
        let mut first: FxHashMap<NonTerminal, FxHashSet<Terminal>> = FxHashMap::default();
        let mut follow: FxHashMap<NonTerminal, FxHashSet<Terminal>> = FxHashMap::default();
        let mut nullable: FxHashSet<NonTerminal> = FxHashSet::default();

        for nt in NonTerminal::ALL {
            first.insert(nt, FxHashSet::default());
            follow.insert(nt, FxHashSet::default());
        }
        // The driver seeds the stack with `$` beneath the start symbol
        follow
            .entry(NonTerminal::Start)
            .or_default()
            .insert(Terminal::EndOfInput);

        loop {
            let mut changed = false;

            for production in PRODUCTIONS.iter() {
                let nt = production.lhs;

                let mut can_be_empty = true;
                for sym in production.rhs {
                    match sym {
                        Symbol::Terminal(t) => {
                            if first.entry(nt).or_default().insert(*t) {
                                changed = true;
                            }
                            can_be_empty = false;
                            break;
                        }
                        Symbol::NonTerminal(nt2) => {
                            let first_nt2 = first.get(nt2).cloned().unwrap_or_default();
                            for t in first_nt2 {
                                if first.entry(nt).or_default().insert(t) {
                                    changed = true;
                                }
                            }
                            if !nullable.contains(nt2) {
                                can_be_empty = false;
                                break;
                            }
                        }
                    }
                }
                if can_be_empty && nullable.insert(nt) {
                    changed = true;
                }

                // Walk the right-hand side backwards carrying what may follow
                let mut trailer = follow.get(&nt).cloned().unwrap_or_default();
                for sym in production.rhs.iter().rev() {
                    match sym {
                        Symbol::Terminal(t) => {
                            trailer = FxHashSet::default();
                            trailer.insert(*t);
                        }
                        Symbol::NonTerminal(nt2) => {
                            let follow_nt2 = follow.entry(*nt2).or_default();
                            for t in &trailer {
                                if follow_nt2.insert(*t) {
                                    changed = true;
                                }
                            }
                            let first_nt2 = first.get(nt2).cloned().unwrap_or_default();
                            if nullable.contains(nt2) {
                                trailer.extend(first_nt2);
                            } else {
                                trailer = first_nt2;
                            }
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }

        GrammarAnalysis {
            first,
            follow,
            nullable,
        }
    }

    /// FIRST set of a non-terminal, sorted
    pub fn first(&self, nt: NonTerminal) -> Vec<Terminal> {
        sorted(self.first.get(&nt))
    }

    /// FOLLOW set of a non-terminal, sorted
    pub fn follow(&self, nt: NonTerminal) -> Vec<Terminal> {
        sorted(self.follow.get(&nt))
    }

    pub fn is_nullable(&self, nt: NonTerminal) -> bool {
        self.nullable.contains(&nt)
    }

    /// Compute FIRST set of a sequence of symbols and whether it derives epsilon
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> (FxHashSet<Terminal>, bool) {
        let mut result_first = FxHashSet::default();
        let mut is_seq_nullable = true;

        for sym in sequence {
            match sym {
                Symbol::Terminal(t) => {
                    result_first.insert(*t);
                    is_seq_nullable = false;
                    break;
                }
                Symbol::NonTerminal(nt) => {
                    if let Some(nt_first) = self.first.get(nt) {
                        result_first.extend(nt_first);
                    }
                    if !self.nullable.contains(nt) {
                        is_seq_nullable = false;
                        break;
                    }
                }
            }
        }

        (result_first, is_seq_nullable)
    }

    /// Human-readable FIRST/FOLLOW listing
    pub fn describe(&self) -> String {
        let join = |set: Vec<Terminal>| {
            set.iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(", ")
        };
        NonTerminal::ALL
            .iter()
            .map(|&nt| {
                format!(
                    "  {:<9} nullable={:<5} FIRST={{{}}} FOLLOW={{{}}}",
                    nt,
                    self.is_nullable(nt),
                    join(self.first(nt)),
                    join(self.follow(nt))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn sorted(set: Option<&FxHashSet<Terminal>>) -> Vec<Terminal> {
    let mut terminals: Vec<Terminal> = set.into_iter().flatten().copied().collect();
    terminals.sort();
    terminals
}

#[cfg(test)]
#[path = "grammars_tests.rs"]
mod tests;
