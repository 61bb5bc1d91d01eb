//! Tests for the grammars module - symbols, parse table and FIRST/FOLLOW analysis

use super::*;
use rstest::rstest;

#[rstest]
#[case('+', Lookahead::Terminal(Terminal::Plus))]
#[case('/', Lookahead::Terminal(Terminal::Slash))]
#[case('(', Lookahead::Terminal(Terminal::LParen))]
#[case('0', Lookahead::Terminal(Terminal::Id))]
#[case('9', Lookahead::Terminal(Terminal::Id))]
#[case('$', Lookahead::Terminal(Terminal::EndOfInput))]
#[case('a', Lookahead::Unknown('a'))]
#[case('i', Lookahead::Unknown('i'))]
fn test_classify_char(#[case] c: char, #[case] expected: Lookahead) {
    assert_eq!(Lookahead::from_char(c), expected);
}

#[test]
fn test_tokenize_skips_whitespace() {
    assert_eq!(
        tokenize(" 1 +\t2$ "),
        vec![
            Lookahead::Terminal(Terminal::Id),
            Lookahead::Terminal(Terminal::Plus),
            Lookahead::Terminal(Terminal::Id),
            Lookahead::Terminal(Terminal::EndOfInput),
        ]
    );
}

#[test]
fn test_lookahead_matching() {
    assert!(Lookahead::Terminal(Terminal::Id).matches(Terminal::Id));
    assert!(!Lookahead::Terminal(Terminal::Id).matches(Terminal::Plus));
    assert!(!Lookahead::Unknown('x').matches(Terminal::Id));
    assert!(!Lookahead::Exhausted.matches(Terminal::EndOfInput));
}

#[test]
fn test_symbol_kinds() {
    assert!(Symbol::Terminal(Terminal::Star).is_terminal());
    assert!(Symbol::NonTerminal(NonTerminal::Factor).is_non_terminal());
    assert!(!Symbol::NonTerminal(NonTerminal::Factor).is_terminal());
}

#[test]
fn test_production_ids_match_positions() {
    for (idx, production) in PRODUCTIONS.iter().enumerate() {
        assert_eq!(production.id, idx);
    }
}

#[test]
fn test_productions_of_tail_include_epsilon() {
    for nt in [NonTerminal::ExprTail, NonTerminal::TermTail] {
        let productions: Vec<_> = productions_of(nt).collect();
        assert_eq!(productions.len(), 3);
        assert!(productions.iter().any(|p| p.is_epsilon()));
    }
    assert!(productions_of(NonTerminal::Factor).all(|p| !p.is_epsilon()));
}

#[test]
fn test_production_display() {
    assert_eq!(PRODUCTIONS[0].to_string(), "Start -> Term ExprTail");
    assert_eq!(PRODUCTIONS[3].to_string(), "ExprTail -> ε");
    assert_eq!(PRODUCTIONS[8].to_string(), "Factor -> '(' Start ')'");
}

#[test]
fn test_grammar_listing_has_every_production() {
    let listing = grammar_listing();
    assert_eq!(listing.lines().count(), PRODUCTIONS.len());
    assert!(listing.contains("[5] TermTail -> '*' Factor TermTail"));
}

#[test]
fn test_every_non_terminal_has_default_branch() {
    let rows = PARSE_TABLE.rows();
    for nt in NonTerminal::ALL {
        assert!(rows.iter().any(|&(row_nt, la, _)| row_nt == nt && la.is_none()));
    }
    assert_eq!(rows.len(), 10);
}

#[test]
fn test_select_is_total() {
    let mut lookaheads: Vec<Lookahead> = Terminal::ALL.iter().map(|&t| Lookahead::Terminal(t)).collect();
    lookaheads.push(Lookahead::Unknown('?'));
    lookaheads.push(Lookahead::Exhausted);

    for nt in NonTerminal::ALL {
        for &la in &lookaheads {
            assert_eq!(PARSE_TABLE.select(nt, la).lhs, nt);
        }
    }
}

#[test]
fn test_nullable() {
    let analysis = GrammarAnalysis::compute();
    assert!(analysis.is_nullable(NonTerminal::ExprTail));
    assert!(analysis.is_nullable(NonTerminal::TermTail));
    assert!(!analysis.is_nullable(NonTerminal::Start));
    assert!(!analysis.is_nullable(NonTerminal::Term));
    assert!(!analysis.is_nullable(NonTerminal::Factor));
}

#[test]
fn test_first_sets() {
    use Terminal::*;
    let analysis = GrammarAnalysis::compute();
    assert_eq!(analysis.first(NonTerminal::Start), vec![LParen, Id]);
    assert_eq!(analysis.first(NonTerminal::Term), vec![LParen, Id]);
    assert_eq!(analysis.first(NonTerminal::Factor), vec![LParen, Id]);
    assert_eq!(analysis.first(NonTerminal::ExprTail), vec![Plus, Minus]);
    assert_eq!(analysis.first(NonTerminal::TermTail), vec![Star, Slash]);
}

#[test]
fn test_follow_sets() {
    use Terminal::*;
    let analysis = GrammarAnalysis::compute();
    assert_eq!(analysis.follow(NonTerminal::Start), vec![RParen, EndOfInput]);
    assert_eq!(analysis.follow(NonTerminal::ExprTail), vec![RParen, EndOfInput]);
    assert_eq!(
        analysis.follow(NonTerminal::Term),
        vec![Plus, Minus, RParen, EndOfInput]
    );
    assert_eq!(
        analysis.follow(NonTerminal::TermTail),
        vec![Plus, Minus, RParen, EndOfInput]
    );
    assert_eq!(
        analysis.follow(NonTerminal::Factor),
        vec![Plus, Minus, Star, Slash, RParen, EndOfInput]
    );
}

#[test]
fn test_declared_table_agrees_with_first_follow() {
    let analysis = GrammarAnalysis::compute();
    assert_eq!(PARSE_TABLE.check_ll1(&analysis), vec![]);
}

#[test]
fn test_describe_lists_every_non_terminal() {
    let description = GrammarAnalysis::compute().describe();
    for nt in NonTerminal::ALL {
        assert!(description.contains(nt.as_str()));
    }
    assert!(description.contains("FOLLOW={')', '$'}"));
}
