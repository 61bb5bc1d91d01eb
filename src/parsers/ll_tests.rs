use super::*;
use crate::grammars::Terminal;
use proptest::prelude::*;
use rstest::rstest;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[rstest]
#[case("5$")]
#[case("(5)$")]
#[case("5+3*2$")]
#[case("(1+2)*(3-4)$")]
#[case("1-2-3/4/5$")]
#[case("((((7))))$")]
#[case("1 + 2 * ( 3 / 4 )$")]
fn test_ll_accepts(#[case] input: &str) {
    init_logger();
    assert_eq!(parse(input).unwrap(), ParseOutcome::Accepted);
    assert!(recognize(input));
}

#[rstest]
#[case("5+$")]
#[case("(5$")]
#[case("*5$")]
#[case("$")]
#[case("")]
#[case("5")]
#[case("5$5")]
#[case("()$")]
#[case("55$")]
#[case("5+a$")]
fn test_ll_rejects(#[case] input: &str) {
    init_logger();
    let outcome = parse(input).unwrap();
    assert!(!outcome.is_accepted(), "{:?} should be rejected", input);
    assert!(!recognize(input));
}

#[test]
fn test_unclosed_paren_expects_rparen() {
    assert_eq!(
        parse("(5+3$").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::RParen,
            found: Lookahead::Terminal(Terminal::EndOfInput),
            position: 4,
        })
    );
}

#[test]
fn test_leading_operator_is_a_mismatch_on_id() {
    assert_eq!(
        parse("+5$").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::Id,
            found: Lookahead::Terminal(Terminal::Plus),
            position: 0,
        })
    );
}

#[test]
fn test_end_marker_alone_is_rejected_at_factor() {
    assert_eq!(
        parse("$").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::Id,
            found: Lookahead::Terminal(Terminal::EndOfInput),
            position: 0,
        })
    );
}

#[test]
fn test_empty_input_reads_exhausted() {
    assert_eq!(
        parse("").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::Id,
            found: Lookahead::Exhausted,
            position: 0,
        })
    );
}

#[test]
fn test_missing_end_marker_is_rejected() {
    assert_eq!(
        parse("5").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::EndOfInput,
            found: Lookahead::Exhausted,
            position: 1,
        })
    );
}

#[test]
fn test_input_after_end_marker_is_trailing() {
    assert_eq!(
        parse("5$+3").unwrap(),
        ParseOutcome::Rejected(Rejection::TrailingInput {
            position: 2,
            remaining: 2,
        })
    );
}

#[test]
fn test_unknown_character_fails_at_terminal_match() {
    assert_eq!(
        parse("x$").unwrap(),
        ParseOutcome::Rejected(Rejection::TerminalMismatch {
            expected: Terminal::Id,
            found: Lookahead::Unknown('x'),
            position: 0,
        })
    );
}

#[test]
fn test_trace_of_single_id() {
    let parser = LLParser::default();
    let (outcome, trace) = parser.parse_traced("5$").unwrap();

    assert!(outcome.is_accepted());
    assert_eq!(trace.len(), 7);
    // Start, Term, Factor -> id, TermTail -> ε, ExprTail -> ε
    assert_eq!(trace.expansions(), vec![0, 4, 9, 7, 3]);

    let first = &trace.steps()[0];
    assert_eq!(
        first.stack,
        vec![
            Symbol::Terminal(Terminal::EndOfInput),
            Symbol::NonTerminal(NonTerminal::Start),
        ]
    );
    assert_eq!(first.position, 0);

    let last = &trace.steps()[6];
    assert_eq!(last.stack, vec![Symbol::Terminal(Terminal::EndOfInput)]);
    assert_eq!(
        last.action,
        Action::Match {
            terminal: Terminal::EndOfInput
        }
    );
    assert_eq!(last.position, 1);
}

#[test]
fn test_trace_ends_with_reject_on_mismatch() {
    let (outcome, trace) = LLParser::default().parse_traced("(5$").unwrap();
    assert!(!outcome.is_accepted());
    let last = trace.steps().last().unwrap();
    assert_eq!(last.action, Action::Reject);
    assert_eq!(last.lookahead, Lookahead::Terminal(Terminal::EndOfInput));
}

#[test]
fn test_report_traces_only_when_configured() {
    let plain = LLParser::default().parse_report("5$").unwrap();
    assert!(plain.trace.is_none());
    assert_eq!(plain.steps, 7);

    let traced = LLParser::new(ParserConfig::default().with_trace(true))
        .parse_report("5$")
        .unwrap();
    assert_eq!(traced.trace.map(|t| t.len()), Some(7));
}

#[test]
fn test_iteration_cap() {
    let exact = LLParser::new(ParserConfig::default().with_max_steps(7));
    assert!(exact.parse("5$").unwrap().is_accepted());

    let tight = LLParser::new(ParserConfig::default().with_max_steps(6));
    let err = tight.parse("5$").unwrap_err();
    assert!(matches!(err, EngineError::IterationCapExceeded { limit: 6 }));
}

#[test]
fn test_parse_twice_gives_same_result() {
    let parser = LLParser::default();
    for input in ["(1+2)*3$", "(5+3$", "5$5"] {
        assert_eq!(parser.parse(input).unwrap(), parser.parse(input).unwrap());
    }
}

// ============================================================================
// Generated expressions
// ============================================================================

fn expression() -> impl Strategy<Value = String> {
    let leaf = (0u8..10).prop_map(|d| d.to_string());
    leaf.prop_recursive(6, 64, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop_oneof![Just('+'), Just('-'), Just('*'), Just('/')], inner.clone())
                .prop_map(|(l, op, r)| format!("{}{}{}", l, op, r)),
            inner.prop_map(|e| format!("({})", e)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_well_formed_expressions_are_accepted(expr in expression()) {
        let input = format!("{}$", expr);
        prop_assert_eq!(parse(&input).unwrap(), ParseOutcome::Accepted);
    }

    #[test]
    fn prop_dropping_end_marker_rejects(expr in expression()) {
        prop_assert!(!recognize(&expr));
    }

    #[test]
    fn prop_trailing_operator_rejects(expr in expression(), op in prop_oneof![Just('+'), Just('*')]) {
        let input = format!("{}{}$", expr, op);
        prop_assert!(!recognize(&input));
    }

    #[test]
    fn prop_trace_is_deterministic(expr in expression()) {
        let input = format!("{}$", expr);
        let parser = LLParser::default();
        let (first_outcome, first_trace) = parser.parse_traced(&input).unwrap();
        let (second_outcome, second_trace) = parser.parse_traced(&input).unwrap();
        prop_assert_eq!(first_outcome, second_outcome);
        prop_assert_eq!(first_trace, second_trace);
    }

    #[test]
    fn prop_arbitrary_input_never_fails_fatally(input in "[0-9+*/()$a -]{0,40}") {
        prop_assert!(parse(&input).is_ok());
    }
}
