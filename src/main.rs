use clap::{ArgAction, Parser};
use log::info;
use predictive_expr::grammars::{grammar_listing, GrammarAnalysis, PARSE_TABLE};
use predictive_expr::trace::Trace;
use predictive_expr::{ConfigError, EngineError, LLParser, ParseOutcome, ParserConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Predictive LL(1) parser for `+ - * / ( )` expressions over digits
#[derive(Debug, Parser)]
#[command(name = "predictive-expr", version, about)]
struct Cli {
    /// Expressions to parse, each terminated by `$`
    #[arg(value_name = "EXPR", default_value = "(5)$")]
    exprs: Vec<String>,

    /// Append the `$` end marker when an expression lacks one
    #[arg(long)]
    auto_end: bool,

    /// Print the stack at every step
    #[arg(long)]
    trace: bool,

    /// Emit one JSON object per expression
    #[arg(long)]
    json: bool,

    /// Abort a parse after this many steps
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,

    /// Parser config file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the grammar, its FIRST/FOLLOW sets and exit
    #[arg(long)]
    grammar: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a str,
    accepted: bool,
    outcome: &'a ParseOutcome,
    steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a Trace>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> Result<ParserConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::default(),
    };
    if let Some(limit) = cli.max_steps {
        config = config.with_max_steps(limit);
    }
    if cli.trace {
        config = config.with_trace(true);
    }
    Ok(config)
}

fn print_grammar() {
    let analysis = GrammarAnalysis::compute();
    println!("Grammar:");
    println!("{}", grammar_listing());
    println!("\nSets:");
    println!("{}", analysis.describe());

    let violations = PARSE_TABLE.check_ll1(&analysis);
    if violations.is_empty() {
        println!("\nParse table is LL(1) and agrees with FIRST/FOLLOW.");
    } else {
        for violation in violations {
            println!("\n{}", violation);
        }
    }
}

/// Returns true when every expression was accepted
fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = load_config(cli)?;
    info!("parser config: {:?}", config);
    let parser = LLParser::new(config);
    let mut all_accepted = true;

    for expr in &cli.exprs {
        let input = if cli.auto_end && !expr.trim_end().ends_with('$') {
            format!("{}$", expr)
        } else {
            expr.clone()
        };

        let report = parser.parse_report(&input)?;
        all_accepted &= report.outcome.is_accepted();

        if cli.json {
            let json = JsonReport {
                input: &input,
                accepted: report.outcome.is_accepted(),
                outcome: &report.outcome,
                steps: report.steps,
                trace: report.trace.as_ref(),
            };
            println!("{}", serde_json::to_string(&json)?);
            continue;
        }

        println!("Input: {}", input);
        if let Some(trace) = &report.trace {
            println!("{}", trace.render());
        }
        match &report.outcome {
            ParseOutcome::Accepted => println!("Parsing successful!"),
            ParseOutcome::Rejected(reason) => println!("Parsing failed: {}", reason),
        }
    }

    Ok(all_accepted)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.grammar {
        print_grammar();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
