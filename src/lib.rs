//! Stack-driven LL(1) predictive parser for the arithmetic expression grammar
//!
//! ```text
//! S -> T I        I -> + T I | - T I | ε
//! T -> F H        H -> * F H | / F H | ε
//! F -> ( S ) | id
//! ```
//!
//! Input is a character sequence over `0-9 + - * / ( )` terminated by `$`.

pub mod config;
pub mod error;
pub mod grammars;
pub mod parsers;
pub mod trace;

pub use config::ParserConfig;
pub use error::{ConfigError, EngineError, ParseOutcome, Rejection};
pub use parsers::ll::{parse, recognize, LLParser, ParseReport};
