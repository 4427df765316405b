//! LALR(1) shift/reduce/goto/accept driver for the GOLD Parsing System
//! runtime (§4.G), plus its observer hooks (§4.H) and parse tree (§3).

pub mod driver;
pub mod error;
pub mod observer;
pub mod tree;

pub use driver::{Parser, StepResult};
pub use error::{DriveError, InternalError, ParserError};
pub use observer::{FrameView, Observers};
pub use tree::{Children, ParseTreeNode};

use gold_cgt::model::GrammarTables;

/// Runs a `Parser` to completion over `input`, the full §4.G loop driven by
/// [`driver::Parser::run_to_completion`]. This is what the `gold` facade
/// crate's `parse_string` calls; it is exposed here too since `gold_lalr` is
/// usable standalone by an embedder that has already linked a
/// [`GrammarTables`] on its own.
pub fn parse_string(
    grammar: &GrammarTables,
    input: &str,
    observers: &mut Observers,
) -> Result<ParseTreeNode, DriveError> {
    Parser::new(grammar, input).run_to_completion(observers)
}
