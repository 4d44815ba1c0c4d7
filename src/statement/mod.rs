//! Statement pipeline: buffering raw input lines into statements, rewriting
//! macros, and classifying the result for display.
//!
//! ```text
//! raw lines -> StatementBuffer -> statement -> classify() -> ClassifiedStatement
//!                                                 |
//!                                                 +-- macros::rewrite()
//! ```

mod buffer;
mod classify;
mod macros;

pub use buffer::{BufferEvent, StatementBuffer, QUIT_SENTINELS, TERMINATORS};
pub use classify::{classify, ClassifiedStatement, Disposition, ILLEGAL_LEADING_KEYWORDS};
pub use macros::{parse_date_literal, rewrite, DateDialect, MacroError, MAX_EXPANSIONS};
