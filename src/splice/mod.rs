//! Injection splicing and syntax balance checking.

mod balance;
mod splicer;

pub use balance::{check, check_optional, report, Imbalance, BALANCED};
pub use splicer::{
    effective_text, insert, splice, strip_trailing_comments, InjectionContext, Spliced,
    INJECTION_MARKER, LINE_COMMENT,
};
