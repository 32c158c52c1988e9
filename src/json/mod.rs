//! Purpose: JSON boundary shared by the decode pipeline and domain types.
//! Exports: `combinator`, `decode`, and the internal `parse` helpers.
//! Role: Single seam for parser and combinator machinery so callsites avoid
//! Role: ad hoc decode logic.
//! Invariants: Runtime JSON parsing goes through `parse`; error mapping stays
//! Invariants: at the callsites so domain context remains explicit.

pub mod combinator;
pub mod decode;
pub(crate) mod parse;
