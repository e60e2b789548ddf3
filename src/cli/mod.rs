//! CLI operation handlers.
//!
//! [`report`] runs whichever operation the configuration selects against a
//! gateway. Output formatting utilities are in [`output`].

pub mod output;
pub mod report;
