//! SQL text and parameterized statement builders for the users / addresses tables.

mod builder;
pub use builder::*;
