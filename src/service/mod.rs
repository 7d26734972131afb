//! Request validation ahead of any store access.

mod validation;
pub use validation::RequestValidator;
