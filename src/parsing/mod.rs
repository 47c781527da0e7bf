//! SQL template scanning and parameter reference parsing.

pub mod expression;
pub mod token;

pub use expression::ParameterExpression;
pub use token::{TokenHandler, TokenParser};
