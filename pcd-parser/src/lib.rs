pub mod error;
pub mod parsers;

pub use error::ParseError;
