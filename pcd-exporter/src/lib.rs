pub mod error;
pub mod output;
pub mod txt;

pub use error::ExportError;
