pub mod document;
pub mod output;
pub mod roster;

pub use document::*;
pub use output::*;
pub use roster::*;
