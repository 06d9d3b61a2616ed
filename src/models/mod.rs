pub mod cue;
pub mod hearing;
pub mod identity;
pub mod outcome;
pub mod roster;

pub use cue::*;
pub use hearing::*;
pub use identity::*;
pub use outcome::*;
pub use roster::*;
