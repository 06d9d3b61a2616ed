pub mod cues;
pub mod names;
pub mod patterns;

pub use cues::*;
pub use names::*;
pub use patterns::*;
