pub mod attribution;
pub mod batch;
pub mod deadline;

pub use attribution::*;
pub use batch::*;
pub use deadline::*;
