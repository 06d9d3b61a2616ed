pub mod stage0_scrub;
pub mod stage1_intro;
pub mod stage2_segment;
pub mod stage3_render;

pub use stage0_scrub::*;
pub use stage1_intro::*;
pub use stage2_segment::*;
pub use stage3_render::*;
