pub mod enums;
pub mod input;

pub use enums::*;
pub use input::StabilityInput;
