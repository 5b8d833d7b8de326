pub mod enums;
pub mod intake;
pub mod patient;

pub use intake::*;
pub use patient::*;
