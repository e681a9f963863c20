pub mod clock;
pub mod precision;
pub mod symbol;
