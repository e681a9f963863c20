pub mod error;
pub mod lighter;
pub mod messages;
pub mod paper;
pub mod traits;
