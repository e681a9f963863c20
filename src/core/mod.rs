pub mod account;
pub mod codec;
pub mod engine;
pub mod locks;
pub mod markets;
