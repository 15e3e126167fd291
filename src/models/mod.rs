pub mod account;
pub mod base;
pub mod delivery;
pub mod location;
pub mod package;
pub mod vehicle;
