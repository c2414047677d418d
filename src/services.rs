pub mod accounts;
pub mod roster;
