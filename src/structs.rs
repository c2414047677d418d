pub mod employees;
pub mod roster;
pub mod shifts;
