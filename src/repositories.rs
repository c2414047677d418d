pub mod employees;
pub mod shifts;
