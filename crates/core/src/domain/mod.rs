pub mod story;
pub mod symbol;
