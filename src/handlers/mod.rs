pub mod blink;
pub mod input;
pub mod mutations;
pub mod pollers;
