pub mod blank;
pub mod token;
