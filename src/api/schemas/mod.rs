pub mod health;
pub mod regex;
