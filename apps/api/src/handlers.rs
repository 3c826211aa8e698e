pub mod health;
pub mod machines;
pub mod rules;
