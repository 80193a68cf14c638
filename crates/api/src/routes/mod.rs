pub mod filter;
pub mod health;
pub mod slots;
