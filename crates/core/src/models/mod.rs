pub mod filter;
pub mod slots;
