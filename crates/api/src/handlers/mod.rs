/// Record filter endpoint
pub mod filter;
/// Free slot search endpoint
pub mod slots;
