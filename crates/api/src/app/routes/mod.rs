pub mod identity;
pub mod system;
