pub mod fetch;
pub mod logo;
