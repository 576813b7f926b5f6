mod claims;
pub mod services;
