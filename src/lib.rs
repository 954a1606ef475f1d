pub mod error;
pub mod types;

pub mod cache;
pub mod media;
pub mod mirror;
pub mod remote;
pub mod search;
pub mod validate;
