pub mod backends;
pub mod documents;
pub mod input;
