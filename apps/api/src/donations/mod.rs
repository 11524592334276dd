pub mod handlers;
pub mod summary;
pub mod validation;
