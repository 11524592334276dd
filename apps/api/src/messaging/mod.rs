// Connection-gated messaging.
// Only the two parties of an accepted connection may read or write its messages.

pub mod handlers;
pub mod policy;
pub mod store;
