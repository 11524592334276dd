// Product listings published by artisans.

pub mod handlers;
pub mod validation;
