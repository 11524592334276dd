pub mod art_story;
pub mod artist_post;
pub mod connection;
pub mod donation;
pub mod message;
pub mod product;
pub mod user;
