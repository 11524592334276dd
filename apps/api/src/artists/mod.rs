// One portfolio record (ArtistPost) per artisan.

pub mod handlers;
