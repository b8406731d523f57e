pub mod keys;
pub mod mock;
pub mod oauth_identities;
pub mod refresh_tokens;
pub mod users;
