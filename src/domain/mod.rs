pub mod auth;
pub mod keys;
pub mod oauth;
pub mod password;
pub mod users;
