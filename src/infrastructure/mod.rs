pub mod auth;
pub mod crypto;
pub mod db;
pub mod keys;
pub mod logging;
pub mod oauth;
pub mod password;
pub mod repositories;
pub mod scheduler;
pub mod state;
