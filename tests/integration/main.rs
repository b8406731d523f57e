#[path = "../common/mod.rs"]
#[macro_use]
pub mod common;

pub mod auth;
pub mod db;
pub mod health;
pub mod oauth;
