pub mod error;
pub mod i18n;
pub mod pagination;
pub mod query;
pub mod response;
pub mod validation;
