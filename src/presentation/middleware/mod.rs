pub mod cors;
pub mod i18n;
