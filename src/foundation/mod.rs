pub(crate) mod bbox;
pub(crate) mod core;
pub(crate) mod error;
