//! Writers for the files the shipout stage produces.

pub(crate) mod filter;
pub(crate) mod naming;
pub(crate) mod psfile;
pub(crate) mod texfile;
