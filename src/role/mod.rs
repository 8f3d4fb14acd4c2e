pub(crate) mod alias;
pub(crate) mod fingerprint;
pub(crate) mod registry;
pub(crate) mod spec;
