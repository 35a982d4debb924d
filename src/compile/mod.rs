//! Filter graph model, construction, fingerprinting and progressive planning.

pub(crate) mod builder;
pub(crate) mod fingerprint;
pub(crate) mod graph;
pub(crate) mod progressive;
