//! Capability resolution, native realization, caching, strategies and frame execution.

pub(crate) mod backend;
pub(crate) mod blur_cpu;
pub(crate) mod cache;
pub(crate) mod capability;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod plan;
pub(crate) mod recording;
pub(crate) mod registry;
pub(crate) mod software;
pub(crate) mod strategy;
pub(crate) mod surface_pool;
