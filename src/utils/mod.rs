// src/utils/mod.rs

pub mod fingerprint;
pub mod jwt;
pub mod normalize;
