// src/utils/mod.rs

pub mod auth;
pub mod clock;
pub mod hash;
pub mod session;
