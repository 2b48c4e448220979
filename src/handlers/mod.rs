// src/handlers/mod.rs

pub mod auth;
pub mod dashboard;
pub mod questions;
pub mod system;
