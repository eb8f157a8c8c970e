// src/fetch/mod.rs

pub mod boundaries;
