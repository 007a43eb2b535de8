// src/models/mod.rs

pub mod assessment;
pub mod guidance;
pub mod question;
