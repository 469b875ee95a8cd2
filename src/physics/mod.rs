// src/physics/mod.rs
pub mod forces;
pub mod relaxation;
pub mod stress;
pub mod symmetry;
