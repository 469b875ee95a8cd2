//src/model/mod.rs
pub mod elements;
pub mod structure;

// Re-exports for cleaner imports
pub use elements::{get_atomic_number, symbol_from_z};
pub use structure::{Atom, Structure};
