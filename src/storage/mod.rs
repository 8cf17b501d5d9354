pub mod document;
pub mod memory;
pub mod postgres;
