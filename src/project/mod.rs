mod tests;

pub mod manifest;

pub use manifest::Manifest;
