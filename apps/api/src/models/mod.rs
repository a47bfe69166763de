pub mod document;
pub mod profile;
