pub mod document;
pub mod preview;
