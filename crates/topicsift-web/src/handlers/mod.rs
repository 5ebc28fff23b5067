pub mod amsl;
pub mod extract;
