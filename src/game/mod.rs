pub mod aim;
pub mod anchor;
pub mod components;
pub mod events;
pub mod fade;
pub mod rhythm;
pub mod segment;
pub mod types;
