pub mod attribute;
pub mod constants;
pub mod id;
