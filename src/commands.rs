pub mod capabilities;
pub mod list;
pub mod list_refs;
pub mod push;
