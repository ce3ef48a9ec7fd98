pub mod delete;
pub mod sync;
