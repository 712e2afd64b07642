pub mod fetch;
pub mod project;
pub mod sync;
