pub mod logo;
pub mod sheet;
pub mod urls;
