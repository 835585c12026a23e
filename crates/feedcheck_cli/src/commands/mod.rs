pub mod check;
pub mod stores;
pub mod validate;
