pub mod alert;
pub mod coin;
pub mod holding;
pub mod price;
