pub mod cleanup;
pub mod inventory;
