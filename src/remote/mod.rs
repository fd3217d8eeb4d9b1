pub mod integrity;
pub mod transfer;
