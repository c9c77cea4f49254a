mod larder_error;
mod storage_error;

pub mod error_code;

pub use larder_error::{LarderError, LarderResult};
pub use storage_error::StorageError;
