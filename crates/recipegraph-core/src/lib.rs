pub mod algorithm;
pub mod catalog;
pub mod config_manager;
pub mod error;
pub mod index;
pub mod recipe;
pub mod types;

pub use algorithm::*;
pub use catalog::*;
pub use config_manager::*;
pub use error::*;
pub use index::*;
pub use recipe::*;
pub use types::*;
