pub mod config;
pub mod error;

pub use config::SolverConfig;
pub use error::{AppError, AppResult};
