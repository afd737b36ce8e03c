//! Command implementations.

mod crop;
mod info;
mod run;
mod validate;

pub use crop::run_crop;
pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;
