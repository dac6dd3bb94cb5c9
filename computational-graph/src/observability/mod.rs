//! Observability utilities.

mod logging;
mod timer;

pub use logging::{init_tracing, LoggingConfig};
pub use timer::EvalTimer;
