mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called at the start of each binary, before anything is logged.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {{ $crate::tracer::TracerEngine::new($options, env!("CARGO_BIN_NAME")) }};
}
