use std::time::Instant;

use tracing::debug;

/// Measures one evaluation of a graph and logs it when finished.
#[derive(Debug)]
pub struct EvalTimer<'a> {
    start: Instant,
    graph: &'a str,
    output: &'a str,
}

impl<'a> EvalTimer<'a> {
    /// Starts timing an evaluation of `output` in `graph`.
    #[must_use]
    pub fn start(graph: &'a str, output: &'a str) -> Self {
        Self {
            start: Instant::now(),
            graph,
            output,
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Logs the evaluated `value` with the elapsed time and returns the
    /// duration in milliseconds.
    pub fn finish(self, value: f32) -> f64 {
        let duration_ms = self.elapsed_ms();
        debug!(
            graph = self.graph,
            output = self.output,
            value,
            duration_ms,
            "Graph evaluated"
        );
        duration_ms
    }
}
