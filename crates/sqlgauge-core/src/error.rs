use thiserror::Error;

/// Failures the harness surfaces to its caller. Execution errors are not
/// here: the database rejecting a generated query is data (an
/// `ExecutionOutcome::Error`), not a harness failure.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The completion service call failed (network, auth, quota). Hard stop
    /// for the affected model; remaining models keep running.
    #[error("completion request failed for model {model}: {source}")]
    Generation {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
