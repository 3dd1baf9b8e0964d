use anyhow::Result;
use async_trait::async_trait;
use sqlgauge_types::ExecutionOutcome;

/// Runs SQL against the target database.
///
/// `execute` is infallible by contract: an engine rejection becomes the
/// `Error` outcome variant, never a Rust error. `schema_text` renders the
/// schema in the one-line-per-table form the prompt templates expect, e.g.
/// `Album: [AlbumId, Title, ArtistId]`.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn schema_text(&self) -> Result<String>;
    async fn execute(&self, sql: &str) -> ExecutionOutcome;
}
