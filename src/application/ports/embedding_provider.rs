use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug)]
pub enum ProviderError {
    /// The configured backend cannot perform this capability at all. A
    /// deployment-time configuration error, not a per-request failure.
    CapabilityUnavailable(String),
    DimensionMismatch { expected: usize, actual: usize },
    Timeout(u64),
    Failure(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::CapabilityUnavailable(msg) => {
                write!(f, "Capability unavailable: {}", msg)
            }
            ProviderError::DimensionMismatch { expected, actual } => {
                write!(f, "Embedding dimension mismatch: expected {}, got {}", expected, actual)
            }
            ProviderError::Timeout(secs) => write!(f, "Provider call timed out after {}s", secs),
            ProviderError::Failure(msg) => write!(f, "Provider failure: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Maps text to a fixed-length vector. All implementations wired into one
/// deployment must produce vectors of the same dimension; repeated calls with
/// identical text are safe to retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector, ProviderError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError>;

    /// Dimension D of produced vectors. Only meaningful when
    /// `supports_embedding` returns true.
    fn dimension(&self) -> usize;

    fn model_info(&self) -> (String, Option<String>);

    /// Whether this backend can embed at all. Checked once at startup so a
    /// misconfigured deployment fails fast instead of per request.
    fn supports_embedding(&self) -> bool {
        true
    }
}
