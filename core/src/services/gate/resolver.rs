use async_trait::async_trait;

use crate::errors::ResolveError;

/// Looks up the protected attribute of a subject (the checkout URL of a cart)
#[async_trait]
pub trait SubjectAttributeResolver: Send + Sync {
    async fn resolve(&self, subject_id: &str) -> Result<String, ResolveError>;
}
