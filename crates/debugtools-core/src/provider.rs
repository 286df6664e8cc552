//! Metadata providers: callbacks consulted at log time for contextual metadata.

use std::fmt;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::metadata::Metadata;

type ProviderFn = dyn Fn() -> Result<Metadata, ProviderError> + Send + Sync;

/// Supplies metadata at the moment a record is logged.
///
/// Providers are the least specific metadata source: their keys only survive
/// when neither the handler nor the log call sets the same key.
#[derive(Clone)]
pub struct MetadataProvider {
    inner: Arc<ProviderFn>,
}

impl MetadataProvider {
    /// Create a provider from an infallible callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Metadata + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move || Ok(f())),
        }
    }

    /// Create a provider from a callback that may fail.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn() -> Result<Metadata, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            inner: Arc::new(move || f().map_err(|e| ProviderError::new(e.to_string()))),
        }
    }

    /// Combine several providers into one.
    ///
    /// Providers are consulted in order; when two return the same key the later
    /// provider's value is kept. A failing provider contributes nothing.
    pub fn multiplex(providers: Vec<MetadataProvider>) -> Self {
        Self {
            inner: Arc::new(move || {
                let mut merged = Metadata::new();
                for provider in &providers {
                    merged.extend(provider.get());
                }
                Ok(merged)
            }),
        }
    }

    /// Invoke the provider, surfacing its error.
    pub fn try_get(&self) -> Result<Metadata, ProviderError> {
        (self.inner)()
    }

    /// Invoke the provider. Failures are reported and degrade to empty metadata.
    pub fn get(&self) -> Metadata {
        match self.try_get() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(
                    target: "debugtools_core::provider",
                    error = %e,
                    "Metadata provider failed; continuing without provider metadata"
                );
                Metadata::new()
            }
        }
    }
}

impl fmt::Debug for MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataProvider").finish_non_exhaustive()
    }
}
