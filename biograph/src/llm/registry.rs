//! Provider registry: picks an LLM client per request.
//!
//! Providers are registered once at startup, each either available (with a factory)
//! or listed but unavailable. `select` never probes a provider at run time; when the
//! requested provider is unknown or unavailable it substitutes the default provider
//! and reports which one it used.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::CapabilityError;
use crate::llm::LlmClient;

type LlmFactory = Arc<dyn Fn(&str) -> Arc<dyn LlmClient> + Send + Sync>;

/// One provider entry: name, models, and a factory when available.
#[derive(Clone)]
pub struct Provider {
    name: String,
    default_model: String,
    models: Vec<String>,
    factory: Option<LlmFactory>,
}

impl Provider {
    /// Available provider; `factory` builds a client for a model name.
    pub fn new<F>(name: impl Into<String>, default_model: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn LlmClient> + Send + Sync + 'static,
    {
        let default_model = default_model.into();
        Self {
            name: name.into(),
            models: vec![default_model.clone()],
            default_model,
            factory: Some(Arc::new(factory)),
        }
    }

    /// Provider that is known but not configured; requests for it fall back.
    pub fn unavailable(name: impl Into<String>, default_model: impl Into<String>) -> Self {
        let default_model = default_model.into();
        Self {
            name: name.into(),
            models: vec![default_model.clone()],
            default_model,
            factory: None,
        }
    }

    /// Replace the advertised model list (builder). The default model stays first.
    pub fn with_models<I, T>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut list = vec![self.default_model.clone()];
        for m in models {
            let m = m.into();
            if !list.contains(&m) {
                list.push(m);
            }
        }
        self.models = list;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_available(&self) -> bool {
        self.factory.is_some()
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("default_model", &self.default_model)
            .field("models", &self.models)
            .field("available", &self.is_available())
            .finish()
    }
}

/// Public description of a provider, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub models: Vec<String>,
    pub available: bool,
}

/// Client chosen for one run plus the provider/model that actually serve it.
#[derive(Clone)]
pub struct LlmSelection {
    pub client: Arc<dyn LlmClient>,
    pub provider: String,
    pub model: String,
    /// True when the requested provider was substituted by the default.
    pub fell_back: bool,
}

impl fmt::Debug for LlmSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSelection")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("fell_back", &self.fell_back)
            .finish_non_exhaustive()
    }
}

/// Registry of LLM providers with a default.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    default_provider: String,
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            default_provider: default_provider.into(),
            providers: Vec::new(),
        }
    }

    /// Registers a provider (builder). A later entry with the same name replaces the earlier one.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.retain(|p| p.name != provider.name);
        self.providers.push(provider);
        self
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Default model of the default provider, if that provider is registered.
    pub fn default_model(&self) -> Option<&str> {
        self.find(&self.default_provider)
            .map(|p| p.default_model.as_str())
    }

    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                name: p.name.clone(),
                models: p.models.clone(),
                available: p.is_available(),
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Picks the client for a request.
    ///
    /// `provider = None` means the default provider; `model = None` means that
    /// provider's default model. When the requested provider is unknown or unavailable,
    /// the default provider serves the request with its default model.
    ///
    /// # Errors
    ///
    /// `CapabilityError::NoProvider` when the default provider itself is missing or unavailable.
    pub fn select(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<LlmSelection, CapabilityError> {
        let requested = provider
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(self.default_provider.as_str());
        let model = model.filter(|m| !m.trim().is_empty());

        if let Some(entry) = self.find(requested) {
            if let Some(factory) = &entry.factory {
                let model = model.unwrap_or(entry.default_model.as_str()).to_string();
                return Ok(LlmSelection {
                    client: factory(&model),
                    provider: entry.name.clone(),
                    model,
                    fell_back: false,
                });
            }
        }

        let fallback = self
            .find(&self.default_provider)
            .filter(|p| p.is_available())
            .ok_or(CapabilityError::NoProvider)?;
        let factory = fallback.factory.as_ref().ok_or(CapabilityError::NoProvider)?;
        tracing::warn!(
            requested = %requested,
            provider = %fallback.name,
            model = %fallback.default_model,
            "requested provider unavailable, falling back to default"
        );
        Ok(LlmSelection {
            client: factory(&fallback.default_model),
            provider: fallback.name.clone(),
            model: fallback.default_model.clone(),
            fell_back: true,
        })
    }
}
