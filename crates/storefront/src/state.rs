//! Application state shared by front-ends.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::services::{AuthService, ProfileService};
use crate::session::Session;
use crate::store::{FileStore, LocalStore};
use crate::tryon::{GenerationError, HttpGenerator, TryOnPipeline};

/// Configuration, local storage and API clients, wired together.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    session: Session,
    api: ApiClient,
    generator: HttpGenerator,
}

impl AppState {
    /// Create state backed by the file store in `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, GenerationError> {
        let store = Arc::new(FileStore::new(&config.state_dir));
        Self::with_store(config, store)
    }

    /// Create state on top of an arbitrary store.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation HTTP client cannot be built.
    pub fn with_store(
        config: ClientConfig,
        store: Arc<dyn LocalStore>,
    ) -> Result<Self, GenerationError> {
        let generator = HttpGenerator::new(&config.tryon)?;
        let api = ApiClient::new(config.api_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                session: Session::new(store),
                config,
                api,
                generator,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn generator(&self) -> &HttpGenerator {
        &self.inner.generator
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.api, &self.inner.session)
    }

    #[must_use]
    pub fn profiles(&self) -> ProfileService<'_> {
        ProfileService::new(&self.inner.api, &self.inner.session)
    }

    /// A try-on pipeline using the configured strategy and endpoint.
    #[must_use]
    pub fn pipeline(&self) -> TryOnPipeline<HttpGenerator> {
        let tryon = &self.inner.config.tryon;
        TryOnPipeline::new(
            self.inner.generator.clone(),
            self.inner.session.try_on_cache(),
            tryon.strategy,
        )
        .with_garment_type(tryon.send_garment_type)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> ClientConfig {
        ClientConfig::from_lookup(|key| match key {
            "FITTING_ROOM_API_URL" => Some("http://localhost:8000".to_string()),
            "FITTING_ROOM_TRYON_URL" => Some("http://localhost:8001/fashion-face-swap/".to_string()),
            "TRYON_STRATEGY" => Some("parallel".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_pipeline_uses_configured_strategy() {
        let state = AppState::with_store(config(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(state.pipeline().strategy().name(), "parallel");
        assert_eq!(
            state.generator().endpoint().as_str(),
            "http://localhost:8001/fashion-face-swap/"
        );
    }

    #[test]
    fn test_state_shares_one_session() {
        let state = AppState::with_store(config(), Arc::new(MemoryStore::new())).unwrap();
        let clone = state.clone();
        state
            .session()
            .set_token(&crate::session::AuthToken::new("abc"))
            .unwrap();
        assert!(clone.session().is_authenticated().unwrap());
    }
}
