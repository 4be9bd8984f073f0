//! Registration-data ("dados cadastrais") lookup seam.
//!
//! The portal never owns this data: handlers call
//! [`DadosCadastraisService`] with a verified user identifier and forward
//! whatever comes back to the view layer. Two implementations are provided,
//! an in-memory one for tests and dev mode and an HTTP proxy to an upstream
//! service.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registration data for a single portal user, produced by the backing
/// service and forwarded to the view layer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DadosCadastrais {
    pub usuario_id: String,
    pub nome: String,
    pub email: String,
    pub documento: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
}

#[derive(Debug, Error)]
pub enum CadastroError {
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("cadastro service unavailable: {0}")]
    Unavailable(String),
}

/// Lookup capability for registration data, keyed by user identifier.
#[async_trait]
pub trait DadosCadastraisService: Send + Sync {
    /// Fetches the registration data for `usuario_id`.
    ///
    /// `Ok(None)` means the identifier is valid but has no registration
    /// record; transport and decoding problems surface as errors.
    async fn obter_dados_cadastrais_por_usuario_id(
        &self,
        usuario_id: &str,
    ) -> Result<Option<DadosCadastrais>, CadastroError>;
}

/// In-memory registration store used by tests and dev mode.
#[derive(Default)]
pub struct MemoryCadastroService {
    registros: RwLock<HashMap<String, DadosCadastrais>>,
}

impl MemoryCadastroService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, dados: DadosCadastrais) {
        self.registros
            .write()
            .insert(dados.usuario_id.clone(), dados);
    }
}

#[async_trait]
impl DadosCadastraisService for MemoryCadastroService {
    async fn obter_dados_cadastrais_por_usuario_id(
        &self,
        usuario_id: &str,
    ) -> Result<Option<DadosCadastrais>, CadastroError> {
        Ok(self.registros.read().get(usuario_id).cloned())
    }
}

/// Proxies lookups to an upstream registration-data service over HTTP.
pub struct HttpCadastroService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCadastroService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DadosCadastraisService for HttpCadastroService {
    async fn obter_dados_cadastrais_por_usuario_id(
        &self,
        usuario_id: &str,
    ) -> Result<Option<DadosCadastrais>, CadastroError> {
        let url = format!("{}/cadastro/{usuario_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CadastroError::Upstream(err.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CadastroError::Upstream(format!(
                "upstream returned {}",
                response.status()
            )));
        }

        let dados = response
            .json::<DadosCadastrais>()
            .await
            .map_err(|err| CadastroError::Decode(err.to_string()))?;
        Ok(Some(dados))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registro(usuario_id: &str, nome: &str) -> DadosCadastrais {
        DadosCadastrais {
            usuario_id: usuario_id.to_string(),
            nome: nome.to_string(),
            email: format!("{nome}@example.com").to_lowercase(),
            documento: "123.456.789-00".to_string(),
            telefone: None,
            endereco: None,
        }
    }

    #[tokio::test]
    async fn test_memory_service_returns_stored_record() {
        let service = MemoryCadastroService::new();
        service.insert(registro("42", "Ana"));

        let dados = service
            .obter_dados_cadastrais_por_usuario_id("42")
            .await
            .unwrap()
            .expect("record stored for 42");
        assert_eq!(dados.nome, "Ana");
    }

    #[tokio::test]
    async fn test_memory_service_unknown_user_is_none() {
        let service = MemoryCadastroService::new();

        let dados = service
            .obter_dados_cadastrais_por_usuario_id("99")
            .await
            .unwrap();
        assert_eq!(dados, None);
    }

    #[test]
    fn test_http_service_normalizes_base_url() {
        let service = HttpCadastroService::new("http://localhost:9000/");
        assert_eq!(service.base_url, "http://localhost:9000");
    }
}
