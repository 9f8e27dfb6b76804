// ============================================================================
// Réseau : requêtes et réponses vues par le worker hors-ligne
// ============================================================================
// Le worker hors-ligne ne parle jamais directement à reqwest : il passe par le
// trait `Network`. En production c'est `HttpNetwork` ; dans les tests, un faux
// réseau simule le mode hors-ligne.
//
// CONCEPT RUST : async-trait
// - Les méthodes async dans un trait objet (dyn Network) ont besoin de la
//   macro #[async_trait] pour être boxées
// - Send + Sync : le trait objet peut vivre dans un Arc partagé entre tâches
// ============================================================================

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Méthode HTTP utilisée par le client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// Requête vers le backend (chemin relatif à l'URL de base)
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// Corps JSON déjà sérialisé
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }

    /// POST avec un corps sérialisé en JSON
    pub fn post_json<T: Serialize>(path: impl Into<String>, payload: &T) -> Result<Self> {
        let body = serde_json::to_vec(payload).context("Échec de la sérialisation du corps JSON")?;
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Réponse complète, corps en mémoire
///
/// CONCEPT RUST : Clone
/// - Le worker renvoie la réponse à l'appelant ET en garde une copie pour le
///   cache : on clone explicitement
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// Statut 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Désérialise le corps JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .with_context(|| format!("Réponse JSON invalide (statut {})", self.status))
    }
}

/// Accès réseau abstrait
#[async_trait]
pub trait Network: Send + Sync {
    /// Envoie une requête ; une erreur signifie que le réseau est injoignable
    /// (un statut HTTP d'erreur reste une réponse)
    async fn send(&self, request: &Request) -> Result<Response>;
}

// ============================================================================
// Implémentation reqwest
// ============================================================================

/// Réseau réel vers le backend
pub struct HttpNetwork {
    http: reqwest::Client,
    base_url: String,
}

impl HttpNetwork {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("jusic-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Network for HttpNetwork {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: &Request) -> Result<Response> {
        let url = self.url(&request.path);

        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };

        let builder = match &request.body {
            Some(body) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone()),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", url))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .context("Échec de la lecture du corps de la réponse")?
            .to_vec();

        debug!(status, bytes = body.len(), "Réponse reçue");

        Ok(Response {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_json_serializes_body() {
        let request = Request::post_json("/api/chat/message", &serde_json::json!({"message": "hi"})).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.as_deref(), Some(br#"{"message":"hi"}"#.as_slice()));
    }

    #[test]
    fn test_response_success_range() {
        assert!(Response::new(200, None, Vec::new()).is_success());
        assert!(Response::new(204, None, Vec::new()).is_success());
        assert!(!Response::new(404, None, Vec::new()).is_success());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let network = HttpNetwork::new("http://localhost:8080/").unwrap();
        assert_eq!(network.url("/api/portfolio"), "http://localhost:8080/api/portfolio");
    }
}
