// ============================================================================
// API Client : backend Jusic
// ============================================================================
// Tous les appels passent par le worker hors-ligne :
// - GET : réseau d'abord, repli sur le cache
// - POST / DELETE : réseau uniquement
//
// Les corps JSON sont décodés quel que soit le statut HTTP (le backend
// renvoie un JSON exploitable même en erreur), sauf pour la suppression
// d'un titre où seul le statut compte.
// ============================================================================

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::models::{
    ChatRequest, ChatResponse, MarketSafety, MarketStatus, PortfolioResponse, Timeframe,
    VerificationReport,
};
use crate::offline::{CacheStorage, Network, OfflineWorker, Request};

pub const MARKET_STATUS_PATH: &str = "/api/chat/market-status";
pub const CHAT_MESSAGE_PATH: &str = "/api/chat/message";
pub const PORTFOLIO_PATH: &str = "/api/portfolio";
pub const VERIFICATION_TODAY_PATH: &str = "/api/verification/today";

/// Chemin de suppression d'un titre du portefeuille
pub fn portfolio_remove_path(ticker: &str) -> String {
    format!("/api/portfolio/remove/{}", ticker)
}

pub struct ApiClient {
    worker: OfflineWorker,
}

impl ApiClient {
    pub fn new(network: Arc<dyn Network>, storage: CacheStorage) -> Self {
        Self {
            worker: OfflineWorker::new(network, storage),
        }
    }

    pub fn worker(&self) -> &OfflineWorker {
        &self.worker
    }

    /// Installe puis active le worker hors-ligne
    pub async fn start_offline(&mut self) -> Result<()> {
        self.worker.install().await.context("Installation du cache hors-ligne")?;
        let deleted = self.worker.activate().await.context("Activation du cache hors-ligne")?;
        info!(deleted = deleted.len(), cache = %self.worker.cache_name(), "Worker hors-ligne actif");
        Ok(())
    }

    /// État du marché au démarrage
    #[instrument(skip(self))]
    pub async fn market_status(&self) -> Result<MarketSafety> {
        let response = self
            .worker
            .fetch(&Request::get(MARKET_STATUS_PATH))
            .await
            .context("Échec du chargement de l'état du marché")?;

        let status: MarketStatus = response.json()?;
        Ok(status.into_market_safety())
    }

    /// Envoie un message au chatbot
    ///
    /// Le mot-clé d'horizon est ajouté au texte envoyé si nécessaire ;
    /// le texte affiché côté utilisateur reste l'original.
    #[instrument(skip(self, message), fields(timeframe = %timeframe))]
    pub async fn send_message(&self, message: &str, timeframe: Timeframe) -> Result<ChatResponse> {
        let outgoing = timeframe.apply_to(message);
        debug!(outgoing = %outgoing, "Message envoyé au chatbot");

        let request = Request::post_json(CHAT_MESSAGE_PATH, &ChatRequest::new(outgoing))?;
        let response = self
            .worker
            .fetch(&request)
            .await
            .context("Échec de l'envoi du message")?;

        if !response.is_success() {
            warn!(status = response.status, "Statut HTTP inattendu pour le chat");
        }
        response.json()
    }

    #[instrument(skip(self))]
    pub async fn portfolio(&self) -> Result<PortfolioResponse> {
        let response = self
            .worker
            .fetch(&Request::get(PORTFOLIO_PATH))
            .await
            .context("Échec du chargement du portefeuille")?;

        response.json()
    }

    /// Retire un titre ; tout statut non 2xx est une erreur
    #[instrument(skip(self))]
    pub async fn remove_from_portfolio(&self, ticker: &str) -> Result<()> {
        let response = self
            .worker
            .fetch(&Request::delete(portfolio_remove_path(ticker)))
            .await
            .context("Échec de la suppression du titre")?;

        if !response.is_success() {
            bail!("Suppression de {} refusée (statut {})", ticker, response.status);
        }

        info!(ticker, "Titre retiré du portefeuille");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn verification_today(&self) -> Result<VerificationReport> {
        let response = self
            .worker
            .fetch(&Request::get(VERIFICATION_TODAY_PATH))
            .await
            .context("Échec du chargement de la vérification")?;

        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::cache::tests::temp_root;
    use crate::offline::network::{Method, Response};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend simulé : répond par chemin, enregistre les requêtes reçues
    struct FakeBackend {
        requests: Mutex<Vec<Request>>,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Network for FakeBackend {
        async fn send(&self, request: &Request) -> Result<Response> {
            self.requests.lock().unwrap().push(request.clone());

            let (status, body) = match (request.method, request.path.as_str()) {
                (Method::Get, MARKET_STATUS_PATH) => {
                    (200, r#"{"safeStockCount": 12, "totalStockCount": 0, "safetyRate": 0.4}"#)
                }
                (Method::Post, CHAT_MESSAGE_PATH) => (200, r#"{"type": "greeting", "message": "Bonjour"}"#),
                (Method::Get, PORTFOLIO_PATH) => (
                    200,
                    r#"{"portfolio": {"totalInvestment": 0, "totalValue": 0, "stocks": []}, "predictions": {}}"#,
                ),
                (Method::Delete, "/api/portfolio/remove/005930.KS") => (200, "{}"),
                (Method::Delete, _) => (404, "{}"),
                (Method::Get, VERIFICATION_TODAY_PATH) => (200, r#"{"error": "Aucune donnée"}"#),
                _ => (404, "{}"),
            };
            Ok(Response::new(status, Some("application/json"), body.as_bytes().to_vec()))
        }
    }

    fn client(label: &str) -> (ApiClient, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new());
        let client = ApiClient::new(backend.clone(), CacheStorage::new(temp_root(label)));
        (client, backend)
    }

    #[tokio::test]
    async fn test_market_status_legacy_format() {
        let (client, _) = client("api-market");
        let safety = client.market_status().await.unwrap();

        assert_eq!(safety.safe_stocks(), 12);
        assert_eq!(safety.total_stocks(), 30);
        assert!((safety.safety_rate() - 40.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_send_message_applies_timeframe_keyword() {
        let (client, backend) = client("api-chat");
        let response = client.send_message("추천해줘", Timeframe::Day1).await.unwrap();
        assert_eq!(response.body().message.as_deref(), Some("Bonjour"));

        let requests = backend.requests.lock().unwrap();
        let body: serde_json::Value = serde_json::from_slice(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["message"], "내일 추천해줘");
        assert!(body["sessionId"].as_str().unwrap().starts_with("tui-session-"));
    }

    #[tokio::test]
    async fn test_remove_from_portfolio_status() {
        let (client, _) = client("api-remove");
        assert!(client.remove_from_portfolio("005930.KS").await.is_ok());
        assert!(client.remove_from_portfolio("UNKNOWN").await.is_err());
    }

    #[tokio::test]
    async fn test_verification_error_is_decoded() {
        let (client, _) = client("api-verification");
        let report = client.verification_today().await.unwrap();
        assert_eq!(report.error.as_deref(), Some("Aucune donnée"));
    }
}
