// ============================================================================
// Messages du chatbot : requête et réponse typée
// ============================================================================
// La réponse du backend porte un discriminant `type` sous forme de chaîne.
// On la décode en enum (tagged union) pour que le dispatcher fasse un match
// exhaustif au lieu de comparer des chaînes.
//
// CONCEPTS RUST :
// 1. #[serde(from = "...")] : désérialise un type brut puis le convertit
// 2. Enum avec données : chaque mode de rendu porte ce dont il a besoin
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::{MarketSafety, StockRecommendation};

/// Discriminant qui déclenche le mode dashboard
pub const DASHBOARD_TYPE: &str = "recommendation_dashboard";

// ============================================================================
// Requête : POST /api/chat/message
// ============================================================================

/// Corps de la requête envoyée au chatbot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    /// Crée une requête avec un identifiant de session horodaté
    pub fn new(message: String) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self {
            message,
            session_id: format!("tui-session-{}", millis),
        }
    }
}

// ============================================================================
// Données de graphiques (chartData)
// ============================================================================

/// Une série étiquetée : labels, valeurs et couleurs
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeriesData {
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub values: Vec<f64>,

    #[serde(default)]
    pub colors: Vec<String>,
}

/// Données de graphiques attachées à une réponse
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Donut "sûr / risqué"
    #[serde(default)]
    pub market_safety: Option<SeriesData>,

    /// Barres de probabilité de hausse par titre
    #[serde(default)]
    pub recommendations: Option<SeriesData>,
}

// ============================================================================
// Réponse typée
// ============================================================================

/// Type de message d'une bulle (tout ce qui n'est pas un dashboard)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Greeting,
    MarketStatus,
    Recommendation,
    Analysis,
    Error,
    Default,
    MultiTimeframe,
    /// Type inconnu (ou absent) : rendu comme une bulle standard
    Other(String),
}

impl MessageKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            "greeting" => MessageKind::Greeting,
            "market_status" => MessageKind::MarketStatus,
            "recommendation" => MessageKind::Recommendation,
            "analysis" => MessageKind::Analysis,
            "error" => MessageKind::Error,
            "default" => MessageKind::Default,
            "multi_timeframe" => MessageKind::MultiTimeframe,
            other => MessageKind::Other(other.to_string()),
        }
    }
}

/// Contenu commun aux deux modes de rendu
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseBody {
    pub message: Option<String>,
    pub chart_data: Option<ChartData>,
    pub recommendations: Vec<StockRecommendation>,
    pub market_safety: Option<MarketSafety>,
}

/// Réponse du chatbot, décodée depuis le discriminant `type`
///
/// CONCEPT RUST : Tagged union
/// - Dashboard : pas de bulle, bloc graphique + cartes
/// - Message : bulle standard (texte, graphiques, cartes, en-tête)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawChatResponse")]
pub enum ChatResponse {
    Dashboard(ResponseBody),
    Message { kind: MessageKind, body: ResponseBody },
}

impl ChatResponse {
    pub fn body(&self) -> &ResponseBody {
        match self {
            ChatResponse::Dashboard(body) => body,
            ChatResponse::Message { body, .. } => body,
        }
    }

    pub fn recommendations(&self) -> &[StockRecommendation] {
        &self.body().recommendations
    }
}

/// Forme JSON brute, telle qu'envoyée par le backend
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChatResponse {
    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    chart_data: Option<ChartData>,

    #[serde(default)]
    recommendations: Option<Vec<StockRecommendation>>,

    #[serde(default)]
    market_safety: Option<MarketSafety>,
}

impl From<RawChatResponse> for ChatResponse {
    fn from(raw: RawChatResponse) -> Self {
        let body = ResponseBody {
            message: raw.message,
            chart_data: raw.chart_data,
            recommendations: raw.recommendations.unwrap_or_default(),
            market_safety: raw.market_safety,
        };

        match raw.kind.as_deref() {
            Some(DASHBOARD_TYPE) => ChatResponse::Dashboard(body),
            Some(kind) => ChatResponse::Message {
                kind: MessageKind::from_type(kind),
                body,
            },
            None => ChatResponse::Message {
                kind: MessageKind::Other(String::new()),
                body,
            },
        }
    }
}
