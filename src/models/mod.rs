// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données échangées avec le
// backend du chatbot, plus les types propres au client (horizon, chandelles)
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Les "pub use" ci-dessous aplatissent les chemins d'import
// ============================================================================

pub mod candle;         // Chandelles journalières (graphique des cartes)
pub mod chat;           // Requête / réponse du chatbot
pub mod market;         // Sécurité du marché
pub mod portfolio;      // Portefeuille et prédictions
pub mod recommendation; // Recommandation d'un titre
pub mod timeframe;      // Horizon de prédiction
pub mod verification;   // Vérification des prédictions du jour

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use jusic_chat::models::chat::ChatResponse;
// On peut faire : use jusic_chat::models::ChatResponse;
pub use candle::Candle;
pub use chat::{ChartData, ChatRequest, ChatResponse, MessageKind, ResponseBody, SeriesData};
pub use market::{MarketSafety, MarketStatus, DEFAULT_TOTAL_STOCKS};
pub use portfolio::{PortfolioResponse, PortfolioStock, PortfolioSummary, PredictionDetail, StockPrediction};
pub use recommendation::StockRecommendation;
pub use timeframe::Timeframe;
pub use verification::{VerificationRecord, VerificationReport};
