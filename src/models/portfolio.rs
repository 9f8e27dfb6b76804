// ============================================================================
// Portefeuille : GET /api/portfolio
// ============================================================================
// Enregistrements plats en lecture seule, rechargés à chaque ouverture de la
// modale. Pas de cache, pas de fusion.
// ============================================================================

use std::collections::HashMap;

use serde::Deserialize;

/// Réponse complète du endpoint portefeuille
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioResponse {
    #[serde(default)]
    pub portfolio: PortfolioSummary,

    /// Prédictions par ticker (sert à générer le conseil)
    #[serde(default)]
    pub predictions: HashMap<String, StockPrediction>,
}

/// Résumé du portefeuille
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(default)]
    pub total_investment: Option<f64>,

    #[serde(default)]
    pub total_value: Option<f64>,

    #[serde(default)]
    pub total_profit: Option<f64>,

    #[serde(default)]
    pub total_return_rate: Option<f64>,

    #[serde(default)]
    pub stocks: Vec<PortfolioStock>,
}

/// Une ligne du portefeuille
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStock {
    #[serde(default)]
    pub ticker: String,

    #[serde(default)]
    pub stock_name: Option<String>,

    #[serde(default)]
    pub shares: u64,

    #[serde(default)]
    pub purchase_price: f64,

    #[serde(default)]
    pub current_price: f64,

    #[serde(default)]
    pub profit: Option<f64>,

    #[serde(default)]
    pub return_rate: Option<f64>,

    #[serde(default)]
    pub memo: Option<String>,
}

impl PortfolioStock {
    pub fn display_name(&self) -> &str {
        self.stock_name.as_deref().unwrap_or(&self.ticker)
    }
}

// ============================================================================
// Prédictions (entrée du conseil)
// ============================================================================

/// Détail d'une prédiction binaire (direction, volatilité ou risque)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionDetail {
    /// 0 ou 1
    #[serde(default)]
    pub prediction: i64,

    /// Probabilité associée à `prediction`
    #[serde(default)]
    pub probability: f64,

    #[serde(default)]
    pub label: Option<String>,
}

/// Prédictions complètes pour un ticker
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrediction {
    #[serde(default)]
    pub ticker: Option<String>,

    #[serde(default)]
    pub stock_name: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub direction: PredictionDetail,

    #[serde(default)]
    pub volatility: PredictionDetail,

    #[serde(default)]
    pub risk: PredictionDetail,
}

impl StockPrediction {
    /// Probabilité de hausse (0.0 ~ 1.0), quelle que soit la direction prédite
    pub fn upward_probability(&self) -> f64 {
        if self.direction.prediction == 1 {
            self.direction.probability
        } else {
            1.0 - self.direction.probability
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portfolio_response() {
        let json = r#"{
            "portfolio": {
                "totalInvestment": 1000000.0,
                "totalValue": 1050000.0,
                "totalProfit": 50000.0,
                "totalReturnRate": 5.0,
                "lastUpdated": "2025-01-01T10:00:00",
                "stocks": [
                    {"ticker": "005930.KS", "stockName": "Samsung", "shares": 10,
                     "purchasePrice": 70000.0, "currentPrice": 75000.0,
                     "profit": 50000.0, "returnRate": 7.14}
                ]
            },
            "predictions": {
                "005930.KS": {
                    "direction": {"prediction": 0, "probability": 0.7, "label": "down"},
                    "volatility": {"prediction": 0, "probability": 0.6},
                    "risk": {"prediction": 0, "probability": 0.8}
                }
            }
        }"#;

        let response: PortfolioResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.portfolio.stocks.len(), 1);
        assert_eq!(response.portfolio.stocks[0].display_name(), "Samsung");

        let prediction = &response.predictions["005930.KS"];
        assert!((prediction.upward_probability() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_object_parses() {
        let response: PortfolioResponse = serde_json::from_str("{}").unwrap();
        assert!(response.portfolio.stocks.is_empty());
        assert!(response.predictions.is_empty());
    }
}
