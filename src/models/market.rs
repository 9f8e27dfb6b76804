// ============================================================================
// Structure : MarketSafety
// ============================================================================
// Résumé agrégé de la "sécurité" du marché : combien de titres suivis sont
// classés peu risqués / peu volatils.
//
// CONCEPTS RUST :
// 1. Option<T> pour les champs JSON absents OU null (Jackson envoie des null)
// 2. Accesseurs avec valeur par défaut : le rendu ne doit jamais échouer
// ============================================================================

use serde::{Deserialize, Serialize};

/// Total utilisé par les jauges quand le backend n'en fournit pas
pub const DEFAULT_TOTAL_STOCKS: u32 = 30;

/// Commentaire affiché quand le backend renvoie l'ancienne structure
pub const LEGACY_MARKET_COMMENT: &str =
    "💡 Tenez compte de la situation actuelle du marché et investissez prudemment.";

/// Sécurité du marché telle que renvoyée par l'API
///
/// Tous les champs sont optionnels : un champ manquant s'affiche comme 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSafety {
    #[serde(default)]
    pub safe_stocks: Option<u32>,

    #[serde(default)]
    pub total_stocks: Option<u32>,

    #[serde(default)]
    pub risky_stocks: Option<u32>,

    #[serde(default)]
    pub low_volatility_stocks: Option<u32>,

    #[serde(default)]
    pub high_volatility_stocks: Option<u32>,

    /// Pourcentage (0.0 ~ 100.0)
    #[serde(default)]
    pub safety_rate: Option<f64>,

    /// Pourcentage (0.0 ~ 100.0)
    #[serde(default)]
    pub volatility_rate: Option<f64>,

    #[serde(default)]
    pub market_comment: Option<String>,
}

impl MarketSafety {
    pub fn safe_stocks(&self) -> u32 {
        self.safe_stocks.unwrap_or(0)
    }

    pub fn total_stocks(&self) -> u32 {
        self.total_stocks.unwrap_or(0)
    }

    pub fn low_volatility_stocks(&self) -> u32 {
        self.low_volatility_stocks.unwrap_or(0)
    }

    pub fn safety_rate(&self) -> f64 {
        self.safety_rate.unwrap_or(0.0)
    }

    pub fn volatility_rate(&self) -> f64 {
        self.volatility_rate.unwrap_or(0.0)
    }

    /// Total à utiliser pour les jauges
    ///
    /// Un total absent ou nul retombe sur DEFAULT_TOTAL_STOCKS.
    pub fn gauge_total(&self) -> u32 {
        match self.total_stocks {
            Some(total) if total > 0 => total,
            _ => DEFAULT_TOTAL_STOCKS,
        }
    }
}

// ============================================================================
// Réponse de GET /api/chat/market-status
// ============================================================================

/// Réponse brute du endpoint market-status
///
/// CONCEPT : Compatibilité ascendante
/// - Nouveau format : un objet `marketSafety` complet
/// - Ancien format : trois champs plats (safeStockCount, totalStockCount, safetyRate 0~1)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub market_safety: Option<MarketSafety>,

    #[serde(default)]
    pub safe_stock_count: Option<u32>,

    #[serde(default)]
    pub total_stock_count: Option<u32>,

    /// Ratio 0.0 ~ 1.0 (ancien format)
    #[serde(default)]
    pub safety_rate: Option<f64>,
}

impl MarketStatus {
    /// Convertit la réponse en MarketSafety, en reconstruisant l'objet
    /// à partir de l'ancien format si nécessaire
    pub fn into_market_safety(self) -> MarketSafety {
        if let Some(safety) = self.market_safety {
            return safety;
        }

        let total = match self.total_stock_count {
            Some(total) if total > 0 => total,
            _ => DEFAULT_TOTAL_STOCKS,
        };

        MarketSafety {
            safe_stocks: Some(self.safe_stock_count.unwrap_or(0)),
            total_stocks: Some(total),
            risky_stocks: None,
            low_volatility_stocks: Some(0),
            high_volatility_stocks: None,
            safety_rate: Some(self.safety_rate.unwrap_or(0.0) * 100.0),
            volatility_rate: Some(0.0),
            market_comment: Some(LEGACY_MARKET_COMMENT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let safety: MarketSafety = serde_json::from_str(r#"{"safeStocks": null}"#).unwrap();
        assert_eq!(safety.safe_stocks(), 0);
        assert_eq!(safety.total_stocks(), 0);
        assert_eq!(safety.safety_rate(), 0.0);
        assert!(safety.market_comment.is_none());
    }

    #[test]
    fn test_gauge_total_falls_back() {
        let safety = MarketSafety::default();
        assert_eq!(safety.gauge_total(), DEFAULT_TOTAL_STOCKS);

        let safety = MarketSafety {
            total_stocks: Some(12),
            ..Default::default()
        };
        assert_eq!(safety.gauge_total(), 12);
    }

    #[test]
    fn test_market_status_prefers_market_safety_object() {
        let json = r#"{
            "marketSafety": {"safeStocks": 18, "totalStocks": 30, "safetyRate": 60.0},
            "safeStockCount": 1
        }"#;
        let status: MarketStatus = serde_json::from_str(json).unwrap();
        let safety = status.into_market_safety();
        assert_eq!(safety.safe_stocks(), 18);
        assert_eq!(safety.safety_rate(), 60.0);
    }

    #[test]
    fn test_market_status_legacy_format() {
        let json = r#"{"safeStockCount": 9, "safetyRate": 0.3}"#;
        let status: MarketStatus = serde_json::from_str(json).unwrap();
        let safety = status.into_market_safety();
        assert_eq!(safety.safe_stocks(), 9);
        assert_eq!(safety.total_stocks(), 30);
        assert!((safety.safety_rate() - 30.0).abs() < 1e-9);
        assert_eq!(safety.market_comment.as_deref(), Some(LEGACY_MARKET_COMMENT));
    }
}
