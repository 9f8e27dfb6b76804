// ============================================================================
// Structure : StockRecommendation
// ============================================================================
// Une recommandation de titre renvoyée par le chatbot.
// Valeurs d'affichage en lecture seule : aucune logique métier ici.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Recommandation d'un titre
///
/// CONCEPT RUST : Option partout
/// - Le backend (Jackson + Lombok) sérialise les champs absents en `null`
/// - Chaque champ est donc optionnel, et les vues choisissent leur défaut
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecommendation {
    #[serde(default)]
    pub ticker: String,

    /// Nom pour la carte inline
    #[serde(default)]
    pub name: Option<String>,

    /// Nom pour la carte dashboard
    #[serde(default)]
    pub stock_name: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,

    /// Probabilité de hausse en pourcentage (0 ~ 100)
    #[serde(default)]
    pub upward_probability: Option<f64>,

    /// 0 : sûr, 1 : risqué
    #[serde(default)]
    pub risk: Option<f64>,

    /// Probabilité de risque (0.0 ~ 1.0)
    #[serde(default)]
    pub risk_probability: Option<f64>,

    /// 0 : faible, 1 : forte
    #[serde(default)]
    pub volatility: Option<f64>,

    /// Probabilité de forte volatilité (0.0 ~ 1.0)
    #[serde(default)]
    pub volatility_probability: Option<f64>,

    /// 0 : baisse, 1 : hausse
    #[serde(default)]
    pub direction: Option<i64>,

    /// Probabilité associée à la prédiction de direction (0.0 ~ 1.0)
    #[serde(default)]
    pub direction_probability: Option<f64>,

    #[serde(default)]
    pub investment_amount: Option<f64>,

    #[serde(default)]
    pub actual_amount: Option<f64>,

    #[serde(default)]
    pub shares: Option<u64>,

    #[serde(default)]
    pub reason: Option<String>,
}

impl StockRecommendation {
    /// Nom affiché : `name`, puis `stockName`, puis le ticker
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.stock_name.as_deref())
            .unwrap_or(&self.ticker)
    }

    /// Nom pour la variante dashboard : `stockName` en priorité
    pub fn dashboard_name(&self) -> &str {
        self.stock_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.ticker)
    }

    pub fn upward_probability(&self) -> f64 {
        self.upward_probability.unwrap_or(0.0)
    }

    pub fn current_price(&self) -> f64 {
        self.current_price.unwrap_or(0.0)
    }

    pub fn shares(&self) -> u64 {
        self.shares.unwrap_or(0)
    }

    /// risk == 1
    pub fn is_risky(&self) -> bool {
        self.risk == Some(1.0)
    }

    /// volatility == 1
    pub fn is_volatile(&self) -> bool {
        self.volatility == Some(1.0)
    }

    /// risk == 0 && volatility == 0
    pub fn is_safe(&self) -> bool {
        self.risk == Some(0.0) && self.volatility == Some(0.0)
    }
}
