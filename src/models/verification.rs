// ============================================================================
// Vérification des prédictions du jour : GET /api/verification/today
// ============================================================================
// Le script de vérification produit du snake_case, sauf `stockName`.
// ============================================================================

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;

/// Rapport de vérification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationReport {
    /// Présent quand le script de vérification a échoué
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub prediction_date: Option<String>,

    #[serde(default)]
    pub target_date: Option<String>,

    #[serde(default)]
    pub verification_date: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    /// Précision en pourcentage
    #[serde(default)]
    pub accuracy: Option<f64>,

    #[serde(default)]
    pub avg_return: Option<f64>,

    #[serde(default)]
    pub total_return: Option<f64>,

    #[serde(default)]
    pub recommendations: Vec<VerificationRecord>,
}

impl VerificationReport {
    pub fn accuracy(&self) -> f64 {
        self.accuracy.unwrap_or(0.0)
    }

    pub fn avg_return(&self) -> f64 {
        self.avg_return.unwrap_or(0.0)
    }

    pub fn total_return(&self) -> f64 {
        self.total_return.unwrap_or(0.0)
    }

    /// Nombre de prédictions correctes
    pub fn correct_count(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.is_correct == Some(true))
            .count()
    }

    /// Nombre de prédictions déjà tranchées (correctes ou non)
    pub fn decided_count(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.is_correct.is_some())
            .count()
    }

    /// Horodatage du rapport formaté en heure locale
    ///
    /// Accepte RFC 3339 ou un `LocalDateTime` ISO sans fuseau.
    pub fn timestamp_label(&self) -> Option<String> {
        let raw = self.timestamp.as_deref()?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string());
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .or_else(|| Some(raw.to_string()))
    }
}

/// Résultat de vérification pour un titre recommandé
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationRecord {
    #[serde(default)]
    pub ticker: Option<String>,

    #[serde(default, rename = "stockName", alias = "stock_name")]
    pub stock_name: String,

    #[serde(default)]
    pub predicted_direction: String,

    /// Probabilité prédite en pourcentage
    #[serde(default)]
    pub predicted_prob: f64,

    #[serde(default)]
    pub start_price: f64,

    #[serde(default)]
    pub current_price: f64,

    /// Variation réelle en pourcentage
    #[serde(default)]
    pub actual_change: f64,

    #[serde(default)]
    pub actual_direction: String,

    #[serde(default)]
    pub status: String,

    /// None : en attente
    #[serde(default)]
    pub is_correct: Option<bool>,
}
