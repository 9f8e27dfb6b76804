// ============================================================================
// Modales : portefeuille, vérification, titres à forte probabilité
// ============================================================================
// Chaque modale est un view model construit à partir d'une réponse JSON
// fraîchement récupérée. Rien n'est mis en cache entre deux ouvertures.
// ============================================================================

use crate::models::{PortfolioResponse, StockPrediction, StockRecommendation, VerificationReport};
use crate::render::format::{rate_text, signed_percent, signed_won, won};

/// Seuil (en %) au-delà duquel un titre déclenche l'alerte
pub const HIGH_PROBABILITY_THRESHOLD: f64 = 60.0;

/// Capital de référence de la simulation d'investissement
pub const SIMULATION_BASE: f64 = 1_000_000.0;

/// Nombre de titres entre lesquels le capital est réparti
pub const SIMULATION_SPLIT: f64 = 3.0;

// ============================================================================
// Portefeuille
// ============================================================================

/// Une ligne de la modale portefeuille
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRow {
    pub ticker: String,
    pub title: String,
    pub profit: String,
    pub return_rate: String,
    pub profitable: bool,
    pub holdings: String,
    pub current: String,
    pub advice: Option<String>,
}

/// Modale portefeuille
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub total_investment: String,
    pub total_value: String,
    pub return_rate: String,
    pub return_positive: bool,
    /// Vide : afficher le message "portefeuille vide"
    pub rows: Vec<PortfolioRow>,
}

impl PortfolioView {
    pub fn from_response(response: &PortfolioResponse) -> Self {
        let summary = &response.portfolio;
        let return_rate = summary.total_return_rate.unwrap_or(0.0);

        let rows = summary
            .stocks
            .iter()
            .map(|stock| {
                let profit = stock.profit.unwrap_or(0.0);
                let rate = stock.return_rate.unwrap_or(0.0);

                PortfolioRow {
                    ticker: stock.ticker.clone(),
                    title: format!("{} ({})", stock.display_name(), stock.ticker),
                    profit: signed_won(profit),
                    return_rate: format!("{:.2}%", rate),
                    profitable: profit >= 0.0,
                    holdings: format!("Détenu : {} × {}", stock.shares, won(stock.purchase_price)),
                    current: format!("Actuel : {}", won(stock.current_price)),
                    advice: response.predictions.get(&stock.ticker).map(prediction_advice),
                }
            })
            .collect();

        Self {
            total_investment: won(summary.total_investment.unwrap_or(0.0)),
            total_value: won(summary.total_value.unwrap_or(0.0)),
            return_rate: if return_rate >= 0.0 {
                format!("+{:.2}%", return_rate)
            } else {
                format!("{:.2}%", return_rate)
            },
            return_positive: return_rate >= 0.0,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Conseil généré à partir des prédictions d'un titre détenu
///
/// 1. hausse + sûr + faible volatilité → conserver
/// 2. baisse avec hausse < 50 % → envisager de couper la perte
/// 3. risque → prudence, avec la probabilité de risque
/// 4. sinon → continuer à surveiller
pub fn prediction_advice(prediction: &StockPrediction) -> String {
    let direction = prediction.direction.prediction;
    let risk = prediction.risk.prediction;
    let volatility = prediction.volatility.prediction;
    let upward = prediction.upward_probability();

    if direction == 1 && risk == 0 && volatility == 0 {
        format!(
            "Hausse prévue + sûr + faible volatilité → conservation recommandée ! (probabilité de hausse {:.1}%)",
            upward * 100.0
        )
    } else if direction == 0 && upward < 0.5 {
        format!(
            "Baisse prévue ({:.1}%) → envisagez de couper la perte.",
            100.0 - upward * 100.0
        )
    } else if risk == 1 {
        format!(
            "⚠️ Risque de perte élevé ({:.0}%) → décision prudente nécessaire.",
            prediction.risk.probability * 100.0
        )
    } else {
        format!(
            "Situation stable, à surveiller. Probabilité de hausse {:.1}%",
            upward * 100.0
        )
    }
}

// ============================================================================
// Vérification
// ============================================================================

/// Statut d'une prédiction vérifiée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Pending,
    Wrong,
}

impl Outcome {
    fn from_flag(is_correct: Option<bool>) -> Self {
        match is_correct {
            Some(true) => Outcome::Correct,
            None => Outcome::Pending,
            Some(false) => Outcome::Wrong,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Outcome::Correct => "#4caf50",
            Outcome::Pending => "#ff9800",
            Outcome::Wrong => "#f44336",
        }
    }
}

/// Une ligne classée de la vérification
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRow {
    pub title: String,
    pub prediction: String,
    pub prices: String,
    pub status: String,
    pub change: String,
    pub change_positive: bool,
    pub actual_direction: String,
    pub outcome: Outcome,
}

/// Simulation d'investissement
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub initial: String,
    pub per_stock: String,
    pub final_value: String,
    pub profit: String,
    pub gain: bool,
}

impl Simulation {
    /// final = base × (1 + total_return / 100), réparti sur 3 titres
    pub fn compute(total_return: f64) -> Self {
        let final_value = SIMULATION_BASE * (1.0 + total_return / 100.0);
        let profit = final_value - SIMULATION_BASE;

        Self {
            initial: won(SIMULATION_BASE),
            per_stock: won(SIMULATION_BASE / SIMULATION_SPLIT),
            final_value: won(final_value),
            profit: signed_won(profit),
            gain: profit >= 0.0,
        }
    }
}

/// Modale de vérification
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationView {
    pub prediction_date: String,
    pub target_date: String,
    pub verified_at: Option<String>,
    pub accuracy: String,
    /// "correctes/tranchées"
    pub hit_ratio: String,
    pub avg_return: String,
    pub total_return: String,
    pub return_positive: bool,
    /// Vide : afficher le message "aucune donnée"
    pub rows: Vec<VerificationRow>,
    pub simulation: Option<Simulation>,
}

impl VerificationView {
    pub fn from_report(report: &VerificationReport) -> Self {
        let unknown = || "inconnue".to_string();

        let rows = report
            .recommendations
            .iter()
            .enumerate()
            .map(|(index, record)| VerificationRow {
                title: format!("{}. {}", index + 1, record.stock_name),
                prediction: format!(
                    "Prédiction : {} (probabilité {:.1}%)",
                    record.predicted_direction, record.predicted_prob
                ),
                prices: format!("{} → {}", won(record.start_price), won(record.current_price)),
                status: record.status.clone(),
                change: signed_percent(record.actual_change),
                change_positive: record.actual_change > 0.0,
                actual_direction: record.actual_direction.clone(),
                outcome: Outcome::from_flag(record.is_correct),
            })
            .collect::<Vec<_>>();

        let simulation = if !rows.is_empty() && report.avg_return() != 0.0 {
            Some(Simulation::compute(report.total_return()))
        } else {
            None
        };

        Self {
            prediction_date: report.prediction_date.clone().unwrap_or_else(unknown),
            target_date: report.target_date.clone().unwrap_or_else(unknown),
            verified_at: report.timestamp_label(),
            accuracy: rate_text(report.accuracy()),
            hit_ratio: format!("{}/{} réussies", report.correct_count(), report.decided_count()),
            avg_return: signed_percent(report.avg_return()),
            total_return: format!("Total {}", signed_percent(report.total_return())),
            return_positive: report.avg_return() >= 0.0,
            rows,
            simulation,
        }
    }
}

// ============================================================================
// Titres à forte probabilité
// ============================================================================

/// Titres dont la probabilité de hausse atteint le seuil d'alerte
pub fn high_probability_stocks(recommendations: &[StockRecommendation]) -> Vec<StockRecommendation> {
    recommendations
        .iter()
        .filter(|r| r.upward_probability() >= HIGH_PROBABILITY_THRESHOLD)
        .cloned()
        .collect()
}

/// Lignes de la modale "forte probabilité"
pub fn high_probability_lines(stocks: &[StockRecommendation]) -> Vec<(String, String)> {
    stocks
        .iter()
        .map(|s| {
            (
                s.dashboard_name().to_string(),
                format!("Probabilité de hausse : {}", rate_text(s.upward_probability())),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PredictionDetail;

    fn prediction(direction: i64, probability: f64, risk: i64, volatility: i64) -> StockPrediction {
        StockPrediction {
            direction: PredictionDetail {
                prediction: direction,
                probability,
                label: None,
            },
            risk: PredictionDetail {
                prediction: risk,
                probability: 0.8,
                label: None,
            },
            volatility: PredictionDetail {
                prediction: volatility,
                probability: 0.6,
                label: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_advice_branches() {
        assert!(prediction_advice(&prediction(1, 0.7, 0, 0)).starts_with("Hausse prévue + sûr"));
        assert!(prediction_advice(&prediction(1, 0.7, 0, 0)).contains("70.0%"));
        assert!(prediction_advice(&prediction(0, 0.7, 0, 0)).contains("Baisse prévue (70.0%)"));
        assert!(prediction_advice(&prediction(1, 0.7, 1, 0)).contains("(80%)"));
        assert!(prediction_advice(&prediction(1, 0.7, 0, 1)).starts_with("Situation stable"));
    }

    #[test]
    fn test_portfolio_view() {
        let response: PortfolioResponse = serde_json::from_str(
            r#"{"portfolio": {"totalInvestment": 700000, "totalValue": 650000,
                "totalReturnRate": -7.14,
                "stocks": [{"ticker": "A", "stockName": "Alpha", "shares": 10,
                            "purchasePrice": 70000, "currentPrice": 65000,
                            "profit": -50000, "returnRate": -7.14}]},
                "predictions": {}}"#,
        )
        .unwrap();

        let view = PortfolioView::from_response(&response);
        assert_eq!(view.total_investment, "₩700,000");
        assert_eq!(view.return_rate, "-7.14%");
        assert!(!view.return_positive);
        assert_eq!(view.rows[0].profit, "-₩50,000");
        assert_eq!(view.rows[0].holdings, "Détenu : 10 × ₩70,000");
        assert!(view.rows[0].advice.is_none());
    }

    #[test]
    fn test_empty_portfolio() {
        let view = PortfolioView::from_response(&PortfolioResponse::default());
        assert!(view.is_empty());
        assert_eq!(view.return_rate, "+0.00%");
    }

    #[test]
    fn test_simulation() {
        let sim = Simulation::compute(3.75);
        assert_eq!(sim.initial, "₩1,000,000");
        assert_eq!(sim.per_stock, "₩333,333.33");
        assert_eq!(sim.final_value, "₩1,037,500");
        assert_eq!(sim.profit, "+₩37,500");
        assert!(sim.gain);
    }

    #[test]
    fn test_verification_view() {
        let report: VerificationReport = serde_json::from_str(
            r#"{"prediction_date": "2025-01-02", "accuracy": 50.0, "avg_return": 0.5,
                "total_return": 1.5,
                "recommendations": [
                    {"stockName": "A", "predicted_direction": "up", "predicted_prob": 61.0,
                     "start_price": 1000, "current_price": 1010, "actual_change": 1.0,
                     "actual_direction": "up", "status": "✅", "is_correct": true},
                    {"stockName": "B", "predicted_direction": "up", "predicted_prob": 55.0,
                     "start_price": 1000, "current_price": 1000, "actual_change": 0.0,
                     "actual_direction": "-", "status": "⏳", "is_correct": null}
                ]}"#,
        )
        .unwrap();

        let view = VerificationView::from_report(&report);
        assert_eq!(view.target_date, "inconnue");
        assert_eq!(view.hit_ratio, "1/1 réussies");
        assert_eq!(view.rows[1].outcome, Outcome::Pending);
        assert_eq!(view.rows[0].title, "1. A");
        assert!(view.simulation.is_some());
    }

    #[test]
    fn test_no_simulation_when_avg_return_zero() {
        let report = VerificationReport::default();
        let view = VerificationView::from_report(&report);
        assert!(view.rows.is_empty());
        assert!(view.simulation.is_none());
    }

    #[test]
    fn test_high_probability_filter() {
        let stocks = vec![
            StockRecommendation {
                ticker: "A".to_string(),
                upward_probability: Some(60.0),
                ..Default::default()
            },
            StockRecommendation {
                ticker: "B".to_string(),
                upward_probability: Some(59.9),
                ..Default::default()
            },
        ];
        let high = high_probability_stocks(&stocks);
        assert_eq!(high.len(), 1);
        assert_eq!(high_probability_lines(&high)[0].1, "Probabilité de hausse : 60.0%");
    }
}
