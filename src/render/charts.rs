// ============================================================================
// Graphiques : configuration, construction et conteneurs
// ============================================================================
// Un renderer de graphique ne dessine rien : il renvoie immédiatement un
// conteneur (identifiant de canvas + titre) et planifie la construction
// dans la RenderSession. La construction effective a lieu au tick suivant
// l'expiration du délai.
//
// CONCEPTS RUST :
// 1. Enum de configuration (ChartSpec) → enum de résultat (ChartBody)
// 2. anyhow::ensure! pour rejeter les données invalides
// 3. Une erreur de construction ne concerne que CE graphique
// ============================================================================

use anyhow::{ensure, Result};

use crate::models::{Candle, SeriesData, StockRecommendation};
use crate::render::format::{percent_of, rate_text, GaugeTone, ProbabilityTier};

/// Identifiants fixes des deux jauges de l'en-tête
pub const RISK_GAUGE_CANVAS: &str = "riskGaugeChart";
pub const VOLATILITY_GAUGE_CANVAS: &str = "volatilityGaugeChart";

/// Titre du donut de sécurité du marché
pub const MARKET_SAFETY_TITLE: &str = "📊 Sécurité du marché";

/// Titre du graphique en barres des recommandations
pub const UPWARD_COMPARISON_TITLE: &str = "📈 Comparaison des probabilités de hausse";

/// Couleurs fixes du donut de sécurité du marché (sûr, risqué)
const DOUGHNUT_COLORS: [&str; 2] = ["#4caf50", "#f44336"];

// ============================================================================
// Types communs
// ============================================================================

/// Nature d'un graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Gauge,
    Doughnut,
    Bar,
    MiniDoughnut,
    Candlestick,
}

impl ChartKind {
    /// Bloc statique affiché à la place d'un graphique qui n'a pas pu être construit
    pub fn placeholder(&self) -> &'static [&'static str] {
        match self {
            ChartKind::Candlestick => &["📊 Graphique des cours", "Tendance sur 30 jours"],
            _ => &["📊 Graphique indisponible"],
        }
    }
}

/// Conteneur renvoyé immédiatement par un renderer
///
/// Il ne porte que l'identifiant du canvas : l'état réel du graphique
/// (en attente, construit, échoué, libéré) se lit dans la RenderSession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartContainer {
    pub canvas_id: String,
    pub title: Option<String>,
    pub kind: ChartKind,
}

/// Une part de donut ou de jauge
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    pub label: String,
    pub value: f64,
    pub hex: String,
}

/// Une barre horizontale (0 ~ 100 %)
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub label: String,
    pub value: f64,
    pub tier: ProbabilityTier,
    /// Couleur de bordure fournie par le backend, si présente
    pub border_hex: Option<String>,
}

/// Données prêtes à dessiner
#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Gauge {
        segments: [ArcSegment; 2],
        center: String,
        legend: Vec<String>,
        tone: GaugeTone,
    },
    Doughnut {
        segments: Vec<ArcSegment>,
        center: String,
        legend: Vec<String>,
    },
    Bar {
        bars: Vec<BarEntry>,
    },
    MiniDoughnut {
        upward: f64,
        downward: f64,
        center: String,
        tier: ProbabilityTier,
    },
    Candlestick {
        label: String,
        candles: Vec<Candle>,
    },
}

/// Graphique construit, conservé par la session jusqu'à sa destruction
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub canvas_id: String,
    pub title: Option<String>,
    pub body: ChartBody,
}

impl ChartInstance {
    pub fn kind(&self) -> ChartKind {
        match self.body {
            ChartBody::Gauge { .. } => ChartKind::Gauge,
            ChartBody::Doughnut { .. } => ChartKind::Doughnut,
            ChartBody::Bar { .. } => ChartKind::Bar,
            ChartBody::MiniDoughnut { .. } => ChartKind::MiniDoughnut,
            ChartBody::Candlestick { .. } => ChartKind::Candlestick,
        }
    }
}

// ============================================================================
// Configurations
// ============================================================================

/// Jauge "sûr / risqué"
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSpec {
    pub safe: u32,
    pub total: u32,
    /// Taux en pourcentage (centre et couleur)
    pub rate: f64,
    pub safe_label: String,
    pub risky_label: String,
}

impl GaugeSpec {
    /// None quand total == 0 : la jauge n'est pas créée
    pub fn new(safe: u32, total: u32, rate: f64, safe_label: &str, risky_label: &str) -> Option<Self> {
        if total == 0 {
            return None;
        }
        Some(Self {
            safe,
            total,
            rate,
            safe_label: safe_label.to_string(),
            risky_label: risky_label.to_string(),
        })
    }

    fn build(&self) -> Result<ChartBody> {
        ensure!(self.total > 0, "jauge sans total");

        let tone = GaugeTone::from_rate(self.rate);
        let risky = self.total.saturating_sub(self.safe);
        let total = self.total as f64;

        let legend = vec![
            format!("{}: {} ({}%)", self.safe_label, self.safe, percent_of(self.safe as f64, total)),
            format!("{}: {} ({}%)", self.risky_label, risky, percent_of(risky as f64, total)),
        ];

        Ok(ChartBody::Gauge {
            segments: [
                ArcSegment {
                    label: self.safe_label.clone(),
                    value: self.safe as f64,
                    hex: tone.fill_hex().to_string(),
                },
                ArcSegment {
                    label: self.risky_label.clone(),
                    value: risky as f64,
                    hex: tone.track_hex().to_string(),
                },
            ],
            center: rate_text(self.rate),
            legend,
            tone,
        })
    }
}

/// Configuration d'un graphique à construire
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Gauge(GaugeSpec),
    Doughnut(SeriesData),
    Bar(SeriesData),
    MiniDoughnut { upward_probability: Option<f64> },
    Candlestick { label: String, candles: Vec<Candle> },
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartSpec::Gauge(_) => ChartKind::Gauge,
            ChartSpec::Doughnut(_) => ChartKind::Doughnut,
            ChartSpec::Bar(_) => ChartKind::Bar,
            ChartSpec::MiniDoughnut { .. } => ChartKind::MiniDoughnut,
            ChartSpec::Candlestick { .. } => ChartKind::Candlestick,
        }
    }

    /// Mini donut d'une recommandation
    pub fn mini_doughnut(stock: &StockRecommendation) -> Self {
        ChartSpec::MiniDoughnut {
            upward_probability: stock.upward_probability,
        }
    }

    /// Construit le graphique
    ///
    /// Échoue si les données sont incohérentes (longueurs différentes,
    /// valeurs non finies, série vide...).
    pub fn build(&self, canvas_id: &str, title: Option<&str>) -> Result<ChartInstance> {
        let body = match self {
            ChartSpec::Gauge(spec) => spec.build()?,
            ChartSpec::Doughnut(data) => build_doughnut(data)?,
            ChartSpec::Bar(data) => build_bar(data)?,
            ChartSpec::MiniDoughnut { upward_probability } => build_mini(*upward_probability)?,
            ChartSpec::Candlestick { label, candles } => {
                ensure!(!candles.is_empty(), "série de chandelles vide");
                ensure!(
                    candles.iter().all(Candle::is_valid),
                    "chandelle invalide pour {}",
                    label
                );
                ChartBody::Candlestick {
                    label: label.clone(),
                    candles: candles.clone(),
                }
            }
        };

        Ok(ChartInstance {
            canvas_id: canvas_id.to_string(),
            title: title.map(str::to_string),
            body,
        })
    }
}

fn check_series(data: &SeriesData) -> Result<()> {
    ensure!(
        data.labels.len() == data.values.len(),
        "labels ({}) et valeurs ({}) de longueurs différentes",
        data.labels.len(),
        data.values.len()
    );
    ensure!(
        data.values.iter().all(|v| v.is_finite() && *v >= 0.0),
        "valeur négative ou non finie"
    );
    Ok(())
}

fn build_doughnut(data: &SeriesData) -> Result<ChartBody> {
    check_series(data)?;

    let total: f64 = data.values.iter().sum();
    let segments: Vec<ArcSegment> = data
        .labels
        .iter()
        .zip(&data.values)
        .enumerate()
        .map(|(i, (label, value))| ArcSegment {
            label: label.clone(),
            value: *value,
            hex: DOUGHNUT_COLORS
                .get(i)
                .copied()
                .unwrap_or(DOUGHNUT_COLORS[1])
                .to_string(),
        })
        .collect();

    let legend = segments
        .iter()
        .map(|s| format!("{}: {} ({}%)", s.label, s.value, percent_of(s.value, total)))
        .collect();

    Ok(ChartBody::Doughnut {
        segments,
        center: format!("{}", total),
        legend,
    })
}

fn build_bar(data: &SeriesData) -> Result<ChartBody> {
    check_series(data)?;

    let bars = data
        .labels
        .iter()
        .zip(&data.values)
        .enumerate()
        .map(|(i, (label, value))| BarEntry {
            label: label.clone(),
            value: value.clamp(0.0, 100.0),
            tier: ProbabilityTier::from_probability(*value),
            border_hex: data.colors.get(i).cloned(),
        })
        .collect();

    Ok(ChartBody::Bar { bars })
}

fn build_mini(upward_probability: Option<f64>) -> Result<ChartBody> {
    let upward = match upward_probability {
        Some(p) if p != 0.0 => p,
        _ => 50.0,
    };
    ensure!(upward.is_finite(), "probabilité de hausse non finie");

    Ok(ChartBody::MiniDoughnut {
        upward,
        downward: 100.0 - upward,
        center: rate_text(upward),
        tier: ProbabilityTier::from_probability(upward),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(labels: &[&str], values: &[f64]) -> SeriesData {
        SeriesData {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            values: values.to_vec(),
            colors: Vec::new(),
        }
    }

    #[test]
    fn test_gauge_not_created_without_total() {
        assert!(GaugeSpec::new(3, 0, 10.0, "Sûrs", "Risqués").is_none());
    }

    #[test]
    fn test_gauge_green_at_sixty_percent() {
        let spec = GaugeSpec::new(18, 30, 60.0, "Sûrs", "Risqués").unwrap();
        let chart = ChartSpec::Gauge(spec).build(RISK_GAUGE_CANVAS, None).unwrap();

        match chart.body {
            ChartBody::Gauge { segments, center, legend, tone } => {
                assert_eq!(tone, GaugeTone::Safe);
                assert_eq!(segments[0].hex, "#4caf50");
                assert_eq!(segments[1].value, 12.0);
                assert_eq!(center, "60.0%");
                assert_eq!(legend[0], "Sûrs: 18 (60.0%)");
                assert_eq!(legend[1], "Risqués: 12 (40.0%)");
            }
            other => panic!("attendu une jauge, reçu {:?}", other),
        }
    }

    #[test]
    fn test_doughnut_center_is_sum() {
        let chart = ChartSpec::Doughnut(series(&["Sûrs", "Risqués"], &[18.0, 12.0]))
            .build("chart-1", Some(MARKET_SAFETY_TITLE))
            .unwrap();

        match chart.body {
            ChartBody::Doughnut { center, segments, .. } => {
                assert_eq!(center, "30");
                assert_eq!(segments[1].hex, "#f44336");
            }
            other => panic!("attendu un donut, reçu {:?}", other),
        }
    }

    #[test]
    fn test_invalid_series_fails() {
        let mismatched = ChartSpec::Bar(series(&["A", "B"], &[50.0]));
        assert!(mismatched.build("chart-2", None).is_err());

        let nan = ChartSpec::Doughnut(series(&["A"], &[f64::NAN]));
        assert!(nan.build("chart-3", None).is_err());
    }

    #[test]
    fn test_bar_tiers() {
        let chart = ChartSpec::Bar(series(&["A", "B", "C"], &[65.0, 55.0, 40.0]))
            .build("chart-4", None)
            .unwrap();

        match chart.body {
            ChartBody::Bar { bars } => {
                let tiers: Vec<_> = bars.iter().map(|b| b.tier).collect();
                assert_eq!(
                    tiers,
                    vec![ProbabilityTier::High, ProbabilityTier::Medium, ProbabilityTier::Low]
                );
            }
            other => panic!("attendu des barres, reçu {:?}", other),
        }
    }

    #[test]
    fn test_mini_doughnut_defaults_to_fifty() {
        let chart = ChartSpec::MiniDoughnut { upward_probability: None }
            .build("stock-chart-0", None)
            .unwrap();

        assert_eq!(
            chart.body,
            ChartBody::MiniDoughnut {
                upward: 50.0,
                downward: 50.0,
                center: "50.0%".to_string(),
                tier: ProbabilityTier::Medium,
            }
        );
    }

    #[test]
    fn test_empty_candlestick_fails() {
        let spec = ChartSpec::Candlestick {
            label: "Samsung".to_string(),
            candles: Vec::new(),
        };
        assert!(spec.build("candlestick-x", None).is_err());
        assert_eq!(spec.kind().placeholder().len(), 2);
    }
}
