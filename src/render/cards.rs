// ============================================================================
// Cartes de recommandation
// ============================================================================
// Deux variantes :
// - InlineCard : dans une bulle du chat (mini donut de probabilité)
// - DashboardCard : en mode dashboard (chandeliers, bannières, classe)
//
// Les cartes sont des view models : tout le texte est déjà formaté, le
// dessin n'a plus qu'à poser des couleurs.
// ============================================================================

use std::time::Instant;

use rand::Rng;

use crate::models::{candle, StockRecommendation};
use crate::render::charts::{ChartContainer, ChartSpec};
use crate::render::format::{
    direction_of, group_thousands, rate_text, risk_border_hex, won, Direction, ProbabilityTier,
};
use crate::render::session::RenderSession;

/// Montant investi et nombre de titres achetables
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentInfo {
    pub amount: String,
    pub shares: u64,
}

// ============================================================================
// Variante inline
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InlineCard {
    pub name: String,
    pub ticker: String,
    pub price: String,
    pub upward: String,
    pub downward: String,
    /// Hausse ≥ 50 % : affichée comme favorable
    pub upward_favorable: bool,
    pub reason: Option<String>,
    pub chart: ChartContainer,
    pub investment: Option<InvestmentInfo>,
    pub border_hex: &'static str,
}

/// Construit les cartes inline et planifie leurs mini donuts
pub fn inline_cards(
    recommendations: &[StockRecommendation],
    session: &mut RenderSession,
    now: Instant,
) -> Vec<InlineCard> {
    recommendations
        .iter()
        .map(|stock| inline_card(stock, session, now))
        .collect()
}

fn inline_card(stock: &StockRecommendation, session: &mut RenderSession, now: Instant) -> InlineCard {
    let upward = match stock.upward_probability {
        Some(p) if p != 0.0 => p,
        _ => 50.0,
    };

    let canvas_id = session.canvas_id("stock-chart");
    let chart = session.schedule(canvas_id, None, ChartSpec::mini_doughnut(stock), now);

    let investment = stock
        .investment_amount
        .filter(|amount| *amount != 0.0)
        .map(|amount| InvestmentInfo {
            amount: won(amount),
            shares: stock.shares(),
        });

    InlineCard {
        name: stock.display_name().to_string(),
        ticker: stock.ticker.clone(),
        price: won(stock.current_price()),
        upward: rate_text(upward),
        downward: rate_text(100.0 - upward),
        upward_favorable: upward >= 50.0,
        reason: stock.reason.clone().filter(|r| !r.is_empty()),
        chart,
        investment,
        border_hex: risk_border_hex(stock.risk.unwrap_or(0.0)),
    }
}

// ============================================================================
// Variante dashboard
// ============================================================================

/// Classe de la carte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardClass {
    /// risk == 0 et volatility == 0
    Safe,
    /// risk == 1
    Risky,
    Neutral,
}

/// Bannière affichée en bas de carte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// risk == 1, avec la probabilité de risque arrondie
    RiskWarning { percent: String },
    /// volatility == 1 (et risk != 1)
    VolatilityCaution { percent: String },
}

impl Banner {
    pub fn lines(&self) -> [String; 2] {
        match self {
            Banner::RiskWarning { percent } => [
                format!("⚠️ Alerte risque : ce titre présente un risque de perte élevé ({}%) !", percent),
                "Investissement fractionné en petites sommes fortement recommandé.".to_string(),
            ],
            Banner::VolatilityCaution { percent } => [
                format!("💡 Attention : titre à forte volatilité ({}%) !", percent),
                "Prudence en cas d'investissement à court terme.".to_string(),
            ],
        }
    }
}

/// Barre de progression de probabilité
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    /// 0 ~ 100
    pub value: f64,
    pub text: String,
    pub tier: ProbabilityTier,
}

impl ProbabilityBar {
    pub fn new(label: &str, probability: f64) -> Self {
        Self {
            label: label.to_string(),
            value: probability.clamp(0.0, 100.0),
            text: rate_text(probability),
            tier: ProbabilityTier::from_probability(probability),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCard {
    pub rank: usize,
    pub name: String,
    pub ticker: String,
    pub price: String,
    /// risk == 0
    pub is_safe: bool,
    /// volatility == 0
    pub is_low_volatility: bool,
    pub direction: Direction,
    pub upward: String,
    /// Hausse ≥ 50 %
    pub upward_favorable: bool,
    pub probability_bar: ProbabilityBar,
    pub chart: ChartContainer,
    pub investment: InvestmentInfo,
    pub banner: Option<Banner>,
    pub class: CardClass,
}

impl DashboardCard {
    pub fn risk_label(&self) -> &'static str {
        if self.is_safe {
            "🛡️ Sûr"
        } else {
            "⚠️ Risqué"
        }
    }

    pub fn volatility_label(&self) -> &'static str {
        if self.is_low_volatility {
            "📉 Faible volatilité"
        } else {
            "📈 Forte volatilité"
        }
    }
}

/// Construit les cartes dashboard et planifie leurs graphiques en chandeliers
pub fn dashboard_cards<R: Rng + ?Sized>(
    recommendations: &[StockRecommendation],
    session: &mut RenderSession,
    rng: &mut R,
    now: Instant,
) -> Vec<DashboardCard> {
    recommendations
        .iter()
        .enumerate()
        .map(|(index, stock)| dashboard_card(index + 1, stock, session, rng, now))
        .collect()
}

fn dashboard_card<R: Rng + ?Sized>(
    rank: usize,
    stock: &StockRecommendation,
    session: &mut RenderSession,
    rng: &mut R,
    now: Instant,
) -> DashboardCard {
    let upward = stock.upward_probability();

    let class = if stock.is_safe() {
        CardClass::Safe
    } else if stock.is_risky() {
        CardClass::Risky
    } else {
        CardClass::Neutral
    };

    let banner = if stock.is_risky() {
        Some(Banner::RiskWarning {
            percent: format!("{:.0}", stock.risk_probability.unwrap_or(0.0) * 100.0),
        })
    } else if stock.is_volatile() {
        Some(Banner::VolatilityCaution {
            percent: format!("{:.0}", stock.volatility_probability.unwrap_or(0.0) * 100.0),
        })
    } else {
        None
    };

    let spec = ChartSpec::Candlestick {
        label: stock.dashboard_name().to_string(),
        candles: candle::illustrative_series(stock.current_price(), rng),
    };
    let canvas_id = session.canvas_id(&format!("candlestick-{}", stock.ticker));
    let chart = session.schedule(canvas_id, None, spec, now);

    DashboardCard {
        rank,
        name: stock.dashboard_name().to_string(),
        ticker: stock.ticker.clone(),
        price: format!("Prix actuel : {}", won(stock.current_price())),
        is_safe: stock.risk == Some(0.0),
        is_low_volatility: stock.volatility == Some(0.0),
        direction: direction_of(stock.direction, stock.direction_probability),
        upward: rate_text(upward),
        upward_favorable: upward >= 50.0,
        probability_bar: ProbabilityBar::new("Probabilité de hausse", upward),
        chart,
        investment: InvestmentInfo {
            amount: won(stock.investment_amount.unwrap_or(0.0)),
            shares: stock.shares(),
        },
        banner,
        class,
    }
}

/// Nombre de titres formaté : 1200 → "1,200 titres"
pub fn shares_text(shares: u64) -> String {
    format!("{} titres", group_thousands(shares as f64))
}
