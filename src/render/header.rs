// ============================================================================
// En-tête : sécurité du marché + double jauge
// ============================================================================
// L'en-tête affiche en permanence :
// - le nombre de titres sûrs et peu volatils
// - le commentaire de marché
// - deux jauges (risque, volatilité), reconstruites à chaque mise à jour
//
// Pas de validation ni de nouvelle tentative : les champs absents valent 0.
// ============================================================================

use tracing::{debug, warn};

use crate::models::MarketSafety;
use crate::render::charts::{ChartContainer, ChartSpec, GaugeSpec, RISK_GAUGE_CANVAS, VOLATILITY_GAUGE_CANVAS};
use crate::render::session::RenderSession;

/// Champs fixes de l'en-tête
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderView {
    pub safe_count: u32,
    pub low_volatility_count: u32,
    pub comment: Option<String>,
    pub risk_gauge: Option<ChartContainer>,
    pub volatility_gauge: Option<ChartContainer>,
}

impl HeaderView {
    /// Met à jour l'en-tête et reconstruit la double jauge
    ///
    /// Le commentaire précédent est conservé quand le nouveau est absent.
    pub fn update(&mut self, safety: &MarketSafety, session: &mut RenderSession) {
        self.safe_count = safety.safe_stocks();
        self.low_volatility_count = safety.low_volatility_stocks();
        if let Some(comment) = &safety.market_comment {
            self.comment = Some(comment.clone());
        }

        debug!(
            safe = self.safe_count,
            low_volatility = self.low_volatility_count,
            "En-tête de marché mis à jour"
        );

        let (risk, volatility) = render_dual_gauges(safety, session);
        if risk.is_some() {
            self.risk_gauge = risk;
        }
        if volatility.is_some() {
            self.volatility_gauge = volatility;
        }
    }
}

/// Construit les jauges de risque et de volatilité
///
/// - Risque : titres sûrs / total, au taux safetyRate
/// - Volatilité : titres peu volatils / total, au taux volatilityRate
/// - Total absent ou nul → 30
pub fn render_dual_gauges(
    safety: &MarketSafety,
    session: &mut RenderSession,
) -> (Option<ChartContainer>, Option<ChartContainer>) {
    let total = safety.gauge_total();

    let risk = render_gauge(
        session,
        RISK_GAUGE_CANVAS,
        safety.safe_stocks(),
        total,
        safety.safety_rate(),
        "Sûrs",
        "Risqués",
    );

    let volatility = render_gauge(
        session,
        VOLATILITY_GAUGE_CANVAS,
        safety.low_volatility_stocks(),
        total,
        safety.volatility_rate(),
        "Faible vol.",
        "Forte vol.",
    );

    (risk, volatility)
}

/// Construit une jauge, immédiatement
///
/// Total nul : aucune jauge n'est créée.
fn render_gauge(
    session: &mut RenderSession,
    canvas_id: &str,
    safe: u32,
    total: u32,
    rate: f64,
    safe_label: &str,
    risky_label: &str,
) -> Option<ChartContainer> {
    let Some(spec) = GaugeSpec::new(safe, total, rate, safe_label, risky_label) else {
        warn!(canvas = canvas_id, "Total nul : jauge non créée");
        return None;
    };

    Some(session.build_now(canvas_id, None, &ChartSpec::Gauge(spec)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::charts::ChartBody;
    use crate::render::session::Slot;

    fn safety() -> MarketSafety {
        MarketSafety {
            safe_stocks: Some(18),
            total_stocks: Some(30),
            low_volatility_stocks: Some(9),
            safety_rate: Some(60.0),
            volatility_rate: Some(30.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_update_sets_counts_and_gauges() {
        let mut header = HeaderView::default();
        let mut session = RenderSession::default();
        header.update(&safety(), &mut session);

        assert_eq!(header.safe_count, 18);
        assert_eq!(header.low_volatility_count, 9);
        assert!(header.risk_gauge.is_some());

        match session.slot(RISK_GAUGE_CANVAS) {
            Slot::Ready(instance) => match &instance.body {
                ChartBody::Gauge { segments, center, .. } => {
                    assert_eq!(segments[0].hex, "#4caf50");
                    assert_eq!(center, "60.0%");
                }
                other => panic!("attendu une jauge, reçu {:?}", other),
            },
            other => panic!("jauge absente : {:?}", other),
        }
    }

    #[test]
    fn test_render_twice_keeps_two_instances() {
        let mut session = RenderSession::default();
        render_dual_gauges(&safety(), &mut session);
        render_dual_gauges(&safety(), &mut session);

        assert_eq!(session.live_count(RISK_GAUGE_CANVAS), 1);
        assert_eq!(session.live_count(VOLATILITY_GAUGE_CANVAS), 1);
        assert_eq!(session.live_instances(), 2);
    }

    #[test]
    fn test_missing_fields_default() {
        let mut header = HeaderView {
            comment: Some("Ancien commentaire".to_string()),
            ..Default::default()
        };
        let mut session = RenderSession::default();
        header.update(&MarketSafety::default(), &mut session);

        assert_eq!(header.safe_count, 0);
        assert_eq!(header.comment.as_deref(), Some("Ancien commentaire"));

        // Total absent → 30, donc les jauges existent
        assert_eq!(session.live_instances(), 2);
    }
}
