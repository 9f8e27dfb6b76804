// ============================================================================
// Dispatcher : réponse du chatbot → vue à afficher
// ============================================================================
// Match exhaustif sur ChatResponse :
// - Dashboard : pas de bulle, barres de comparaison + cartes dashboard
// - Message : bulle standard (texte, graphiques, cartes inline)
//
// Dans les deux modes, un `marketSafety` présent met à jour l'en-tête.
// ============================================================================

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::models::{ChartData, ChatResponse, MessageKind};
use crate::render::cards::{dashboard_cards, inline_cards, DashboardCard, InlineCard};
use crate::render::charts::{ChartContainer, ChartSpec, MARKET_SAFETY_TITLE, UPWARD_COMPARISON_TITLE};
use crate::render::format::{message_lines, Segment};
use crate::render::header::HeaderView;
use crate::render::session::RenderSession;

/// Bloc dashboard (inséré sans bulle dans le fil)
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub comparison: Option<ChartContainer>,
    pub cards: Vec<DashboardCard>,
}

/// Bulle du chatbot
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleView {
    pub kind: MessageKind,
    pub text: Vec<Vec<Segment>>,
    pub charts: Vec<ChartContainer>,
    pub cards: Vec<InlineCard>,
}

/// Résultat du dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Dashboard(DashboardView),
    Bubble(BubbleView),
}

/// Route une réponse vers son mode de rendu
pub fn dispatch<R: Rng + ?Sized>(
    response: &ChatResponse,
    session: &mut RenderSession,
    header: &mut HeaderView,
    rng: &mut R,
    now: Instant,
) -> Rendered {
    match response {
        ChatResponse::Dashboard(body) => {
            info!(count = body.recommendations.len(), "Réponse en mode dashboard");

            session.destroy_transcript_charts();

            let comparison = body
                .chart_data
                .as_ref()
                .and_then(|data| data.recommendations.clone())
                .map(|series| {
                    let id = session.canvas_id("chart");
                    session.schedule(id, Some(UPWARD_COMPARISON_TITLE), ChartSpec::Bar(series), now)
                });

            let cards = dashboard_cards(&body.recommendations, session, rng, now);

            if let Some(safety) = &body.market_safety {
                header.update(safety, session);
            }

            Rendered::Dashboard(DashboardView { comparison, cards })
        }

        ChatResponse::Message { kind, body } => {
            debug!(kind = ?kind, "Réponse en bulle");

            let text = body.message.as_deref().map(message_lines).unwrap_or_default();

            let charts = body
                .chart_data
                .as_ref()
                .map(|data| chart_block(data, session, now))
                .unwrap_or_default();

            let cards = inline_cards(&body.recommendations, session, now);

            if let Some(safety) = &body.market_safety {
                header.update(safety, session);
            }

            Rendered::Bubble(BubbleView {
                kind: kind.clone(),
                text,
                charts,
                cards,
            })
        }
    }
}

/// Graphiques d'une bulle : donut de sécurité puis barres de comparaison
fn chart_block(data: &ChartData, session: &mut RenderSession, now: Instant) -> Vec<ChartContainer> {
    let mut charts = Vec::new();

    if let Some(series) = &data.market_safety {
        let id = session.canvas_id("chart");
        charts.push(session.schedule(id, Some(MARKET_SAFETY_TITLE), ChartSpec::Doughnut(series.clone()), now));
    }

    if let Some(series) = &data.recommendations {
        let id = session.canvas_id("chart");
        charts.push(session.schedule(id, Some(UPWARD_COMPARISON_TITLE), ChartSpec::Bar(series.clone()), now));
    }

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::charts::RISK_GAUGE_CANVAS;
    use crate::render::session::{Slot, CHART_DELAY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parse(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_dashboard_does_not_fail() {
        let mut session = RenderSession::default();
        let mut header = HeaderView::default();
        let mut rng = StdRng::seed_from_u64(0);
        let response = parse(r#"{"type": "recommendation_dashboard", "recommendations": [], "chartData": {}}"#);

        let rendered = dispatch(&response, &mut session, &mut header, &mut rng, Instant::now());

        assert_eq!(
            rendered,
            Rendered::Dashboard(DashboardView {
                comparison: None,
                cards: Vec::new()
            })
        );
    }

    #[test]
    fn test_dashboard_destroys_previous_transcript_charts() {
        let mut session = RenderSession::default();
        let mut header = HeaderView::default();
        let mut rng = StdRng::seed_from_u64(0);
        let now = Instant::now();

        let bubble = parse(
            r#"{"type": "market_status", "message": "x",
                "chartData": {"marketSafety": {"labels": ["Sûrs", "Risqués"], "values": [18, 12]}},
                "marketSafety": {"safeStocks": 18, "totalStocks": 30, "safetyRate": 60}}"#,
        );
        dispatch(&bubble, &mut session, &mut header, &mut rng, now);
        session.mount_due(now + CHART_DELAY);
        assert_eq!(session.live_instances(), 3);

        let dashboard = parse(
            r##"{"type": "recommendation_dashboard",
                "chartData": {"recommendations": {"labels": ["A"], "values": [62.0], "colors": ["#4caf50"]}},
                "recommendations": [{"ticker": "A", "stockName": "A", "currentPrice": 1000, "upwardProbability": 62.0}]}"##,
        );
        let rendered = dispatch(&dashboard, &mut session, &mut header, &mut rng, now);

        // Donut détruit, jauges conservées
        assert_eq!(session.live_instances(), 2);
        assert!(matches!(session.slot(RISK_GAUGE_CANVAS), Slot::Ready(_)));

        match rendered {
            Rendered::Dashboard(view) => {
                assert!(view.comparison.is_some());
                assert_eq!(view.cards.len(), 1);
            }
            other => panic!("attendu un dashboard, reçu {:?}", other),
        }
    }

    #[test]
    fn test_bubble_with_text_charts_and_cards() {
        let mut session = RenderSession::default();
        let mut header = HeaderView::default();
        let mut rng = StdRng::seed_from_u64(0);
        let response = parse(
            r#"{"type": "recommendation", "message": "**Top 3**\nvoici",
                "chartData": {"recommendations": {"labels": ["A", "B"], "values": [62.0, 48.0]}},
                "recommendations": [{"ticker": "A", "name": "A"}, {"ticker": "B", "name": "B"}]}"#,
        );

        match dispatch(&response, &mut session, &mut header, &mut rng, Instant::now()) {
            Rendered::Bubble(bubble) => {
                assert_eq!(bubble.kind, MessageKind::Recommendation);
                assert_eq!(bubble.text.len(), 2);
                assert!(bubble.text[0][0].bold);
                assert_eq!(bubble.charts.len(), 1);
                assert_eq!(bubble.cards.len(), 2);
            }
            other => panic!("attendu une bulle, reçu {:?}", other),
        }
        assert!(header.risk_gauge.is_none());
        assert_eq!(session.pending_count(), 3);
    }

    #[test]
    fn test_unknown_type_is_a_plain_bubble() {
        let mut session = RenderSession::default();
        let mut header = HeaderView::default();
        let mut rng = StdRng::seed_from_u64(0);
        let response = parse(r#"{"type": "surprise"}"#);

        match dispatch(&response, &mut session, &mut header, &mut rng, Instant::now()) {
            Rendered::Bubble(bubble) => {
                assert!(bubble.text.is_empty());
                assert!(bubble.charts.is_empty());
                assert!(bubble.cards.is_empty());
            }
            other => panic!("attendu une bulle, reçu {:?}", other),
        }
    }
}
