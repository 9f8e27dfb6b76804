// ============================================================================
// Chart - Dessin des graphiques en lignes de texte
// ============================================================================
// Chaque emplacement de graphique (canvas) est lu dans la RenderSession puis
// converti en `Line` ratatui :
// - Pending  : ligne d'attente
// - Ready    : barres Unicode colorées (donut, barres, mini donut) ou
//              chandeliers
// - Failed   : bloc statique de remplacement
// - Released : rien (le graphique a été détruit)
//
// Les jauges de l'en-tête utilisent le widget Gauge de ratatui (voir
// `gauge_widget`), le reste du fil est du texte.
// ============================================================================

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Gauge,
};

use crate::render::charts::{ArcSegment, ChartBody, ChartContainer, ChartInstance};
use crate::render::format::{parse_hex, rate_text};
use crate::render::{RenderSession, Slot};
use crate::ui::candlestick_text::{CandlestickRenderer, CARD_CHART_HEIGHT};

/// Largeur des libellés devant les barres horizontales
const BAR_LABEL_WIDTH: usize = 14;

/// Bloc plein utilisé pour toutes les barres
const BLOCK: &str = "█";

/// "#4caf50" → Color::Rgb
///
/// CONCEPT RUST : Option combinators
/// - map() transforme le triplet, unwrap_or() fournit une couleur neutre
pub fn hex_color(hex: &str) -> Color {
    parse_hex(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

/// Lignes d'un emplacement de graphique
pub fn chart_lines(session: &RenderSession, container: &ChartContainer, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(title) = &container.title {
        lines.push(Line::from(Span::styled(
            title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    match session.slot(&container.canvas_id) {
        Slot::Pending => lines.push(Line::from(Span::styled(
            "⏳ Préparation du graphique...",
            Style::default().fg(Color::DarkGray),
        ))),
        Slot::Ready(instance) => lines.extend(instance_lines(instance, width)),
        Slot::Failed(kind) => {
            for text in kind.placeholder() {
                lines.push(Line::from(Span::styled(
                    format!("│ {}", text),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        Slot::Released => return Vec::new(),
    }

    lines
}

fn instance_lines(instance: &ChartInstance, width: u16) -> Vec<Line<'static>> {
    let bar_width = (width as usize).saturating_sub(BAR_LABEL_WIDTH + 10).max(10);

    match &instance.body {
        ChartBody::Gauge {
            segments,
            center,
            legend,
            ..
        } => {
            let mut lines = vec![stacked_bar(segments, bar_width, center)];
            lines.extend(legend_lines(segments, legend));
            lines
        }

        ChartBody::Doughnut {
            segments,
            center,
            legend,
        } => {
            let mut lines = vec![stacked_bar(segments, bar_width, &format!("Total {}", center))];
            lines.extend(legend_lines(segments, legend));
            lines
        }

        ChartBody::Bar { bars } => bars
            .iter()
            .map(|bar| {
                let filled = ((bar.value / 100.0) * bar_width as f64).round() as usize;
                let color = hex_color(bar.tier.hex());
                Line::from(vec![
                    Span::raw(format!("{:<width$} ", truncate(&bar.label, BAR_LABEL_WIDTH), width = BAR_LABEL_WIDTH)),
                    Span::styled(BLOCK.repeat(filled), Style::default().fg(color)),
                    Span::styled(
                        "░".repeat(bar_width.saturating_sub(filled)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!(" {}", rate_text(bar.value)), Style::default().fg(color)),
                ])
            })
            .collect(),

        ChartBody::MiniDoughnut {
            upward,
            center,
            tier,
            ..
        } => {
            let mini_width = 20usize;
            let filled = ((upward.clamp(0.0, 100.0) / 100.0) * mini_width as f64).round() as usize;
            vec![Line::from(vec![
                Span::styled(BLOCK.repeat(filled), Style::default().fg(hex_color(tier.hex()))),
                Span::styled(
                    BLOCK.repeat(mini_width.saturating_sub(filled)),
                    Style::default().fg(hex_color("#e0e0e0")),
                ),
                Span::styled(
                    format!(" {}", center),
                    Style::default().fg(hex_color(tier.hex())).add_modifier(Modifier::BOLD),
                ),
            ])]
        }

        ChartBody::Candlestick { label, candles } => {
            let mut lines = vec![Line::from(Span::styled(
                format!("{} · 30 jours", label),
                Style::default().fg(Color::Gray),
            ))];
            lines.extend(CandlestickRenderer::new(candles, width, CARD_CHART_HEIGHT).render_lines());
            lines
        }
    }
}

/// Barre empilée proportionnelle aux segments, suivie du texte central
fn stacked_bar(segments: &[ArcSegment], width: usize, center: &str) -> Line<'static> {
    let total: f64 = segments.iter().map(|s| s.value).sum();
    let mut spans = Vec::new();
    let mut used = 0usize;

    for (i, segment) in segments.iter().enumerate() {
        let cells = if i == segments.len() - 1 {
            width.saturating_sub(used)
        } else if total > 0.0 {
            ((segment.value / total) * width as f64).round() as usize
        } else {
            0
        };
        let cells = cells.min(width.saturating_sub(used));
        used += cells;
        spans.push(Span::styled(BLOCK.repeat(cells), Style::default().fg(hex_color(&segment.hex))));
    }

    spans.push(Span::styled(
        format!(" {}", center),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    Line::from(spans)
}

fn legend_lines(segments: &[ArcSegment], legend: &[String]) -> Vec<Line<'static>> {
    segments
        .iter()
        .zip(legend)
        .map(|(segment, text)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(hex_color(&segment.hex))),
                Span::raw(text.clone()),
            ])
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

/// Widget Gauge pour une jauge vivante de l'en-tête
///
/// None si le graphique n'est pas (ou plus) construit.
pub fn gauge_widget<'a>(session: &'a RenderSession, canvas_id: &str) -> Option<Gauge<'a>> {
    let Slot::Ready(instance) = session.slot(canvas_id) else {
        return None;
    };

    let ChartBody::Gauge { segments, center, .. } = &instance.body else {
        return None;
    };

    let total = segments[0].value + segments[1].value;
    let ratio = if total > 0.0 { (segments[0].value / total).clamp(0.0, 1.0) } else { 0.0 };

    Some(
        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(hex_color(&segments[0].hex))
                    .bg(hex_color(&segments[1].hex)),
            )
            .ratio(ratio)
            .label(Span::styled(
                center.clone(),
                Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesData;
    use crate::render::charts::ChartSpec;
    use std::time::Instant;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#4caf50"), Color::Rgb(76, 175, 80));
        assert_eq!(hex_color("vert"), Color::Gray);
    }

    #[test]
    fn test_pending_then_ready_bar_chart() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let series = SeriesData {
            labels: vec!["Samsung".to_string()],
            values: vec![62.0],
            colors: Vec::new(),
        };
        let id = session.canvas_id("chart");
        let container = session.schedule(id, Some("Titre"), ChartSpec::Bar(series), now);

        let pending = chart_lines(&session, &container, 60);
        assert_eq!(pending.len(), 2);
        assert!(text(&pending[1]).contains("Préparation"));

        session.mount_due(now + crate::render::session::CHART_DELAY);
        let ready = chart_lines(&session, &container, 60);
        assert!(text(&ready[1]).starts_with("Samsung"));
        assert!(text(&ready[1]).ends_with("62.0%"));
    }

    #[test]
    fn test_failed_chart_shows_placeholder() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let broken = SeriesData {
            labels: vec!["A".to_string(), "B".to_string()],
            values: vec![1.0],
            colors: Vec::new(),
        };
        let id = session.canvas_id("chart");
        let container = session.schedule(id, None, ChartSpec::Doughnut(broken), now);
        session.mount_due(now + crate::render::session::CHART_DELAY);

        let lines = chart_lines(&session, &container, 60);
        assert_eq!(lines.len(), 1);
        assert!(text(&lines[0]).contains("indisponible"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("court", 10), "court");
        assert_eq!(truncate("Samsung Electronics", 8), "Samsung…");
    }
}
