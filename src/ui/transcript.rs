// ============================================================================
// Transcript - Fil de discussion en lignes de texte
// ============================================================================
// Convertit les entrées du fil (messages utilisateur, bulles du chatbot,
// blocs dashboard) en `Line` ratatui. Le fil entier est ensuite dessiné dans
// un seul Paragraph défilant.
// ============================================================================

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::app::{App, TranscriptEntry, APOLOGY_MESSAGE};
use crate::render::cards::{shares_text, CardClass, DashboardCard, InlineCard};
use crate::render::format::Segment;
use crate::render::{BubbleView, DashboardView, RenderSession, Rendered};
use crate::ui::chart::{chart_lines, hex_color};

const USER_COLOR: Color = Color::Rgb(102, 126, 234); // #667eea
const MUTED: Color = Color::DarkGray;

/// Toutes les lignes du fil, carte d'accueil comprise
pub fn transcript_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if app.show_welcome {
        lines.extend(welcome_lines());
    }

    for entry in &app.transcript {
        match entry {
            TranscriptEntry::User(text) => {
                lines.push(Line::from(vec![
                    Span::styled("👤 Vous  ", Style::default().fg(USER_COLOR).add_modifier(Modifier::BOLD)),
                    Span::raw(text.clone()),
                ]));
            }
            TranscriptEntry::Bot(Rendered::Bubble(bubble)) => {
                lines.extend(bubble_lines(bubble, &app.session, width));
            }
            TranscriptEntry::Bot(Rendered::Dashboard(view)) => {
                lines.extend(dashboard_lines(view, &app.session, width));
            }
            TranscriptEntry::Apology => {
                lines.push(bot_prefix());
                lines.push(Line::from(Span::raw(format!("  {}", APOLOGY_MESSAGE))));
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "👋 Bienvenue sur Jusic !",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("Demandez des recommandations, l'état du marché ou l'analyse d'un titre."),
        Line::from(Span::styled(
            "Exemples : « 추천해줘 », « 시장 상황 », « 삼성전자 분석 »",
            Style::default().fg(MUTED),
        )),
        Line::from(""),
    ]
}

fn bot_prefix() -> Line<'static> {
    Line::from(Span::styled(
        "🤖 Jusic",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))
}

/// Segments `**gras**` → Spans
fn segment_line(segments: &[Segment]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    spans.extend(segments.iter().map(|segment| {
        if segment.bold {
            Span::styled(segment.text.clone(), Style::default().add_modifier(Modifier::BOLD))
        } else {
            Span::raw(segment.text.clone())
        }
    }));
    Line::from(spans)
}

fn bubble_lines(bubble: &BubbleView, session: &RenderSession, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![bot_prefix()];

    lines.extend(bubble.text.iter().map(|segments| segment_line(segments)));

    for chart in &bubble.charts {
        lines.push(Line::from(""));
        lines.extend(chart_lines(session, chart, width));
    }

    for card in &bubble.cards {
        lines.push(Line::from(""));
        lines.extend(inline_card_lines(card, session, width));
    }

    lines
}

fn inline_card_lines(card: &InlineCard, session: &RenderSession, width: u16) -> Vec<Line<'static>> {
    let border = Style::default().fg(hex_color(card.border_hex));
    let up_color = if card.upward_favorable { Color::Green } else { Color::Red };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", card.ticker), Style::default().fg(MUTED)),
            Span::raw(format!("  {}", card.price)),
        ]),
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::raw("Hausse "),
            Span::styled(card.upward.clone(), Style::default().fg(up_color).add_modifier(Modifier::BOLD)),
            Span::raw("  Baisse "),
            Span::styled(card.downward.clone(), Style::default().fg(MUTED)),
        ]),
    ];

    for chart_line in chart_lines(session, &card.chart, width.saturating_sub(2)) {
        let mut spans = vec![Span::styled("┃ ", border)];
        spans.extend(chart_line.spans);
        lines.push(Line::from(spans));
    }

    if let Some(reason) = &card.reason {
        lines.push(Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled(format!("💡 {}", reason), Style::default().fg(Color::Gray)),
        ]));
    }

    if let Some(investment) = &card.investment {
        lines.push(Line::from(vec![
            Span::styled("┃ ", border),
            Span::raw(format!(
                "💰 Investissement : {} ({})",
                investment.amount,
                shares_text(investment.shares)
            )),
        ]));
    }

    lines
}

fn dashboard_lines(view: &DashboardView, session: &RenderSession, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "━━ 📊 Tableau de bord des recommandations ━━",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];

    if let Some(comparison) = &view.comparison {
        lines.extend(chart_lines(session, comparison, width));
    }

    for card in &view.cards {
        lines.push(Line::from(""));
        lines.extend(dashboard_card_lines(card, session, width));
    }

    lines
}

fn dashboard_card_lines(card: &DashboardCard, session: &RenderSession, width: u16) -> Vec<Line<'static>> {
    let border_color = match card.class {
        CardClass::Safe => Color::Green,
        CardClass::Risky => Color::Red,
        CardClass::Neutral => Color::Gray,
    };
    let border = Style::default().fg(border_color);
    let bar = &card.probability_bar;
    let bar_color = hex_color(bar.tier.hex());

    let bar_cells = 30usize;
    let filled = ((bar.value / 100.0) * bar_cells as f64).round() as usize;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled(format!("#{} ", card.rank), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", card.ticker), Style::default().fg(MUTED)),
        ]),
        Line::from(vec![Span::styled("┃ ", border), Span::raw(card.price.clone())]),
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled(
                card.risk_label(),
                Style::default().fg(if card.is_safe { Color::Green } else { Color::Red }),
            ),
            Span::raw("  "),
            Span::styled(
                card.volatility_label(),
                Style::default().fg(if card.is_low_volatility { Color::Green } else { Color::Yellow }),
            ),
            Span::raw("  "),
            Span::styled(card.direction.label(), Style::default().fg(hex_color(card.direction.hex()))),
        ]),
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::raw(format!("{} ", bar.label)),
            Span::styled(
                bar.text.clone(),
                Style::default()
                    .fg(if card.upward_favorable { Color::Green } else { Color::Red })
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("┃ ", border),
            Span::styled("█".repeat(filled), Style::default().fg(bar_color)),
            Span::styled("░".repeat(bar_cells.saturating_sub(filled)), Style::default().fg(MUTED)),
            Span::styled(format!(" {}", bar.tier.caption()), Style::default().fg(bar_color)),
        ]),
    ];

    for chart_line in chart_lines(session, &card.chart, width.saturating_sub(2)) {
        let mut spans = vec![Span::styled("┃ ", border)];
        spans.extend(chart_line.spans);
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::styled("┃ ", border),
        Span::raw(format!(
            "💰 Montant conseillé : {} · {}",
            card.investment.amount,
            shares_text(card.investment.shares)
        )),
    ]));

    if let Some(banner) = &card.banner {
        let color = match banner {
            crate::render::cards::Banner::RiskWarning { .. } => Color::Red,
            crate::render::cards::Banner::VolatilityCaution { .. } => Color::Yellow,
        };
        for text in banner.lines() {
            lines.push(Line::from(vec![
                Span::styled("┃ ", border),
                Span::styled(text, Style::default().fg(color)),
            ]));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatResponse, Timeframe};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn flatten(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_welcome_then_user_message() {
        let mut app = App::with_rng(Timeframe::Day5, StdRng::seed_from_u64(1));
        assert!(flatten(&transcript_lines(&app, 80)).contains("Bienvenue"));

        app.input_buffer = "bonjour".to_string();
        app.submit_message();
        let text = flatten(&transcript_lines(&app, 80));
        assert!(!text.contains("Bienvenue"));
        assert!(text.contains("👤 Vous  bonjour"));
    }

    #[test]
    fn test_dashboard_card_banner_is_drawn() {
        let mut app = App::with_rng(Timeframe::Day5, StdRng::seed_from_u64(1));
        let response: ChatResponse = serde_json::from_str(
            r#"{"type": "recommendation_dashboard", "recommendations": [
                {"ticker": "R", "stockName": "Risqué SA", "currentPrice": 1000,
                 "upwardProbability": 55, "risk": 1, "riskProbability": 0.9}]}"#,
        )
        .unwrap();
        app.apply_chat_response(&response, Instant::now());

        let text = flatten(&transcript_lines(&app, 80));
        assert!(text.contains("#1 Risqué SA"));
        assert!(text.contains("Alerte risque"));
        assert!(text.contains("(90%)"));
    }

    #[test]
    fn test_apology_bubble() {
        let mut app = App::with_rng(Timeframe::Day5, StdRng::seed_from_u64(1));
        app.apply_chat_error("timeout");
        assert!(flatten(&transcript_lines(&app, 80)).contains(APOLOGY_MESSAGE));
    }
}
