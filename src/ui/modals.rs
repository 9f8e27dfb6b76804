// ============================================================================
// Modales : portefeuille, vérification, forte probabilité, message bloquant
// ============================================================================
// CONCEPT RATATUI : Overlay
// - Clear efface la zone avant de dessiner par-dessus le fil du chat
// - centered_rect() calcule une zone centrée en pourcentage de l'écran
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::render::modals::{high_probability_lines, PortfolioView, VerificationView, HIGH_PROBABILITY_THRESHOLD};
use crate::ui::chart::hex_color;

const ACCENT: Color = Color::Rgb(102, 126, 234); // #667eea

/// Zone centrée de `percent_x` × `percent_y` de la zone parente
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn modal_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
}

fn signed_color(positive: bool) -> Color {
    if positive {
        Color::Green
    } else {
        Color::Red
    }
}

// ============================================================================
// Portefeuille
// ============================================================================

pub fn render_portfolio(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect(80, 80, area);
    frame.render_widget(Clear, area);

    let block = modal_block("💼 Mon portefeuille");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = &app.portfolio else {
        frame.render_widget(Paragraph::new("Chargement...").alignment(Alignment::Center), inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    frame.render_widget(Paragraph::new(portfolio_summary(view)), chunks[0]);

    if view.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Votre portefeuille est vide.", Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                "Ajoutez des titres depuis les recommandations.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), chunks[1]);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(row.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(
                        format!("{} ({})", row.profit, row.return_rate),
                        Style::default().fg(signed_color(row.profitable)),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("{}   {}", row.holdings, row.current),
                    Style::default().fg(Color::Gray),
                )),
            ];
            if let Some(advice) = &row.advice {
                lines.push(Line::from(Span::styled(
                    format!("🤖 {}", advice),
                    Style::default().fg(Color::Cyan),
                )));
            }

            let item = ListItem::new(lines);
            if index == app.selected_index {
                item.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items), chunks[1]);
}

fn portfolio_summary(view: &PortfolioView) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::raw("Investi : "),
            Span::styled(view.total_investment.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   Valeur : "),
            Span::styled(view.total_value.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   Rendement : "),
            Span::styled(
                view.return_rate.clone(),
                Style::default()
                    .fg(signed_color(view.return_positive))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ]
}

// ============================================================================
// Vérification
// ============================================================================

pub fn render_verification(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect(85, 85, area);
    frame.render_widget(Clear, area);

    let block = modal_block("🎯 Vérification des prédictions");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = &app.verification else {
        frame.render_widget(Paragraph::new("Chargement...").alignment(Alignment::Center), inner);
        return;
    };

    frame.render_widget(
        Paragraph::new(verification_lines(view)).wrap(Wrap { trim: false }),
        inner,
    );
}

fn verification_lines(view: &VerificationView) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("📅 Prédiction du {}", view.prediction_date)),
        Span::raw(format!("  →  vérifiée pour le {}", view.target_date)),
    ])];
    if let Some(verified_at) = &view.verified_at {
        lines.push(Line::from(Span::styled(
            format!("Mis à jour : {}", verified_at),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if view.rows.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Aucune donnée de vérification pour aujourd'hui.",
            Style::default().fg(Color::Gray),
        )));
        return lines;
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Précision : "),
        Span::styled(view.accuracy.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  ({})", view.hit_ratio), Style::default().fg(Color::Gray)),
        Span::raw("    Rendement moyen : "),
        Span::styled(
            view.avg_return.clone(),
            Style::default()
                .fg(signed_color(view.return_positive))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({})", view.total_return), Style::default().fg(Color::Gray)),
    ]));

    for row in &view.rows {
        let color = hex_color(row.outcome.hex());
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(color)),
            Span::styled(row.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", row.status), Style::default().fg(color)),
        ]));
        lines.push(Line::from(format!("  {}", row.prediction)));
        lines.push(Line::from(vec![
            Span::raw(format!("  {}  ", row.prices)),
            Span::styled(row.change.clone(), Style::default().fg(signed_color(row.change_positive))),
            Span::styled(format!("  ({})", row.actual_direction), Style::default().fg(Color::Gray)),
        ]));
    }

    if let Some(simulation) = &view.simulation {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "💰 Simulation d'investissement",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!(
            "  Capital initial : {} ({} par titre)",
            simulation.initial, simulation.per_stock
        )));
        lines.push(Line::from(vec![
            Span::raw(format!("  Valeur finale : {}  ", simulation.final_value)),
            Span::styled(
                simulation.profit.clone(),
                Style::default().fg(signed_color(simulation.gain)).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    lines
}

// ============================================================================
// Forte probabilité
// ============================================================================

pub fn render_high_probability(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect(60, 60, area);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Titres dont la probabilité de hausse atteint {:.0} %.", HIGH_PROBABILITY_THRESHOLD),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    for (name, probability) in high_probability_lines(&app.high_probability) {
        lines.push(Line::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD))));
        lines.push(Line::from(Span::styled(probability, Style::default().fg(Color::Green))));
        lines.push(Line::from(""));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(modal_block("🔔 Titres à forte probabilité"))
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ============================================================================
// Message bloquant
// ============================================================================

pub fn render_popup(frame: &mut Frame, message: &str, area: Rect) {
    let area = centered_rect(50, 20, area);
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "[n'importe quelle touche] OK",
            Style::default().fg(Color::Yellow),
        )),
    ];

    frame.render_widget(
        Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
