// ============================================================================
// Layout - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// ┌ en-tête : sécurité du marché + double jauge ┐
// │ fil de discussion (défilant)                │
// │ saisie du message + horizon                 │
// └ raccourcis                                  ┘
//
// Les modales, le badge d'alerte et les notifications sont dessinés
// par-dessus le fil.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, Gauge...)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen, Task};
use crate::render::charts::{RISK_GAUGE_CANVAS, VOLATILITY_GAUGE_CANVAS};
use crate::ui::chart::gauge_widget;
use crate::ui::modals;
use crate::ui::transcript::transcript_lines;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le chat est toujours dessiné, la modale active vient par-dessus
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_transcript(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);

    if let Some(badge) = &app.alert {
        render_badge(frame, &badge.label(), chunks[1]);
    }
    if let Some(notification) = app.notifications.last() {
        render_notification(frame, &notification.title, &notification.body, chunks[1]);
    }

    match app.current_screen {
        Screen::Chat => {}
        Screen::Portfolio => modals::render_portfolio(frame, app, size),
        Screen::Verification => modals::render_verification(frame, app, size),
        Screen::HighProbability => modals::render_high_probability(frame, app, size),
    }

    if let Some(message) = &app.popup {
        modals::render_popup(frame, message, size);
    }
}

/// Crée le layout principal (en-tête, fil, saisie, raccourcis)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // En-tête
            Constraint::Min(0),    // Fil
            Constraint::Length(3), // Saisie
            Constraint::Length(1), // Raccourcis
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// En-tête : sécurité du marché
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 Jusic · Recommandations ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let header = &app.header;
    let mut text = vec![
        Line::from(vec![
            Span::raw("🛡️ Titres sûrs : "),
            Span::styled(
                header.safe_count.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   📉 Faible volatilité : "),
            Span::styled(
                header.low_volatility_count.to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("⏱️ Horizon : "),
            Span::styled(app.timeframe().label(), Style::default().fg(Color::Yellow)),
        ]),
    ];
    if let Some(comment) = &header.comment {
        text.push(Line::from(Span::styled(comment.clone(), Style::default().fg(Color::Gray))));
    }
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), columns[0]);

    let gauges = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    render_gauge(frame, app, RISK_GAUGE_CANVAS, "Risque", gauges[0], gauges[1]);
    render_gauge(frame, app, VOLATILITY_GAUGE_CANVAS, "Volatilité", gauges[2], gauges[3]);
}

fn render_gauge(frame: &mut Frame, app: &App, canvas_id: &str, label: &str, label_area: Rect, gauge_area: Rect) {
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_string(), Style::default().fg(Color::Gray))),
        label_area,
    );

    match gauge_widget(&app.session, canvas_id) {
        Some(gauge) => frame.render_widget(gauge, gauge_area),
        None => frame.render_widget(
            Paragraph::new(Span::styled("—", Style::default().fg(Color::DarkGray))),
            gauge_area,
        ),
    }
}

// ============================================================================
// Fil de discussion
// ============================================================================

/// Dessine le fil, collé en bas (comme un chat), décalé de `app.scroll`
fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 💬 Discussion ");
    let inner = block.inner(area);

    let lines = transcript_lines(app, inner.width);
    let total = wrapped_height(&lines, inner.width);
    let max_offset = total.saturating_sub(inner.height);
    let offset = max_offset.saturating_sub(app.scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));

    frame.render_widget(paragraph, area);
}

/// Hauteur occupée par des lignes une fois repliées à `width` colonnes
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width as usize))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

// ============================================================================
// Saisie
// ============================================================================

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.loading_message() {
        Some(message) => format!(" ⏳ {} ", message),
        None => format!(" Message · horizon {} ", app.timeframe().id()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.is_busy(Task::Chat) { Color::DarkGray } else { Color::Green }))
        .title(title);

    let input_line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(app.input_buffer.clone(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    frame.render_widget(Paragraph::new(input_line).block(block), area);
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let blinking = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::SLOW_BLINK);
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_delete_confirmation() {
        let ticker = app.selected_ticker().unwrap_or("?");
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            Span::styled("[d]", blinking),
            Span::styled(
                format!(" à nouveau pour retirer {} ou autre touche pour annuler ⚠", ticker),
                warning,
            ),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            Span::styled("[Ctrl+Q]", blinking),
            Span::styled(" à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠", warning),
        ])
    } else if app.is_on_portfolio() {
        Line::from(vec![
            Span::styled("[Esc]", key),
            Span::raw(" Fermer  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Naviguer  "),
            Span::styled("[d]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Retirer  "),
            Span::styled("[r]", key),
            Span::raw(" Recharger"),
        ])
    } else if !app.is_on_chat() {
        Line::from(vec![Span::styled("[Esc]", key), Span::raw(" Fermer")])
    } else {
        Line::from(vec![
            Span::styled("[Entrée]", key),
            Span::raw(" Envoyer  "),
            Span::styled("[Tab]", key),
            Span::raw(" Horizon  "),
            Span::styled("[PgUp/PgDn]", key),
            Span::raw(" Défiler  "),
            Span::styled("[^P]", key),
            Span::raw(" Portefeuille  "),
            Span::styled("[^R]", key),
            Span::raw(" Vérification  "),
            Span::styled("[^A]", key),
            Span::raw(" Alerte  "),
            Span::styled("[^Q]", key),
            Span::raw(" Quitter"),
        ])
    };

    frame.render_widget(Paragraph::new(shortcuts).alignment(Alignment::Center), area);
}

// ============================================================================
// Badge et notifications
// ============================================================================

/// Badge en haut à droite du fil
fn render_badge(frame: &mut Frame, label: &str, area: Rect) {
    let width = (label.chars().count() as u16 + 12).min(area.width);
    let badge_area = Rect::new(area.x + area.width.saturating_sub(width + 1), area.y + 1, width, 3).intersection(area);
    frame.render_widget(Clear, badge_area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(label.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(" [^A]", Style::default().fg(Color::Yellow)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        ),
        badge_area,
    );
}

/// Notification en bas à droite du fil
fn render_notification(frame: &mut Frame, title: &str, body: &str, area: Rect) {
    let width = 48.min(area.width);
    let height = 5.min(area.height);
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    )
    .intersection(area);
    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::raw(body.to_string())),
            Line::from(vec![
                Span::styled("[^O]", Style::default().fg(Color::Yellow)),
                Span::raw(" Voir  "),
                Span::styled("[^X]", Style::default().fg(Color::Yellow)),
                Span::raw(" Fermer"),
            ]),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(format!(" {} ", title)),
        ),
        toast_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeframe;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 5), 2 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 0), 0);
    }

    #[test]
    fn test_render_does_not_panic_on_small_terminal() {
        let backend = TestBackend::new(30, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = App::new(Timeframe::Day5);
        app.popup = Some("Erreur".to_string());

        terminal.draw(|frame| render(frame, &app)).unwrap();
    }

    #[test]
    fn test_render_welcome_card() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = App::new(Timeframe::Day5);

        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Bienvenue"));
    }
}
