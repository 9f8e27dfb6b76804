// ============================================================================
// Candlestick Chart - Rendu texte ligne par ligne
// ============================================================================
// Dessine les chandeliers journaliers d'une carte du dashboard avec des
// caractères Unicode, directement sous forme de `Line` ratatui (le fil du
// chat est un paragraphe défilant, pas une grille de widgets).
//
// ALGORITHME :
// - Rendu vertical : ligne par ligne de haut en bas
// - Pour chaque ligne, on détermine quel caractère Unicode afficher
// - Logique des 3 zones : mèche supérieure, corps, mèche inférieure
// - Seuils fractionnaires (0.25, 0.75) pour précision sub-caractère
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

use crate::models::Candle;

// ============================================================================
// Constantes
// ============================================================================

const UNICODE_VOID: char = ' ';
const UNICODE_BODY: char = '┃';              // Corps plein
const UNICODE_HALF_BODY_BOTTOM: char = '╻';  // Corps avec espace en bas
const UNICODE_HALF_BODY_TOP: char = '╹';     // Corps avec espace en haut
const UNICODE_WICK: char = '│';              // Mèche pleine
const UNICODE_TOP: char = '╽';               // Transition corps→mèche (haut)
const UNICODE_BOTTOM: char = '╿';            // Transition corps→mèche (bas)
const UNICODE_UPPER_WICK: char = '╷';        // Demi-mèche supérieure
const UNICODE_LOWER_WICK: char = '╵';        // Demi-mèche inférieure

/// Couleurs pour chandeliers haussiers et baissiers
const BULLISH_COLOR: Color = Color::Rgb(76, 175, 80);   // #4caf50
const BEARISH_COLOR: Color = Color::Rgb(244, 67, 54);   // #f44336

/// Largeur de l'axe Y : "  71,500 │ "
const Y_AXIS_WIDTH: usize = 11;

/// Largeur d'un label de date "DD/MM"
const DATE_LABEL_WIDTH: usize = 5;

/// Hauteur du graphique dans une carte (hors axe X)
pub const CARD_CHART_HEIGHT: u16 = 8;

// ============================================================================
// Structure principale
// ============================================================================

/// Renderer de chandeliers japonais en mode texte
pub struct CandlestickRenderer<'a> {
    candles: &'a [Candle],
    min_price: f64,
    max_price: f64,
    height: u16,
    width: u16,
}

impl<'a> CandlestickRenderer<'a> {
    /// `width` : largeur totale disponible (axe Y compris)
    /// `height` : nombre de lignes de chandeliers
    pub fn new(candles: &'a [Candle], width: u16, height: u16) -> Self {
        let (min_price, max_price) = Self::compute_price_bounds(candles);

        Self {
            candles,
            min_price,
            max_price,
            height,
            width: width.saturating_sub(Y_AXIS_WIDTH as u16),
        }
    }

    /// Calcule les prix min et max sur tous les chandeliers, avec 2 % de marge
    fn compute_price_bounds(candles: &[Candle]) -> (f64, f64) {
        let max_price = candles
            .iter()
            .fold(f64::NEG_INFINITY, |max, c| max.max(c.high));

        let min_price = candles
            .iter()
            .fold(f64::INFINITY, |min, c| min.min(c.low));

        let margin = (max_price - min_price) * 0.02;
        (
            (min_price - margin).max(0.0),
            max_price + margin,
        )
    }

    /// Convertit un prix en coordonnée de hauteur
    fn price_to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }

        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    fn candle_color(candle: &Candle) -> Color {
        if candle.is_bullish() {
            BULLISH_COLOR
        } else {
            BEARISH_COLOR
        }
    }

    /// Caractère d'un chandelier à une hauteur donnée
    fn render_candle(&self, candle: &Candle, y: u16) -> char {
        let height_unit = y as f64;

        let high_y = self.price_to_height(candle.high);
        let low_y = self.price_to_height(candle.low);
        let max_y = self.price_to_height(candle.open.max(candle.close));
        let min_y = self.price_to_height(candle.close.min(candle.open));

        let mut output = UNICODE_VOID;

        // ZONE 1 : Mèche supérieure (high → max)
        if high_y.ceil() >= height_unit && height_unit >= max_y.floor() {
            if max_y - height_unit > 0.75 {
                output = UNICODE_BODY;
            } else if (max_y - height_unit) > 0.25 {
                if (high_y - height_unit) > 0.75 {
                    output = UNICODE_TOP;
                } else {
                    output = UNICODE_HALF_BODY_BOTTOM;
                }
            } else if (high_y - height_unit) > 0.75 {
                output = UNICODE_WICK;
            } else if (high_y - height_unit) > 0.25 {
                output = UNICODE_UPPER_WICK;
            }
        }
        // ZONE 2 : Corps (min → max)
        else if max_y.floor() >= height_unit && height_unit >= min_y.ceil() {
            output = UNICODE_BODY;
        }
        // ZONE 3 : Mèche inférieure (min → low)
        else if min_y.ceil() >= height_unit && height_unit >= low_y.floor() {
            if (min_y - height_unit) < 0.25 {
                output = UNICODE_BODY;
            } else if (min_y - height_unit) < 0.75 {
                if (low_y - height_unit) < 0.25 {
                    output = UNICODE_BOTTOM;
                } else {
                    output = UNICODE_HALF_BODY_TOP;
                }
            } else if low_y - height_unit < 0.25 {
                output = UNICODE_WICK;
            } else if low_y - height_unit < 0.75 {
                output = UNICODE_LOWER_WICK;
            }
        }

        output
    }

    /// Axe Y : prix tous les 3 lignes
    fn render_y_axis(&self, y: u16) -> String {
        if y % 3 == 0 || y == self.height {
            let price = self.min_price
                + (y as f64 * (self.max_price - self.min_price) / self.height as f64);
            format!("{:>8.0} │ ", price)
        } else {
            format!("{:>8} │ ", "")
        }
    }

    /// Les N derniers chandeliers qui tiennent dans la largeur
    fn visible_candles(&self) -> &'a [Candle] {
        let max_visible = self.width as usize;
        if self.candles.len() <= max_visible {
            self.candles
        } else {
            &self.candles[self.candles.len() - max_visible..]
        }
    }

    /// Espaces après chaque chandelier pour occuper toute la largeur
    fn gap(&self, count: usize) -> usize {
        if count > 1 {
            ((self.width as f64 / count as f64) - 1.0).round().max(0.0) as usize
        } else {
            0
        }
    }

    /// Génère toutes les lignes du graphique (chandeliers + axe X)
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let visible = self.visible_candles();

        if visible.is_empty() || self.height == 0 {
            return lines;
        }

        let gap = self.gap(visible.len());

        for y in (1..=self.height).rev() {
            let mut spans = vec![Span::styled(self.render_y_axis(y), Style::default().fg(Color::Gray))];

            for (i, candle) in visible.iter().enumerate() {
                spans.push(Span::styled(
                    self.render_candle(candle, y).to_string(),
                    Style::default().fg(Self::candle_color(candle)),
                ));
                if i < visible.len() - 1 && gap > 0 {
                    spans.push(Span::raw(" ".repeat(gap)));
                }
            }

            lines.push(Line::from(spans));
        }

        lines.push(self.render_x_axis(visible, gap));
        lines
    }

    /// Axe X : une date "DD/MM" à intervalles réguliers
    fn render_x_axis(&self, visible: &[Candle], gap: usize) -> Line<'static> {
        let step = gap + 1;
        let labels_fit = (self.width as usize / (DATE_LABEL_WIDTH + 2)).max(1);
        let label_interval = (visible.len() / labels_fit).max(1);

        let mut text = " ".repeat(Y_AXIS_WIDTH);
        let mut cursor = 0usize;

        for (i, candle) in visible.iter().enumerate() {
            if i % label_interval != 0 {
                continue;
            }
            let column = i * step;
            if column < cursor {
                continue;
            }
            text.push_str(&" ".repeat(column - cursor));
            let label = candle.date.format("%d/%m").to_string();
            cursor = column + label.chars().count();
            text.push_str(&label);
        }

        Line::from(Span::styled(text, Style::default().fg(Color::Rgb(120, 120, 120))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candles() -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        (0..5)
            .map(|i| {
                let open = 100.0 + i as f64;
                Candle::new(start + chrono::Duration::days(i), open, open + 3.0, open - 2.0, open + 1.0)
            })
            .collect()
    }

    #[test]
    fn test_line_count() {
        let data = candles();
        let renderer = CandlestickRenderer::new(&data, 40, CARD_CHART_HEIGHT);
        let lines = renderer.render_lines();
        // Chandeliers + axe X
        assert_eq!(lines.len(), CARD_CHART_HEIGHT as usize + 1);
    }

    #[test]
    fn test_x_axis_starts_with_first_date() {
        let data = candles();
        let renderer = CandlestickRenderer::new(&data, 40, 4);
        let lines = renderer.render_lines();
        let axis: String = lines
            .last()
            .unwrap()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(axis.trim_start().starts_with("01/03"));
    }

    #[test]
    fn test_visible_candles_truncated_to_width() {
        let data = candles();
        let renderer = CandlestickRenderer::new(&data, Y_AXIS_WIDTH as u16 + 3, 4);
        assert_eq!(renderer.visible_candles().len(), 3);
        assert_eq!(renderer.visible_candles()[0].open, 102.0);
    }

    #[test]
    fn test_empty_series_renders_nothing() {
        let renderer = CandlestickRenderer::new(&[], 40, 4);
        assert!(renderer.render_lines().is_empty());
    }
}
