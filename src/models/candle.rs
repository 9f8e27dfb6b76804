// ============================================================================
// Structure : Candle (chandelle journalière)
// ============================================================================
// Les cartes du dashboard affichent un graphique en chandeliers sur 30 jours.
// Le backend ne fournit pas d'historique : la série est illustrative,
// générée autour du prix courant.
//
// CONCEPTS RUST :
// 1. NaiveDate : date sans fuseau (une chandelle = un jour)
// 2. rand::Rng générique : générateur injectable, déterministe en test
// ============================================================================

use chrono::{Duration, Local, NaiveDate};
use rand::Rng;

/// Nombre de jours d'historique (la série contient DAYS + 1 chandelles)
pub const ILLUSTRATIVE_DAYS: i64 = 30;

/// Une chandelle japonaise journalière
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Haussière si la clôture est au-dessus de l'ouverture (ou égale)
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Une chandelle est valide si ses prix sont finis et cohérents
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p >= 0.0)
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

/// Génère une série illustrative se terminant aujourd'hui
///
/// Algorithme :
/// 1. Départ à 90 % du prix courant, 30 jours avant aujourd'hui
/// 2. Dérive quotidienne aléatoire de ±3 %
/// 3. Clôture à ±2 % de l'ouverture, mèches jusqu'à 2 % au-delà du corps
pub fn illustrative_series<R: Rng + ?Sized>(current_price: f64, rng: &mut R) -> Vec<Candle> {
    illustrative_series_until(Local::now().date_naive(), current_price, rng)
}

/// Variante avec date de fin explicite (utilisée par les tests)
pub fn illustrative_series_until<R: Rng + ?Sized>(
    today: NaiveDate,
    current_price: f64,
    rng: &mut R,
) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(ILLUSTRATIVE_DAYS as usize + 1);
    let mut price = current_price * 0.9;

    for offset in (0..=ILLUSTRATIVE_DAYS).rev() {
        let date = today - Duration::days(offset);

        let drift = (rng.gen::<f64>() - 0.5) * 0.06;
        price *= 1.0 + drift;

        let open = price;
        let close = open * (1.0 + (rng.gen::<f64>() - 0.5) * 0.04);
        let high = open.max(close) * (1.0 + rng.gen::<f64>() * 0.02);
        let low = open.min(close) * (1.0 - rng.gen::<f64>() * 0.02);

        candles.push(Candle::new(date, open, high, low, close));
        price = close;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_series_has_31_ordered_candles() {
        let mut rng = StdRng::seed_from_u64(42);
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let candles = illustrative_series_until(today, 70_000.0, &mut rng);

        assert_eq!(candles.len(), 31);
        assert_eq!(candles.first().unwrap().date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(candles.last().unwrap().date, today);
        assert!(candles.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_series_starts_near_ninety_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        let candles = illustrative_series(10_000.0, &mut rng);
        let first_open = candles[0].open;

        // 9000 avec une dérive d'au plus 3 %
        assert!(first_open >= 9000.0 * 0.97 && first_open <= 9000.0 * 1.03);
        assert!(candles.iter().all(Candle::is_valid));
    }

    #[test]
    fn test_zero_price_yields_flat_series() {
        let mut rng = StdRng::seed_from_u64(1);
        let candles = illustrative_series(0.0, &mut rng);
        assert!(candles.iter().all(|c| c.high == 0.0 && c.low == 0.0));
    }

    #[test]
    fn test_invalid_candle() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(!Candle::new(date, 10.0, 9.0, 8.0, 10.5).is_valid());
        assert!(!Candle::new(date, f64::NAN, 11.0, 8.0, 10.0).is_valid());
        assert!(Candle::new(date, 10.0, 11.0, 9.0, 10.5).is_bullish());
    }
}
