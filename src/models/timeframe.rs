// ============================================================================
// Enum : Timeframe
// ============================================================================
// Horizon de prédiction choisi par l'utilisateur (1, 3, 5 ou 10 jours).
//
// Le backend ne reçoit pas de paramètre dédié : l'horizon est transmis en
// préfixant le message par un mot-clé que le chatbot reconnaît.
//
// CONCEPTS RUST :
// 1. Enum C-like + Copy : se passe par valeur, aucune allocation
// 2. FromStr : parsing depuis la config ou la ligne de commande
// 3. next() / previous() : sélection cyclique depuis le clavier
// ============================================================================

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Mots qui signalent que le message précise déjà un horizon
const EXPLICIT_KEYWORDS: [&str; 4] = ["내일", "3일", "10일", "장기"];

/// Horizon de prédiction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    /// Demain
    Day1,
    /// Dans 3 jours
    Day3,
    /// Cette semaine (horizon par défaut du modèle)
    Day5,
    /// Dans 10 jours
    Day10,
}

impl Timeframe {
    /// Identifiant utilisé en configuration ("1day", "3day", ...)
    pub fn id(&self) -> &'static str {
        match self {
            Timeframe::Day1 => "1day",
            Timeframe::Day3 => "3day",
            Timeframe::Day5 => "5day",
            Timeframe::Day10 => "10day",
        }
    }

    /// Label court pour le sélecteur
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Day1 => "Demain",
            Timeframe::Day3 => "3 jours",
            Timeframe::Day5 => "Semaine",
            Timeframe::Day10 => "10 jours",
        }
    }

    /// Mot-clé envoyé au chatbot
    ///
    /// None pour Day5 : c'est l'horizon par défaut côté backend.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Timeframe::Day1 => Some("내일"),
            Timeframe::Day3 => Some("3일 후"),
            Timeframe::Day5 => None,
            Timeframe::Day10 => Some("10일 후"),
        }
    }

    /// Construit le message réellement envoyé
    ///
    /// Le message est préfixé par le mot-clé de l'horizon, sauf si
    /// l'horizon est Day5 ou si le texte mentionne déjà un horizon.
    pub fn apply_to(&self, message: &str) -> String {
        let explicit = EXPLICIT_KEYWORDS.iter().any(|k| message.contains(k));

        match self.keyword() {
            Some(keyword) if !explicit => format!("{} {}", keyword, message),
            _ => message.to_string(),
        }
    }

    pub fn all() -> [Timeframe; 4] {
        [
            Timeframe::Day1,
            Timeframe::Day3,
            Timeframe::Day5,
            Timeframe::Day10,
        ]
    }

    /// Horizon suivant (cycle)
    pub fn next(&self) -> Timeframe {
        match self {
            Timeframe::Day1 => Timeframe::Day3,
            Timeframe::Day3 => Timeframe::Day5,
            Timeframe::Day5 => Timeframe::Day10,
            Timeframe::Day10 => Timeframe::Day1, // Boucle
        }
    }

    /// Horizon précédent (cycle)
    pub fn previous(&self) -> Timeframe {
        match self {
            Timeframe::Day1 => Timeframe::Day10, // Boucle
            Timeframe::Day3 => Timeframe::Day1,
            Timeframe::Day5 => Timeframe::Day3,
            Timeframe::Day10 => Timeframe::Day5,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Day5
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1day" | "1d" => Ok(Timeframe::Day1),
            "3day" | "3d" => Ok(Timeframe::Day3),
            "5day" | "5d" => Ok(Timeframe::Day5),
            "10day" | "10d" => Ok(Timeframe::Day10),
            other => bail!("Horizon inconnu : {} (attendu : 1day, 3day, 5day, 10day)", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_five_days() {
        assert_eq!(Timeframe::default(), Timeframe::Day5);
    }

    #[test]
    fn test_cycle() {
        assert_eq!(Timeframe::Day10.next(), Timeframe::Day1);
        assert_eq!(Timeframe::Day1.previous(), Timeframe::Day10);
        for tf in Timeframe::all() {
            assert_eq!(tf.next().previous(), tf);
        }
    }

    #[test]
    fn test_apply_prefixes_keyword() {
        assert_eq!(Timeframe::Day1.apply_to("추천해줘"), "내일 추천해줘");
        assert_eq!(Timeframe::Day10.apply_to("추천해줘"), "10일 후 추천해줘");
    }

    #[test]
    fn test_apply_keeps_message_for_default_or_explicit() {
        assert_eq!(Timeframe::Day5.apply_to("추천해줘"), "추천해줘");
        assert_eq!(Timeframe::Day1.apply_to("장기 추천"), "장기 추천");
        assert_eq!(Timeframe::Day3.apply_to("3일 뒤 추천"), "3일 뒤 추천");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("10day".parse::<Timeframe>().unwrap(), Timeframe::Day10);
        assert_eq!(" 1D ".parse::<Timeframe>().unwrap(), Timeframe::Day1);
        assert!("weekly".parse::<Timeframe>().is_err());
    }
}
