// ============================================================================
// Configuration
// ============================================================================
// Ordre de priorité (du plus fort au plus faible) :
// 1. Arguments de ligne de commande (clap)
// 2. Variables d'environnement (éventuellement chargées depuis .env)
// 3. Valeurs par défaut
//
// Variables reconnues :
// - JUSIC_API_BASE_URL : URL du backend (défaut http://localhost:8080)
// - JUSIC_CACHE_DIR    : racine du cache hors-ligne
// - JUSIC_LOG_DIR      : répertoire des logs (défaut ./logs)
// - JUSIC_TIMEFRAME    : horizon initial (1day, 3day, 5day, 10day)
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::models::Timeframe;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Arguments de ligne de commande
#[derive(Debug, Default, Parser)]
#[command(name = "jusic-chat", version, about = "Client terminal du chatbot de recommandation Jusic")]
pub struct Args {
    /// URL du backend (ex: http://localhost:8080)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Horizon de prédiction initial : 1day, 3day, 5day ou 10day
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Répertoire du cache hors-ligne
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Configuration résolue
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub timeframe: Timeframe,
}

impl Settings {
    /// Charge .env puis résout la configuration à partir des arguments
    pub fn load(args: Args) -> Result<Self> {
        // Un .env absent n'est pas une erreur
        let _ = dotenvy::dotenv();
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Résolution pure (testable sans toucher à l'environnement du process)
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - `impl Fn(&str) -> Option<String>` : n'importe quelle fonction de
    ///   lecture de variable, réelle ou simulée
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = args
            .base_url
            .or_else(|| env("JUSIC_API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let cache_dir = args
            .cache_dir
            .or_else(|| env("JUSIC_CACHE_DIR").map(PathBuf::from))
            .unwrap_or_else(default_cache_dir);

        let log_dir = env("JUSIC_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        let timeframe = match args.timeframe.or_else(|| env("JUSIC_TIMEFRAME")) {
            Some(raw) => raw
                .parse::<Timeframe>()
                .with_context(|| format!("Horizon invalide : {}", raw))?,
            None => Timeframe::default(),
        };

        Ok(Self {
            base_url,
            cache_dir,
            log_dir,
            timeframe,
        })
    }
}

/// ~/.cache/jusic-chat sur Linux, ./cache en dernier recours
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("jusic-chat"))
        .unwrap_or_else(|| PathBuf::from("./cache"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(Args::default(), env_from(&[])).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.log_dir, PathBuf::from("./logs"));
        assert_eq!(settings.timeframe, Timeframe::Day5);
    }

    #[test]
    fn test_args_override_env() {
        let args = Args {
            base_url: Some("http://cli:9000".to_string()),
            timeframe: None,
            cache_dir: None,
        };
        let env = env_from(&[
            ("JUSIC_API_BASE_URL", "http://env:8000"),
            ("JUSIC_TIMEFRAME", "10day"),
            ("JUSIC_CACHE_DIR", "/tmp/jusic"),
        ]);

        let settings = Settings::resolve(args, env).unwrap();
        assert_eq!(settings.base_url, "http://cli:9000");
        assert_eq!(settings.timeframe, Timeframe::Day10);
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/jusic"));
    }

    #[test]
    fn test_invalid_timeframe_is_an_error() {
        let env = env_from(&[("JUSIC_TIMEFRAME", "2weeks")]);
        assert!(Settings::resolve(Args::default(), env).is_err());
    }

    #[test]
    fn test_args_parse_from_command_line() {
        let args = Args::parse_from(["jusic-chat", "--timeframe", "1day", "--cache-dir", "/var/cache/jusic"]);
        assert_eq!(args.timeframe.as_deref(), Some("1day"));
        assert_eq!(args.cache_dir, Some(PathBuf::from("/var/cache/jusic")));
    }
}
