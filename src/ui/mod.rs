// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;           // Gestion des événements clavier
pub mod layout;           // Rendu de l'interface principale
pub mod transcript;       // Fil de discussion
pub mod modals;           // Portefeuille, vérification, alertes
pub mod chart;            // Rendu texte des graphiques
pub mod candlestick_text; // Rendu des chandeliers japonais (Unicode text)

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use layout::render;
