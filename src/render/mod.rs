// ============================================================================
// Module : render
// ============================================================================
// Pipeline de rendu des réponses : réponse JSON → view models + graphiques
//
// Ce module ne connaît pas ratatui : il produit des structures que le module
// ui dessine. Toute la logique (seuils, formats, cycle de vie des
// graphiques) est donc testable sans terminal.
// ============================================================================

pub mod cards;    // Cartes de recommandation (inline / dashboard)
pub mod charts;   // Configuration et construction des graphiques
pub mod dispatch; // Réponse → dashboard ou bulle
pub mod format;   // Fonctions pures de formatage
pub mod header;   // En-tête de sécurité du marché
pub mod modals;   // Portefeuille, vérification, forte probabilité
pub mod session;  // RenderSession (graphiques vivants et différés)

pub use dispatch::{dispatch, BubbleView, DashboardView, Rendered};
pub use header::HeaderView;
pub use session::{RenderSession, Slot};
