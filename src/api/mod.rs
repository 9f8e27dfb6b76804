// ============================================================================
// Module : api
// ============================================================================
// Client HTTP du backend Jusic (chat, marché, portefeuille, vérification).
// Les requêtes transitent par le worker hors-ligne.
// ============================================================================

pub mod client;  // Client API Jusic

// Re-export du client
pub use client::ApiClient;
