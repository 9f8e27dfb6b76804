// ============================================================================
// Jusic Chat - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP du backend Jusic
pub mod app;       // État de l'application
pub mod config;    // Arguments CLI + variables d'environnement
pub mod models;    // Structures de données (DTO JSON)
pub mod offline;   // Cache hors-ligne et notifications push
pub mod render;    // Transformation des réponses en vues et graphiques
pub mod ui;        // Interface utilisateur
