// ============================================================================
// Module : offline
// ============================================================================
// Worker hors-ligne : cache nommé sur disque, stratégie réseau d'abord,
// notifications push.
// ============================================================================

pub mod cache;        // CacheStorage / Cache sur disque
pub mod network;      // Trait Network + implémentation reqwest
pub mod notification; // Push et clic sur notification
pub mod worker;       // Cycle de vie et interception des requêtes

pub use cache::CacheStorage;
pub use network::{HttpNetwork, Network, Request, Response};
pub use notification::{Notification, NotificationAction};
pub use worker::{OfflineWorker, WorkerState, CACHE_NAME};
