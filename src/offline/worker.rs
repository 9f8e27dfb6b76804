// ============================================================================
// Worker hors-ligne : cycle de vie + stratégie réseau d'abord
// ============================================================================
// Cycle de vie : Installing → Activating → Active
// - install : pré-remplit le cache avec le manifeste (tout ou rien)
// - activate : supprime tous les caches dont le nom diffère de CACHE_NAME
//   (seulement dans l'espace des caches, jamais le reste de la racine)
// - fetch : réseau d'abord ; un 200 est copié dans le cache sans attendre ;
//   réseau injoignable → réponse du cache ; absente → échec
//
// Seules les requêtes GET passent par le cache.
// ============================================================================

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::offline::cache::{Cache, CacheStorage};
use crate::offline::network::{Method, Network, Request, Response};

/// Version du cache ; la changer invalide les caches précédents
pub const CACHE_NAME: &str = "jusic-v2";

/// Ressources pré-cachées à l'installation
pub const PRECACHE_MANIFEST: [&str; 7] = [
    "/",
    "/css/chat.css",
    "/js/chat.js",
    "/js/portfolio.js",
    "/manifest.json",
    "/icon-192x192.png",
    "/icon-512x512.png",
];

/// État du worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Activating,
    Active,
}

pub struct OfflineWorker {
    network: Arc<dyn Network>,
    storage: CacheStorage,
    cache_name: String,
    state: WorkerState,
}

impl OfflineWorker {
    pub fn new(network: Arc<dyn Network>, storage: CacheStorage) -> Self {
        Self::with_cache_name(network, storage, CACHE_NAME)
    }

    pub fn with_cache_name(network: Arc<dyn Network>, storage: CacheStorage, cache_name: &str) -> Self {
        Self {
            network,
            storage,
            cache_name: cache_name.to_string(),
            state: WorkerState::Installing,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Installe : télécharge tout le manifeste puis l'écrit dans le cache
    ///
    /// Une seule ressource en échec (réseau ou statut non 2xx) fait échouer
    /// toute l'installation ; rien n'est écrit dans ce cas.
    #[instrument(skip(self), fields(cache = %self.cache_name))]
    pub async fn install(&mut self) -> Result<()> {
        self.state = WorkerState::Installing;

        let mut fetched = Vec::with_capacity(PRECACHE_MANIFEST.len());
        for path in PRECACHE_MANIFEST {
            let response = self
                .network
                .send(&Request::get(path))
                .await
                .with_context(|| format!("Pré-cache impossible de {}", path))?;

            if !response.is_success() {
                bail!("Pré-cache de {} refusé : statut {}", path, response.status);
            }
            fetched.push((path, response));
        }

        let cache = self.storage.open(&self.cache_name).await?;
        for (path, response) in &fetched {
            cache.put(path, response).await?;
        }

        info!(assets = fetched.len(), "Manifeste pré-caché");
        self.state = WorkerState::Activating;
        Ok(())
    }

    /// Active : supprime les anciennes versions du cache
    ///
    /// Retourne les noms des caches supprimés.
    #[instrument(skip(self), fields(cache = %self.cache_name))]
    pub async fn activate(&mut self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();

        for name in self.storage.keys().await? {
            if name != self.cache_name {
                info!(old = %name, "Suppression d'un ancien cache");
                self.storage.delete(&name).await?;
                deleted.push(name);
            }
        }

        self.state = WorkerState::Active;
        Ok(deleted)
    }

    /// Intercepte une requête
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn fetch(&self, request: &Request) -> Result<Response> {
        if request.method != Method::Get {
            return self.network.send(request).await;
        }

        match self.network.send(request).await {
            Ok(response) => {
                if response.status == 200 {
                    self.store_in_background(&request.path, &response);
                }
                Ok(response)
            }
            Err(network_error) => {
                warn!(error = %network_error, "Réseau injoignable, lecture du cache");

                let cache = self.storage.open(&self.cache_name).await?;
                match cache.match_path(&request.path).await? {
                    Some(cached) => {
                        debug!("Réponse servie depuis le cache");
                        Ok(cached)
                    }
                    None => Err(network_error.context(format!("{} absent du cache", request.path))),
                }
            }
        }
    }

    /// Copie une réponse dans le cache sans bloquer l'appelant
    ///
    /// CONCEPT RUST : tokio::spawn
    /// - La tâche doit posséder ses données ('static) : on clone le chemin,
    ///   la réponse et le stockage avant le move
    fn store_in_background(&self, path: &str, response: &Response) {
        let storage = self.storage.clone();
        let cache_name = self.cache_name.clone();
        let path = path.to_string();
        let response = response.clone();

        tokio::spawn(async move {
            let result: Result<()> = async {
                let cache: Cache = storage.open(&cache_name).await?;
                cache.put(&path, &response).await
            }
            .await;

            if let Err(e) = result {
                warn!(path = %path, error = ?e, "Mise en cache échouée");
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::offline::cache::tests::temp_root;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Faux réseau : sert "<chemin>" pour tout GET, sauf hors-ligne
    pub(crate) struct FakeNetwork {
        pub offline: AtomicBool,
        pub failing_path: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl FakeNetwork {
        pub(crate) fn online() -> Self {
            Self {
                offline: AtomicBool::new(false),
                failing_path: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn send(&self, request: &Request) -> Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                bail!("réseau coupé");
            }
            if self.failing_path == Some(request.path.as_str()) {
                return Ok(Response::new(404, None, Vec::new()));
            }
            Ok(Response::new(200, Some("text/plain"), request.path.clone().into_bytes()))
        }
    }

    #[tokio::test]
    async fn test_install_and_activate() {
        let storage = CacheStorage::new(temp_root("worker-lifecycle"));
        storage.open("jusic-v1").await.unwrap();

        let mut worker = OfflineWorker::new(Arc::new(FakeNetwork::online()), storage.clone());
        assert_eq!(worker.state(), WorkerState::Installing);

        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Activating);

        let deleted = worker.activate().await.unwrap();
        assert_eq!(deleted, vec!["jusic-v1"]);
        assert_eq!(worker.state(), WorkerState::Active);
        assert_eq!(storage.keys().await.unwrap(), vec![CACHE_NAME]);

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_activate_keeps_unrelated_directories() {
        let storage = CacheStorage::new(temp_root("worker-foreign"));
        let precious = storage.root().join("autre-appli").join("donnees.db");
        tokio::fs::create_dir_all(precious.parent().unwrap()).await.unwrap();
        tokio::fs::write(&precious, b"ne pas toucher").await.unwrap();

        let mut worker = OfflineWorker::new(Arc::new(FakeNetwork::online()), storage.clone());
        worker.install().await.unwrap();
        let deleted = worker.activate().await.unwrap();

        assert!(deleted.is_empty());
        assert!(precious.exists());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    /// Attend que la copie en tâche de fond soit visible dans le cache
    async fn wait_for_entry(cache: &Cache, path: &str) -> Option<Response> {
        for _ in 0..100 {
            if let Some(response) = cache.match_path(path).await.unwrap() {
                return Some(response);
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_online_get_is_cached_then_served_offline() {
        let storage = CacheStorage::new(temp_root("worker-runtime-cache"));
        let network = Arc::new(FakeNetwork::online());
        let worker = OfflineWorker::new(network.clone(), storage.clone());

        let online = worker.fetch(&Request::get("/api/portfolio")).await.unwrap();
        assert_eq!(online.status, 200);

        let cache = storage.open(CACHE_NAME).await.unwrap();
        assert!(wait_for_entry(&cache, "/api/portfolio").await.is_some());

        network.go_offline();
        let offline = worker.fetch(&Request::get("/api/portfolio")).await.unwrap();
        assert_eq!(offline.body, b"/api/portfolio".to_vec());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_non_200_response_is_not_cached() {
        let storage = CacheStorage::new(temp_root("worker-no-cache-404"));
        let network = Arc::new(FakeNetwork {
            failing_path: Some("/api/verification/today"),
            ..FakeNetwork::online()
        });
        let worker = OfflineWorker::new(network.clone(), storage.clone());

        let response = worker.fetch(&Request::get("/api/verification/today")).await.unwrap();
        assert_eq!(response.status, 404);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let cache = storage.open(CACHE_NAME).await.unwrap();

        assert!(cache.match_path("/api/verification/today").await.unwrap().is_none());

        network.go_offline();
        assert!(worker.fetch(&Request::get("/api/verification/today")).await.is_err());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_install_fails_entirely_on_one_bad_asset() {
        let storage = CacheStorage::new(temp_root("worker-install-fail"));
        let network = FakeNetwork {
            failing_path: Some("/manifest.json"),
            ..FakeNetwork::online()
        };
        let mut worker = OfflineWorker::new(Arc::new(network), storage.clone());

        assert!(worker.install().await.is_err());
        assert_eq!(worker.state(), WorkerState::Installing);

        let cache = storage.open(CACHE_NAME).await.unwrap();
        assert!(cache.match_path("/").await.unwrap().is_none());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_offline_manifest_asset_served_from_cache() {
        let storage = CacheStorage::new(temp_root("worker-offline"));
        let network = Arc::new(FakeNetwork::online());
        let mut worker = OfflineWorker::new(network.clone(), storage.clone());
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        network.go_offline();

        let response = worker.fetch(&Request::get("/css/chat.css")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"/css/chat.css".to_vec());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_offline_and_not_cached_fails() {
        let storage = CacheStorage::new(temp_root("worker-miss"));
        let network = Arc::new(FakeNetwork::online());
        let worker = OfflineWorker::new(network.clone(), storage.clone());

        network.go_offline();
        assert!(worker.fetch(&Request::get("/api/portfolio")).await.is_err());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_post_bypasses_cache() {
        let storage = CacheStorage::new(temp_root("worker-post"));
        let network = Arc::new(FakeNetwork::online());
        let worker = OfflineWorker::new(network.clone(), storage.clone());

        let request = Request::post_json("/api/chat/message", &serde_json::json!({"message": "x"})).unwrap();
        worker.fetch(&request).await.unwrap();

        network.go_offline();
        assert!(worker.fetch(&request).await.is_err());
        assert_eq!(network.calls.load(Ordering::SeqCst), 2);

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }
}
