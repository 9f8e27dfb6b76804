// ============================================================================
// Cache nommé sur disque
// ============================================================================
// Équivalent terminal du CacheStorage du navigateur :
// - les caches vivent sous `<racine>/caches/`, un sous-répertoire par cache
//   nommé ; le reste de la racine n'est jamais lu ni supprimé
// - chaque entrée = `<clé>.body` (octets bruts) + `<clé>.meta.json`
// - la clé est le chemin de la requête encodé en hexadécimal, ce qui évite
//   tout caractère interdit dans un nom de fichier ; au-delà de
//   MAX_HEX_KEY_PATH octets, le chemin est remplacé par un condensé
//
// CONCEPT RUST : tokio::fs
// - Versions async des fonctions de std::fs
// - N'occupent pas le thread du runtime pendant les I/O disque
// ============================================================================

use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::offline::network::Response;

/// Sous-répertoire de la racine réservé aux caches nommés
const CACHES_DIR: &str = "caches";

/// Longueur max (octets) d'un chemin encodé tel quel : 2 × 100 + ".meta.json"
/// reste sous la limite de 255 octets d'un nom de fichier
const MAX_HEX_KEY_PATH: usize = 100;

/// Métadonnées d'une entrée (tout sauf le corps)
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    path: String,
    status: u16,
    content_type: Option<String>,
}

/// Ensemble des caches nommés
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
    caches: PathBuf,
}

impl CacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let caches = root.join(CACHES_DIR);
        Self { root, caches }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ouvre (et crée au besoin) un cache nommé
    pub async fn open(&self, name: &str) -> Result<Cache> {
        let dir = self.caches.join(name);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Impossible de créer le cache {:?}", dir))?;
        Ok(Cache { dir })
    }

    /// Noms des caches existants, triés
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.caches).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => {
                return Err(e).with_context(|| format!("Lecture impossible de {:?}", self.caches))
            }
        };

        while let Some(entry) = entries.next_entry().await.context("Lecture du répertoire de caches")? {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Supprime un cache nommé ; `false` s'il n'existait pas
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.caches.join(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(cache = name, "Cache supprimé");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Suppression impossible de {:?}", dir)),
        }
    }
}

/// Un cache nommé ouvert
///
/// Clone peu coûteux (un chemin) : utile pour écrire en tâche de fond.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    fn entry_paths(&self, path: &str) -> (PathBuf, PathBuf) {
        let key = encode_key(path);
        (
            self.dir.join(format!("{}.body", key)),
            self.dir.join(format!("{}.meta.json", key)),
        )
    }

    /// Enregistre (ou remplace) la réponse associée à un chemin
    pub async fn put(&self, path: &str, response: &Response) -> Result<()> {
        let (body_path, meta_path) = self.entry_paths(path);

        let meta = EntryMeta {
            path: path.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
        };
        let meta_json = serde_json::to_vec(&meta).context("Sérialisation des métadonnées")?;

        tokio::fs::write(&body_path, &response.body)
            .await
            .with_context(|| format!("Écriture impossible de {:?}", body_path))?;
        tokio::fs::write(&meta_path, meta_json)
            .await
            .with_context(|| format!("Écriture impossible de {:?}", meta_path))?;

        debug!(path, bytes = response.body.len(), "Entrée mise en cache");
        Ok(())
    }

    /// Cherche la réponse associée à un chemin
    pub async fn match_path(&self, path: &str) -> Result<Option<Response>> {
        let (body_path, meta_path) = self.entry_paths(path);

        let meta_bytes = match tokio::fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Lecture impossible de {:?}", meta_path)),
        };
        let meta: EntryMeta = serde_json::from_slice(&meta_bytes)
            .with_context(|| format!("Métadonnées corrompues : {:?}", meta_path))?;

        // Deux chemins longs peuvent partager un condensé
        if meta.path != path {
            return Ok(None);
        }

        let body = tokio::fs::read(&body_path)
            .await
            .with_context(|| format!("Lecture impossible de {:?}", body_path))?;

        Ok(Some(Response {
            status: meta.status,
            content_type: meta.content_type,
            body,
        }))
    }
}

/// "/css/chat.css" → "2f6373732f636861742e637373"
///
/// Chemin trop long → "h-<condensé>-<longueur>"
fn encode_key(path: &str) -> String {
    if path.len() > MAX_HEX_KEY_PATH {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        return format!("h-{:016x}-{}", hasher.finish(), path.len());
    }

    path.bytes().fold(String::with_capacity(path.len() * 2), |mut key, byte| {
        let _ = write!(key, "{:02x}", byte);
        key
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Répertoire temporaire unique par test
    pub(crate) fn temp_root(label: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("jusic-chat-{}-{}-{}", label, std::process::id(), n))
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("/"), "2f");
        assert_eq!(encode_key("/a b"), "2f612062");
    }

    #[test]
    fn test_long_key_fits_in_a_file_name() {
        let path = format!("/api/chat?q={}", "x".repeat(400));
        let key = encode_key(&path);
        assert!(key.starts_with("h-"));
        assert!(format!("{}.meta.json", key).len() < 255);
        assert_ne!(key, encode_key(&format!("{}y", path)));
    }

    #[tokio::test]
    async fn test_long_path_put_then_match() {
        let storage = CacheStorage::new(temp_root("cache-long"));
        let cache = storage.open("jusic-v2").await.unwrap();
        let path = format!("/api/verification/today?{}", "ticker=005930&".repeat(30));

        assert!(cache.match_path(&path).await.unwrap().is_none());

        let response = Response::new(200, Some("application/json"), b"{}".to_vec());
        cache.put(&path, &response).await.unwrap();
        assert_eq!(cache.match_path(&path).await.unwrap(), Some(response));

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_keys_ignore_directories_outside_the_cache_namespace() {
        let storage = CacheStorage::new(temp_root("cache-namespace"));
        let foreign = storage.root().join("autre-appli");
        tokio::fs::create_dir_all(&foreign).await.unwrap();

        storage.open("jusic-v2").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["jusic-v2"]);
        assert!(!storage.delete("autre-appli").await.unwrap());
        assert!(foreign.exists());

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_put_then_match() {
        let storage = CacheStorage::new(temp_root("cache-put"));
        let cache = storage.open("jusic-v2").await.unwrap();

        assert!(cache.match_path("/js/chat.js").await.unwrap().is_none());

        let response = Response::new(200, Some("application/javascript"), b"console.log(1)".to_vec());
        cache.put("/js/chat.js", &response).await.unwrap();

        assert_eq!(cache.match_path("/js/chat.js").await.unwrap(), Some(response));

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let storage = CacheStorage::new(temp_root("cache-keys"));
        assert!(storage.keys().await.unwrap().is_empty());

        storage.open("jusic-v1").await.unwrap();
        storage.open("jusic-v2").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["jusic-v1", "jusic-v2"]);

        assert!(storage.delete("jusic-v1").await.unwrap());
        assert!(!storage.delete("jusic-v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["jusic-v2"]);

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }
}
