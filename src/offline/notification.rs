// ============================================================================
// Notifications push
// ============================================================================
// - on_push : charge utile JSON optionnelle → notification affichable
// - on_click : ferme la notification et donne l'URL à ouvrir, seulement
//   pour l'action "open" ou un clic sans action
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_TITLE: &str = "Jusic";
pub const DEFAULT_BODY: &str = "Nouvelles recommandations disponibles !";
pub const ICON: &str = "/icon-192x192.png";

/// Charge utile d'un push (tous les champs sont facultatifs)
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
}

/// Action proposée par la notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Open,
    Close,
}

impl NotificationAction {
    pub fn id(&self) -> &'static str {
        match self {
            NotificationAction::Open => "open",
            NotificationAction::Close => "close",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationAction::Open => "Voir",
            NotificationAction::Close => "Fermer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub icon: &'static str,
    /// URL ouverte au clic ("/" par défaut)
    pub url: String,
    pub actions: [NotificationAction; 2],
}

/// Construit la notification d'un événement push
///
/// `None` (push sans données) → titre et texte par défaut.
pub fn on_push(data: Option<&str>) -> Result<Notification> {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    let payload: PushPayload = match data {
        Some(json) => serde_json::from_str(json).context("Charge utile de push invalide")?,
        None => PushPayload::default(),
    };

    let notification = Notification {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: ICON,
        url: payload.url.unwrap_or_else(|| "/".to_string()),
        actions: [NotificationAction::Open, NotificationAction::Close],
    };

    debug!(id = notification.id, title = %notification.title, "Notification affichée");
    Ok(notification)
}

/// Clic sur une notification
///
/// La notification est consommée (fermée) dans tous les cas.
pub fn on_click(notification: Notification, action: Option<NotificationAction>) -> Option<String> {
    match action {
        None | Some(NotificationAction::Open) => Some(notification.url),
        Some(NotificationAction::Close) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_without_data_uses_defaults() {
        let n = on_push(None).unwrap();
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert_eq!(n.url, "/");
        assert_eq!(n.actions[0].id(), "open");
        assert_eq!(n.actions[1].title(), "Fermer");
    }

    #[test]
    fn test_push_with_payload() {
        let n = on_push(Some(r#"{"title": "Alerte", "url": "/portfolio"}"#)).unwrap();
        assert_eq!(n.title, "Alerte");
        assert_eq!(n.body, DEFAULT_BODY);
        assert_eq!(n.url, "/portfolio");
    }

    #[test]
    fn test_push_with_invalid_json_fails() {
        assert!(on_push(Some("pas du json")).is_err());
    }

    #[test]
    fn test_click_actions() {
        let n = on_push(Some(r#"{"url": "/verification"}"#)).unwrap();
        assert_eq!(on_click(n.clone(), None).as_deref(), Some("/verification"));
        assert_eq!(on_click(n.clone(), Some(NotificationAction::Open)).as_deref(), Some("/verification"));
        assert_eq!(on_click(n, Some(NotificationAction::Close)), None);
    }
}
