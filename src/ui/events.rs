// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier du terminal et classe les touches
//
// Sur l'écran de chat, toute touche « simple » part dans la saisie : les
// commandes passent donc par Ctrl (^P, ^R, ^A, ^O, ^X, ^Q). Les lettres
// seules (j, k, d, r) ne servent que dans les modales.
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching sur KeyCode et KeyModifiers
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Délai d'attente par défaut entre deux ticks
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

// ============================================================================
// Enum Event
// ============================================================================

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (montage des graphiques, expiration du badge)
    Tick,

    /// Terminal redimensionné
    Resize,
}

/// Gestionnaire d'événements
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement, ou Tick après `timeout`
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - La boucle principale réduit le timeout quand un graphique
    ///   doit être monté avant le prochain tick
    pub fn next(&self, timeout: Duration) -> Result<Event> {
        if !event::poll(timeout)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS, on reçoit Press ET Release
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(..) => Ok(Event::Resize),
            _ => Ok(Event::Tick),
        }
    }
}

// ============================================================================
// Helpers : classer les touches
// ============================================================================

fn key_of(event: &Event) -> Option<&KeyEvent> {
    match event {
        Event::Key(key) => Some(key),
        _ => None,
    }
}

/// Ctrl + lettre (insensible à la casse)
pub fn is_ctrl(event: &Event, letter: char) -> bool {
    key_of(event).is_some_and(|key| {
        key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&letter))
    })
}

/// Ctrl+Q (quitter, avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    is_ctrl(event, 'q')
}

pub fn is_escape_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::Esc)
}

pub fn is_enter_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::Enter)
}

pub fn is_backspace_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::Backspace)
}

/// Tab : horizon suivant
pub fn is_tab_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::Tab)
}

/// Shift+Tab : horizon précédent
pub fn is_backtab_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::BackTab)
}

pub fn is_page_up_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::PageUp)
}

pub fn is_page_down_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| key.code == KeyCode::PageDown)
}

/// Flèche vers le haut ou 'k' (vim), dans les modales
pub fn is_up_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche vers le bas ou 'j' (vim), dans les modales
pub fn is_down_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// 'd' : retirer le titre sélectionné (confirmation requise)
pub fn is_delete_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| matches!(key.code, KeyCode::Char('d') | KeyCode::Char('D')))
}

/// 'r' : recharger la modale
pub fn is_reload_event(event: &Event) -> bool {
    key_of(event).is_some_and(|key| matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')))
}

/// Caractère saisi, hors combinaisons Ctrl/Alt
pub fn get_char_from_event(event: &Event) -> Option<char> {
    let key = key_of(event)?;
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(!is_quit_event(&key(KeyCode::Char('q'), KeyModifiers::empty())));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_ctrl_is_case_insensitive() {
        let event = key(KeyCode::Char('P'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert!(is_ctrl(&event, 'p'));
        assert!(!is_ctrl(&event, 'r'));
    }

    #[test]
    fn test_get_char_ignores_control() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char('a'), KeyModifiers::empty())), Some('a'));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)), Some('A'));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)), None);
        assert_eq!(get_char_from_event(&key(KeyCode::Enter, KeyModifiers::empty())), None);
    }

    #[test]
    fn test_modal_keys() {
        assert!(is_down_event(&key(KeyCode::Char('j'), KeyModifiers::empty())));
        assert!(is_up_event(&key(KeyCode::Up, KeyModifiers::empty())));
        assert!(is_delete_event(&key(KeyCode::Char('d'), KeyModifiers::empty())));
        assert!(is_reload_event(&key(KeyCode::Char('r'), KeyModifiers::empty())));
        assert!(is_backtab_event(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
    }
}
