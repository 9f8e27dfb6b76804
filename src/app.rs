// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Un seul propriétaire : App vit sur le thread UI, le worker ne lui
//    renvoie que des résultats (pas de Mutex)
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence de l'état
// ============================================================================

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::models::{ChatResponse, MarketSafety, PortfolioResponse, StockRecommendation, Timeframe, VerificationReport};
use crate::offline::notification::{self, Notification, NotificationAction};
use crate::render::modals::{high_probability_stocks, PortfolioView, VerificationView};
use crate::render::{dispatch, HeaderView, RenderSession, Rendered};

/// Durée d'affichage du badge d'alerte
pub const ALERT_BADGE_TTL: Duration = Duration::from_secs(10);

/// Bulle affichée quand l'envoi d'un message échoue
pub const APOLOGY_MESSAGE: &str = "😢 Désolé, une erreur est survenue. Merci de réessayer.";

/// Notifications conservées ; au-delà, les plus anciennes sont oubliées
pub const MAX_NOTIFICATIONS: usize = 5;

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Le chat est toujours dessous, les autres écrans sont des modales
// - Un seul écran actif à la fois
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Fil de discussion avec le chatbot
    Chat,

    /// Modale portefeuille
    Portfolio,

    /// Modale de vérification des prédictions
    Verification,

    /// Modale des titres à forte probabilité de hausse
    HighProbability,
}

impl Screen {
    /// Écran correspondant à l'URL d'une notification
    pub fn from_url(url: &str) -> Screen {
        match url.trim_end_matches('/') {
            "/portfolio" => Screen::Portfolio,
            "/verification" => Screen::Verification,
            _ => Screen::Chat,
        }
    }
}

/// Requête confiée au worker, suivie jusqu'à son résultat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Chat,
    Portfolio,
    Removal,
    Verification,
}

/// Entrée du fil de discussion
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    /// Texte tapé par l'utilisateur (sans mot-clé d'horizon)
    User(String),
    /// Réponse du chatbot déjà passée par le dispatcher
    Bot(Rendered),
    /// L'envoi a échoué
    Apology,
}

/// Badge "titres à forte probabilité", retiré automatiquement
#[derive(Debug, Clone, PartialEq)]
pub struct AlertBadge {
    pub stocks: Vec<StockRecommendation>,
    pub expires_at: Instant,
}

impl AlertBadge {
    pub fn label(&self) -> String {
        format!("🔔 {} titres à forte probabilité détectés !", self.stocks.len())
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' → confirm_quit = true
    pub confirm_quit: bool,

    pub current_screen: Screen,

    pub transcript: Vec<TranscriptEntry>,

    /// Carte d'accueil, retirée au premier message ou au premier dashboard
    pub show_welcome: bool,

    /// Texte en cours de saisie
    pub input_buffer: String,

    /// Décalage de défilement du fil, en lignes depuis le bas
    pub scroll: u16,

    /// Requêtes en cours côté worker, dans l'ordre d'envoi
    pub pending: Vec<(Task, String)>,

    pub header: HeaderView,

    /// Graphiques vivants et différés (porte aussi l'horizon sélectionné)
    pub session: RenderSession,

    /// Générateur des séries de chandeliers illustratives
    rng: StdRng,

    pub alert: Option<AlertBadge>,

    /// Titres listés par la modale HighProbability
    pub high_probability: Vec<StockRecommendation>,

    /// Notifications push affichées (la plus récente en dernier)
    pub notifications: Vec<Notification>,

    pub portfolio: Option<PortfolioView>,

    /// Ligne sélectionnée dans la modale portefeuille
    pub selected_index: usize,

    /// Two-step delete sur la modale portefeuille
    pub confirm_delete: bool,

    pub verification: Option<VerificationView>,

    /// Message bloquant (équivalent d'un alert()), fermé par n'importe quelle touche
    pub popup: Option<String>,
}

impl App {
    pub fn new(timeframe: Timeframe) -> Self {
        Self::with_rng(timeframe, StdRng::from_entropy())
    }

    /// CONCEPT : Injection du générateur
    /// - Les tests passent un StdRng à graine fixe pour des chandeliers reproductibles
    pub fn with_rng(timeframe: Timeframe, rng: StdRng) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            current_screen: Screen::Chat,
            transcript: Vec::new(),
            show_welcome: true,
            input_buffer: String::new(),
            scroll: 0,
            pending: Vec::new(),
            header: HeaderView::default(),
            session: RenderSession::new(timeframe),
            rng,
            alert: None,
            high_probability: Vec::new(),
            notifications: Vec::new(),
            portfolio: None,
            selected_index: 0,
            confirm_delete: false,
            verification: None,
            popup: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : monte les graphiques arrivés à échéance et expire le badge
    pub fn tick(&mut self, now: Instant) {
        let mounted = self.session.mount_due(now);
        if mounted > 0 {
            debug!(mounted, "Graphiques montés");
        }

        if self.alert.as_ref().is_some_and(|badge| now >= badge.expires_at) {
            debug!("Badge d'alerte expiré");
            self.alert = None;
        }
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    // CONCEPT : un indicateur par requête
    // - Chaque résultat ne retire que sa propre requête : une réponse du
    //   chat n'éteint pas le chargement du portefeuille lancé entre-temps

    pub fn start_loading(&mut self, task: Task, message: impl Into<String>) {
        self.pending.push((task, message.into()));
    }

    pub fn stop_loading(&mut self, task: Task) {
        if let Some(index) = self.pending.iter().position(|(t, _)| *t == task) {
            self.pending.remove(index);
        }
    }

    /// Worker perdu : plus aucun résultat n'arrivera
    pub fn stop_all_loading(&mut self) {
        self.pending.clear();
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_busy(&self, task: Task) -> bool {
        self.pending.iter().any(|(t, _)| *t == task)
    }

    /// Message de la requête la plus récente
    pub fn loading_message(&self) -> Option<&str> {
        self.pending.last().map(|(_, message)| message.as_str())
    }

    // ========================================================================
    // Saisie et horizon
    // ========================================================================

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn timeframe(&self) -> Timeframe {
        self.session.timeframe
    }

    pub fn next_timeframe(&mut self) {
        self.session.timeframe = self.session.timeframe.next();
    }

    pub fn previous_timeframe(&mut self) {
        self.session.timeframe = self.session.timeframe.previous();
    }

    /// Valide la saisie
    ///
    /// Retourne le texte à envoyer, ou None si la saisie est vide ou si un
    /// message est déjà en attente de réponse (bouton d'envoi désactivé).
    pub fn submit_message(&mut self) -> Option<String> {
        let message = self.input_buffer.trim().to_string();
        if message.is_empty() || self.is_busy(Task::Chat) {
            return None;
        }

        self.input_buffer.clear();
        self.show_welcome = false;
        self.scroll = 0;
        self.transcript.push(TranscriptEntry::User(message.clone()));
        self.start_loading(Task::Chat, "Le chatbot réfléchit...");

        Some(message)
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// État du marché chargé au démarrage
    pub fn apply_market_safety(&mut self, safety: &MarketSafety) {
        self.header.update(safety, &mut self.session);
    }

    /// Réponse du chatbot : dispatch puis détection des titres à forte probabilité
    pub fn apply_chat_response(&mut self, response: &ChatResponse, now: Instant) {
        self.stop_loading(Task::Chat);

        let rendered = dispatch(response, &mut self.session, &mut self.header, &mut self.rng, now);
        if matches!(rendered, Rendered::Dashboard(_)) {
            self.show_welcome = false;
        }
        self.transcript.push(TranscriptEntry::Bot(rendered));
        self.scroll = 0;

        self.check_high_probability(response.recommendations(), now);
    }

    /// Échec d'envoi : bulle d'excuse
    pub fn apply_chat_error(&mut self, error: &str) {
        warn!(error, "Réponse du chatbot indisponible");
        self.stop_loading(Task::Chat);
        self.transcript.push(TranscriptEntry::Apology);
    }

    fn check_high_probability(&mut self, recommendations: &[StockRecommendation], now: Instant) {
        if recommendations.is_empty() {
            return;
        }

        let stocks = high_probability_stocks(recommendations);
        if stocks.is_empty() {
            return;
        }

        info!(count = stocks.len(), "Titres à forte probabilité détectés");

        let payload = serde_json::json!({
            "title": "🔔 Titres à forte probabilité",
            "body": format!("{} titres dépassent 60 % de probabilité de hausse.", stocks.len()),
            "url": "/",
        });
        match notification::on_push(Some(&payload.to_string())) {
            Ok(n) => self.push_notification(n),
            Err(e) => warn!(error = ?e, "Notification locale impossible"),
        }

        self.high_probability = stocks.clone();
        // Un nouveau badge remplace l'ancien
        self.alert = Some(AlertBadge {
            stocks,
            expires_at: now + ALERT_BADGE_TTL,
        });
    }

    /// Ouvre la modale depuis le badge (le badge disparaît)
    pub fn open_alert(&mut self) -> bool {
        match self.alert.take() {
            Some(badge) => {
                self.high_probability = badge.stocks;
                self.current_screen = Screen::HighProbability;
                true
            }
            None => false,
        }
    }

    pub fn apply_portfolio(&mut self, response: &PortfolioResponse) {
        self.stop_loading(Task::Portfolio);
        let view = PortfolioView::from_response(response);
        self.selected_index = self.selected_index.min(view.rows.len().saturating_sub(1));
        self.portfolio = Some(view);
        self.confirm_delete = false;
        self.current_screen = Screen::Portfolio;
    }

    pub fn apply_portfolio_error(&mut self, error: &str) {
        warn!(error, "Portefeuille indisponible");
        self.stop_loading(Task::Portfolio);
        self.popup = Some("Impossible de charger le portefeuille.".to_string());
    }

    /// Titre retiré : message de confirmation (le rechargement est demandé par l'appelant)
    pub fn apply_removed(&mut self, ticker: &str) {
        self.stop_loading(Task::Removal);
        self.popup = Some(format!("{} a été retiré du portefeuille.", ticker));
    }

    pub fn apply_remove_error(&mut self, ticker: &str, error: &str) {
        warn!(ticker, error, "Suppression refusée");
        self.stop_loading(Task::Removal);
        self.popup = Some(format!("Échec de la suppression de {}.", ticker));
    }

    /// Rapport de vérification : un champ `error` devient un message bloquant
    pub fn apply_verification(&mut self, report: &VerificationReport) {
        self.stop_loading(Task::Verification);
        if let Some(error) = &report.error {
            self.popup = Some(error.clone());
            return;
        }
        self.verification = Some(VerificationView::from_report(report));
        self.current_screen = Screen::Verification;
    }

    pub fn apply_verification_error(&mut self, error: &str) {
        warn!(error, "Vérification indisponible");
        self.stop_loading(Task::Verification);
        self.popup = Some("Impossible de charger les résultats de vérification.".to_string());
    }

    // ========================================================================
    // Modales
    // ========================================================================

    pub fn close_modal(&mut self) {
        self.current_screen = Screen::Chat;
        self.confirm_delete = false;
    }

    pub fn dismiss_popup(&mut self) -> bool {
        self.popup.take().is_some()
    }

    pub fn is_on_chat(&self) -> bool {
        self.current_screen == Screen::Chat
    }

    pub fn is_on_portfolio(&self) -> bool {
        self.current_screen == Screen::Portfolio
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let len = self.portfolio.as_ref().map(|p| p.rows.len()).unwrap_or(0);
        self.selected_index = (self.selected_index + 1).min(len.saturating_sub(1));
    }

    /// Ticker de la ligne sélectionnée dans le portefeuille
    pub fn selected_ticker(&self) -> Option<&str> {
        self.portfolio
            .as_ref()
            .and_then(|p| p.rows.get(self.selected_index))
            .map(|row| row.ticker.as_str())
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Ajoute une notification en oubliant les plus anciennes au-delà de
    /// MAX_NOTIFICATIONS
    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// Clic sur la notification la plus récente
    ///
    /// Retourne l'écran à ouvrir (action "open" ou aucune action).
    pub fn click_notification(&mut self, action: Option<NotificationAction>) -> Option<Screen> {
        let latest = self.notifications.pop()?;
        notification::on_click(latest, action).map(|url| Screen::from_url(&url))
    }
}
