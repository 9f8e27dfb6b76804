// ============================================================================
// Jusic Chat - Client terminal du chatbot de recommandations
// ============================================================================
// Programme TUI : fil de discussion avec le chatbot, en-tête de sécurité du
// marché, modales portefeuille / vérification, alertes de forte probabilité.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : un worker thread possède le runtime tokio
// 4. Un seul propriétaire : App reste sur le thread UI, le worker ne
//    renvoie que des résultats par channel
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use jusic_chat::api::ApiClient;
use jusic_chat::app::{App, Screen, Task};
use jusic_chat::config::{Args, Settings};
use jusic_chat::models::{ChatResponse, MarketSafety, PortfolioResponse, Timeframe, VerificationReport};
use jusic_chat::offline::{CacheStorage, HttpNetwork, NotificationAction};
use jusic_chat::ui::events::{Event, EventHandler, DEFAULT_TICK};
use jusic_chat::ui::render;

// ============================================================================
// AppCommand / AppResult : protocole avec le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker exécute les appels HTTP (async) et renvoie les résultats
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Envoyer un message au chatbot avec l'horizon sélectionné
    SendMessage { message: String, timeframe: Timeframe },

    LoadPortfolio,

    /// Retirer un titre du portefeuille
    RemoveStock { ticker: String },

    LoadVerification,
}

impl AppCommand {
    /// Requête suivie par l'indicateur de chargement
    fn task(&self) -> Task {
        match self {
            AppCommand::SendMessage { .. } => Task::Chat,
            AppCommand::LoadPortfolio => Task::Portfolio,
            AppCommand::RemoveStock { .. } => Task::Removal,
            AppCommand::LoadVerification => Task::Verification,
        }
    }
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    MarketLoaded(MarketSafety),
    ChatReplied(ChatResponse),
    ChatFailed(String),
    PortfolioLoaded(PortfolioResponse),
    PortfolioFailed(String),
    StockRemoved(String),
    RemoveFailed { ticker: String, error: String },
    VerificationLoaded(VerificationReport),
    VerificationFailed(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f logs/jusic-chat.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=jusic_chat=trace jusic-chat
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "jusic-chat.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour jusic_chat, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jusic_chat=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let settings = Settings::load(Args::parse())?;

    // Si le logging échoue, on continue sans
    init_logging(&settings.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        base_url = %settings.base_url,
        cache_dir = ?settings.cache_dir,
        timeframe = settings.timeframe.id(),
        "Jusic Chat starting up"
    );

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(settings.timeframe);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(&settings, command_rx, result_tx);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - tokio::runtime::Runtime : runtime async propre à ce thread
// - block_on() bloque le worker, jamais l'UI
// ============================================================================

/// Lance le worker : installation du cache hors-ligne, état du marché,
/// puis traitement des commandes jusqu'à fermeture du channel
fn spawn_background_worker(
    settings: &Settings,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    let base_url = settings.base_url.clone();
    let cache_dir = settings.cache_dir.clone();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime");
                return;
            }
        };

        let network = match HttpNetwork::new(&base_url) {
            Ok(network) => network,
            Err(e) => {
                error!(error = ?e, "Failed to build HTTP client");
                return;
            }
        };
        let mut client = ApiClient::new(Arc::new(network), CacheStorage::new(cache_dir));

        runtime.block_on(async {
            // Le cache hors-ligne est un bonus : l'app fonctionne sans
            if let Err(e) = client.start_offline().await {
                warn!(error = ?e, "Offline cache unavailable");
            }

            match client.market_status().await {
                Ok(safety) => {
                    let _ = result_tx.send(AppResult::MarketLoaded(safety));
                }
                Err(e) => warn!(error = ?e, "Market status unavailable"),
            }
        });

        // CONCEPT : Command processing loop
        // - recv() échoue quand le thread UI a lâché command_tx
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");
            let result = runtime.block_on(execute(&client, command));
            if result_tx.send(result).is_err() {
                break;
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Exécute une commande et la convertit en résultat
async fn execute(client: &ApiClient, command: AppCommand) -> AppResult {
    match command {
        AppCommand::SendMessage { message, timeframe } => {
            match client.send_message(&message, timeframe).await {
                Ok(response) => AppResult::ChatReplied(response),
                Err(e) => {
                    error!(error = ?e, "Failed to send message");
                    AppResult::ChatFailed(e.to_string())
                }
            }
        }

        AppCommand::LoadPortfolio => match client.portfolio().await {
            Ok(portfolio) => AppResult::PortfolioLoaded(portfolio),
            Err(e) => {
                error!(error = ?e, "Failed to load portfolio");
                AppResult::PortfolioFailed(e.to_string())
            }
        },

        AppCommand::RemoveStock { ticker } => match client.remove_from_portfolio(&ticker).await {
            Ok(()) => AppResult::StockRemoved(ticker),
            Err(e) => {
                error!(ticker = %ticker, error = ?e, "Failed to remove stock");
                AppResult::RemoveFailed {
                    ticker,
                    error: e.to_string(),
                }
            }
        },

        AppCommand::LoadVerification => match client.verification_today().await {
            Ok(report) => AppResult::VerificationLoaded(report),
            Err(e) => {
                error!(error = ?e, "Failed to load verification");
                AppResult::VerificationFailed(e.to_string())
            }
        },
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
//   3. Update (montage des graphiques différés, expiration du badge)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        loop {
            match result_rx.try_recv() {
                Ok(result) => apply_result(app, result, &command_tx),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if app.is_loading() {
                        error!("Worker thread disconnected!");
                        app.stop_all_loading();
                        app.popup = Some("Le service est indisponible.".to_string());
                    }
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT
        // ========================================
        // Le timeout est raccourci si un graphique doit être monté avant
        let timeout = app
            .session
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(DEFAULT_TICK, |wait| wait.min(DEFAULT_TICK))
            .max(Duration::from_millis(1));

        match events.next(timeout) {
            Ok(event) => handle_event(app, event, &command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }

        // ========================================
        // 3. UPDATE
        // ========================================
        app.tick(Instant::now());
    }

    Ok(())
}

/// Applique un résultat du worker à l'état de l'application
fn apply_result(app: &mut App, result: AppResult, command_tx: &mpsc::Sender<AppCommand>) {
    match result {
        AppResult::MarketLoaded(safety) => {
            info!(
                safe = safety.safe_stocks(),
                low_volatility = safety.low_volatility_stocks(),
                "Market safety loaded"
            );
            app.apply_market_safety(&safety);
        }
        AppResult::ChatReplied(response) => app.apply_chat_response(&response, Instant::now()),
        AppResult::ChatFailed(error) => app.apply_chat_error(&error),
        AppResult::PortfolioLoaded(portfolio) => app.apply_portfolio(&portfolio),
        AppResult::PortfolioFailed(error) => app.apply_portfolio_error(&error),
        AppResult::StockRemoved(ticker) => {
            info!(ticker = %ticker, "Stock removed, reloading portfolio");
            app.apply_removed(&ticker);
            send(app, command_tx, AppCommand::LoadPortfolio, "Rechargement du portefeuille...");
        }
        AppResult::RemoveFailed { ticker, error } => app.apply_remove_error(&ticker, &error),
        AppResult::VerificationLoaded(report) => app.apply_verification(&report),
        AppResult::VerificationFailed(error) => app.apply_verification_error(&error),
    }
}

/// Envoie une commande au worker et active l'indicateur de chargement
fn send(app: &mut App, command_tx: &mpsc::Sender<AppCommand>, command: AppCommand, loading: &str) {
    let task = command.task();
    if command_tx.send(command).is_err() {
        error!("Worker channel closed");
        app.popup = Some("Le service est indisponible.".to_string());
        return;
    }
    app.start_loading(task, loading);
}

/// Charge les données de l'écran ouvert par une notification
fn open_screen(app: &mut App, screen: Screen, command_tx: &mpsc::Sender<AppCommand>) {
    match screen {
        Screen::Portfolio => send(app, command_tx, AppCommand::LoadPortfolio, "Chargement du portefeuille..."),
        Screen::Verification => send(app, command_tx, AppCommand::LoadVerification, "Chargement de la vérification..."),
        Screen::HighProbability => {
            app.open_alert();
        }
        Screen::Chat => app.close_modal(),
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT RUST : Pattern matching avec guards
// - Les guards filtrent selon la touche ET l'écran courant
// - L'ordre des bras compte : popup > quit > modales > chat
// ============================================================================

fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use jusic_chat::ui::events::{
        get_char_from_event, is_backspace_event, is_backtab_event, is_ctrl, is_delete_event, is_down_event,
        is_enter_event, is_escape_event, is_page_down_event, is_page_up_event, is_quit_event, is_reload_event,
        is_tab_event, is_up_event,
    };

    match event {
        // Message bloquant : n'importe quelle touche le ferme
        Event::Key(_) if app.popup.is_some() => {
            app.dismiss_popup();
        }

        Event::Key(_) if is_quit_event(&event) => {
            // Two-step confirmation pour éviter les quits accidentels
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // ========================================
        // Notifications (tous écrans)
        // ========================================
        Event::Key(_) if is_ctrl(&event, 'o') && !app.notifications.is_empty() => {
            app.cancel_quit();
            if let Some(screen) = app.click_notification(Some(NotificationAction::Open)) {
                info!(?screen, "User opened notification");
                open_screen(app, screen, command_tx);
            }
        }

        Event::Key(_) if is_ctrl(&event, 'x') && !app.notifications.is_empty() => {
            app.cancel_quit();
            debug!("User closed notification");
            app.click_notification(Some(NotificationAction::Close));
        }

        // ========================================
        // Modale portefeuille
        // ========================================
        Event::Key(_) if is_delete_event(&event) && app.is_on_portfolio() => {
            app.cancel_quit();
            let Some(ticker) = app.selected_ticker().map(str::to_string) else {
                return;
            };
            if app.is_awaiting_delete_confirmation() {
                info!(ticker = %ticker, "User confirmed remove");
                app.cancel_delete();
                send(app, command_tx, AppCommand::RemoveStock { ticker }, "Suppression...");
            } else {
                info!(ticker = %ticker, "User requested remove (awaiting confirmation)");
                app.request_delete();
            }
        }

        Event::Key(_) if is_up_event(&event) && app.is_on_portfolio() => {
            app.cancel_quit();
            app.cancel_delete();
            app.navigate_up();
        }

        Event::Key(_) if is_down_event(&event) && app.is_on_portfolio() => {
            app.cancel_quit();
            app.cancel_delete();
            app.navigate_down();
        }

        Event::Key(_) if is_reload_event(&event) && app.is_on_portfolio() => {
            app.cancel_quit();
            app.cancel_delete();
            send(app, command_tx, AppCommand::LoadPortfolio, "Chargement du portefeuille...");
        }

        Event::Key(_) if is_reload_event(&event) && app.current_screen == Screen::Verification => {
            app.cancel_quit();
            send(app, command_tx, AppCommand::LoadVerification, "Chargement de la vérification...");
        }

        Event::Key(_) if is_escape_event(&event) && !app.is_on_chat() => {
            app.cancel_quit();
            debug!("User closed modal");
            app.close_modal();
        }

        // ========================================
        // Chat : commandes Ctrl
        // ========================================
        Event::Key(_) if is_ctrl(&event, 'p') && app.is_on_chat() => {
            app.cancel_quit();
            info!("User opened portfolio");
            send(app, command_tx, AppCommand::LoadPortfolio, "Chargement du portefeuille...");
        }

        Event::Key(_) if is_ctrl(&event, 'r') && app.is_on_chat() => {
            app.cancel_quit();
            info!("User opened verification");
            send(app, command_tx, AppCommand::LoadVerification, "Chargement de la vérification...");
        }

        Event::Key(_) if is_ctrl(&event, 'a') && app.is_on_chat() => {
            app.cancel_quit();
            if app.open_alert() {
                info!("User opened high-probability alert");
            }
        }

        // ========================================
        // Chat : saisie
        // ========================================
        Event::Key(_) if is_enter_event(&event) && app.is_on_chat() => {
            app.cancel_quit();
            let timeframe = app.timeframe();
            if let Some(message) = app.submit_message() {
                info!(timeframe = timeframe.id(), "User sent message");
                if command_tx.send(AppCommand::SendMessage { message, timeframe }).is_err() {
                    app.apply_chat_error("worker channel closed");
                }
            }
        }

        Event::Key(_) if is_backspace_event(&event) && app.is_on_chat() => {
            app.cancel_quit();
            app.backspace();
        }

        Event::Key(_) if is_tab_event(&event) && app.is_on_chat() => {
            app.cancel_quit();
            app.next_timeframe();
            debug!(timeframe = app.timeframe().id(), "User changed timeframe");
        }

        Event::Key(_) if is_backtab_event(&event) && app.is_on_chat() => {
            app.cancel_quit();
            app.previous_timeframe();
            debug!(timeframe = app.timeframe().id(), "User changed timeframe");
        }

        Event::Key(_) if is_page_up_event(&event) && app.is_on_chat() => app.scroll_up(),
        Event::Key(_) if is_page_down_event(&event) && app.is_on_chat() => app.scroll_down(),

        Event::Key(_) if app.is_on_chat() && get_char_from_event(&event).is_some() => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Key(_) => {
            // Toute autre touche : annule les confirmations si actives
            app.cancel_quit();
            app.cancel_delete();
        }

        Event::Tick | Event::Resize => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
