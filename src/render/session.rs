// ============================================================================
// RenderSession : état de rendu des graphiques
// ============================================================================
// Contient les graphiques construits, la file des constructions différées,
// les échecs de construction et l'horizon courant.
//
// La session vit sur le thread UI et se passe explicitement (&mut) aux
// renderers : pas de variable globale, pas de verrou.
//
// CONCEPTS RUST :
// 1. VecDeque : file FIFO des graphiques en attente
// 2. Instant injecté : le temps est un paramètre, donc testable
// ============================================================================

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::Timeframe;
use crate::render::charts::{
    ChartContainer, ChartInstance, ChartKind, ChartSpec, RISK_GAUGE_CANVAS, VOLATILITY_GAUGE_CANVAS,
};

/// Délai entre la création d'un conteneur et la construction du graphique
pub const CHART_DELAY: Duration = Duration::from_millis(100);

/// Graphique planifié, pas encore construit
#[derive(Debug, Clone)]
struct PendingChart {
    container: ChartContainer,
    spec: ChartSpec,
    ready_at: Instant,
}

/// État d'un emplacement de graphique, tel que le voit le dessin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// Construction pas encore effectuée
    Pending,
    /// Graphique construit et vivant
    Ready(&'a ChartInstance),
    /// Construction échouée : bloc statique à la place
    Failed(ChartKind),
    /// Graphique détruit (ou jamais créé)
    Released,
}

/// Session de rendu
#[derive(Debug)]
pub struct RenderSession {
    /// Graphiques vivants, dans l'ordre de construction
    instances: Vec<ChartInstance>,

    /// Constructions différées (FIFO)
    pending: VecDeque<PendingChart>,

    /// Emplacements dont la construction a échoué
    failures: HashMap<String, ChartKind>,

    /// Horizon sélectionné pour les prochains messages
    pub timeframe: Timeframe,

    /// Compteur pour générer des identifiants de canvas uniques
    next_id: u64,

    delay: Duration,
}

impl RenderSession {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            instances: Vec::new(),
            pending: VecDeque::new(),
            failures: HashMap::new(),
            timeframe,
            next_id: 0,
            delay: CHART_DELAY,
        }
    }

    /// Génère un identifiant de canvas unique ("chart-3", "stock-chart-4", ...)
    pub fn canvas_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Planifie la construction d'un graphique et renvoie son conteneur
    pub fn schedule(
        &mut self,
        canvas_id: String,
        title: Option<&str>,
        spec: ChartSpec,
        now: Instant,
    ) -> ChartContainer {
        let container = ChartContainer {
            canvas_id,
            title: title.map(str::to_string),
            kind: spec.kind(),
        };

        debug!(canvas = %container.canvas_id, kind = ?container.kind, "Graphique planifié");

        self.pending.push_back(PendingChart {
            container: container.clone(),
            spec,
            ready_at: now + self.delay,
        });

        container
    }

    /// Construit immédiatement un graphique (jauges de l'en-tête)
    pub fn build_now(&mut self, canvas_id: &str, title: Option<&str>, spec: &ChartSpec) -> ChartContainer {
        let kind = spec.kind();
        match spec.build(canvas_id, title) {
            Ok(instance) => self.register(instance),
            Err(e) => self.record_failure(canvas_id, kind, &e),
        }

        ChartContainer {
            canvas_id: canvas_id.to_string(),
            title: title.map(str::to_string),
            kind,
        }
    }

    /// Construit tous les graphiques dont le délai est écoulé, dans l'ordre FIFO
    ///
    /// Retourne le nombre de graphiques traités (construits ou échoués).
    pub fn mount_due(&mut self, now: Instant) -> usize {
        let mut mounted = 0;

        while let Some(front) = self.pending.front() {
            if front.ready_at > now {
                break;
            }

            let Some(pending) = self.pending.pop_front() else {
                break;
            };
            let container = pending.container;

            match pending.spec.build(&container.canvas_id, container.title.as_deref()) {
                Ok(instance) => self.register(instance),
                Err(e) => self.record_failure(&container.canvas_id, container.kind, &e),
            }
            mounted += 1;
        }

        mounted
    }

    /// Enregistre un graphique construit
    ///
    /// Tout graphique existant sur le même canvas est détruit avant :
    /// jamais deux instances pour un même identifiant.
    pub fn register(&mut self, instance: ChartInstance) {
        self.destroy(&instance.canvas_id);
        self.failures.remove(&instance.canvas_id);
        debug!(canvas = %instance.canvas_id, "Graphique construit");
        self.instances.push(instance);
    }

    /// Détruit le graphique d'un canvas, s'il existe
    pub fn destroy(&mut self, canvas_id: &str) -> bool {
        let before = self.instances.len();
        self.instances.retain(|i| i.canvas_id != canvas_id);
        before != self.instances.len()
    }

    /// Détruit tous les graphiques du fil de discussion
    ///
    /// Les deux jauges de l'en-tête sont conservées. Les constructions
    /// encore en attente ne sont pas annulées.
    pub fn destroy_transcript_charts(&mut self) -> usize {
        let before = self.instances.len();
        self.instances.retain(|i| is_header_canvas(&i.canvas_id));
        let destroyed = before - self.instances.len();
        debug!(destroyed, "Graphiques du fil détruits");
        destroyed
    }

    fn record_failure(&mut self, canvas_id: &str, kind: ChartKind, error: &anyhow::Error) {
        warn!(canvas = %canvas_id, error = %error, "Construction du graphique impossible");
        self.destroy(canvas_id);
        self.failures.insert(canvas_id.to_string(), kind);
    }

    /// État d'un emplacement
    pub fn slot(&self, canvas_id: &str) -> Slot<'_> {
        if let Some(instance) = self.instances.iter().find(|i| i.canvas_id == canvas_id) {
            return Slot::Ready(instance);
        }
        if let Some(kind) = self.failures.get(canvas_id) {
            return Slot::Failed(*kind);
        }
        if self.pending.iter().any(|p| p.container.canvas_id == canvas_id) {
            return Slot::Pending;
        }
        Slot::Released
    }

    /// Nombre d'instances vivantes pour un canvas (0 ou 1)
    pub fn live_count(&self, canvas_id: &str) -> usize {
        self.instances.iter().filter(|i| i.canvas_id == canvas_id).count()
    }

    pub fn live_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Prochaine échéance de construction (pour raccourcir l'attente d'événements)
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.ready_at)
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(Timeframe::default())
    }
}

fn is_header_canvas(canvas_id: &str) -> bool {
    canvas_id == RISK_GAUGE_CANVAS || canvas_id == VOLATILITY_GAUGE_CANVAS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesData;
    use crate::render::charts::GaugeSpec;

    fn bar_spec() -> ChartSpec {
        ChartSpec::Bar(SeriesData {
            labels: vec!["A".to_string()],
            values: vec![61.0],
            colors: Vec::new(),
        })
    }

    #[test]
    fn test_schedule_defers_construction() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let id = session.canvas_id("chart");
        let container = session.schedule(id.clone(), None, bar_spec(), now);

        assert_eq!(session.slot(&container.canvas_id), Slot::Pending);
        assert_eq!(session.mount_due(now + Duration::from_millis(50)), 0);
        assert_eq!(session.mount_due(now + CHART_DELAY), 1);
        assert!(matches!(session.slot(&id), Slot::Ready(_)));
    }

    #[test]
    fn test_mount_is_fifo() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let first = session.canvas_id("chart");
        let second = session.canvas_id("chart");
        session.schedule(first.clone(), None, bar_spec(), now);
        session.schedule(second.clone(), None, bar_spec(), now + Duration::from_millis(10));

        assert_eq!(session.mount_due(now + CHART_DELAY), 1);
        assert!(matches!(session.slot(&first), Slot::Ready(_)));
        assert_eq!(session.slot(&second), Slot::Pending);
        assert_eq!(session.next_deadline(), Some(now + Duration::from_millis(110)));
    }

    #[test]
    fn test_failure_becomes_placeholder() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let bad = ChartSpec::Bar(SeriesData {
            labels: vec!["A".to_string(), "B".to_string()],
            values: vec![1.0],
            colors: Vec::new(),
        });
        session.schedule("chart-x".to_string(), None, bad, now);
        session.schedule("chart-y".to_string(), None, bar_spec(), now);
        session.mount_due(now + CHART_DELAY);

        assert_eq!(session.slot("chart-x"), Slot::Failed(ChartKind::Bar));
        assert!(matches!(session.slot("chart-y"), Slot::Ready(_)));
    }

    #[test]
    fn test_register_replaces_same_canvas() {
        let mut session = RenderSession::default();
        let spec = ChartSpec::Gauge(GaugeSpec::new(18, 30, 60.0, "Sûrs", "Risqués").unwrap());

        session.build_now(RISK_GAUGE_CANVAS, None, &spec);
        session.build_now(RISK_GAUGE_CANVAS, None, &spec);

        assert_eq!(session.live_count(RISK_GAUGE_CANVAS), 1);
        assert_eq!(session.live_instances(), 1);
    }

    #[test]
    fn test_destroy_transcript_keeps_header_gauges() {
        let mut session = RenderSession::default();
        let now = Instant::now();
        let spec = ChartSpec::Gauge(GaugeSpec::new(5, 30, 10.0, "Sûrs", "Risqués").unwrap());
        session.build_now(RISK_GAUGE_CANVAS, None, &spec);
        session.schedule("chart-1".to_string(), None, bar_spec(), now);
        session.mount_due(now + CHART_DELAY);
        assert_eq!(session.live_instances(), 2);

        assert_eq!(session.destroy_transcript_charts(), 1);
        assert_eq!(session.slot("chart-1"), Slot::Released);
        assert!(matches!(session.slot(RISK_GAUGE_CANVAS), Slot::Ready(_)));
    }
}
