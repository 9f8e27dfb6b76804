// ============================================================================
// Fonctions pures de formatage
// ============================================================================
// Regroupement des milliers, pourcentages, seuils de couleur et règle de
// direction. Aucune dépendance au terminal : tout est testable isolément.
// ============================================================================

// ============================================================================
// Nombres
// ============================================================================

/// Pourcentage `value / total` formaté avec une décimale
///
/// Un total nul, négatif ou non fini donne exactement "0.0".
pub fn percent_of(value: f64, total: f64) -> String {
    if !total.is_finite() || total <= 0.0 || !value.is_finite() {
        return "0.0".to_string();
    }
    format!("{:.1}", value / total * 100.0)
}

/// Taux déjà exprimé en pourcentage : 60.0 → "60.0%"
pub fn rate_text(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Pourcentage signé : 5.0 → "+5.00%", -1.2 → "-1.20%"
pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Regroupe les milliers de la partie entière : 1234567.5 → "1,234,567.5"
///
/// Zéro, absent ou non fini → "0". Les décimales sont arrondies à 2 chiffres
/// et omises quand elles sont nulles.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }

    let rounded = (value.abs() * 100.0).round() / 100.0;
    let integer = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = match cents {
        0 => String::new(),
        c if c % 10 == 0 => format!(".{}", c / 10),
        c => format!(".{:02}", c),
    };

    let sign = if value < 0.0 && (integer > 0 || cents > 0) { "-" } else { "" };
    format!("{}{}{}", sign, grouped, fraction)
}

/// Montant en won : 71500 → "₩71,500"
pub fn won(amount: f64) -> String {
    let grouped = group_thousands(amount);
    match grouped.strip_prefix('-') {
        Some(abs) => format!("-₩{}", abs),
        None => format!("₩{}", grouped),
    }
}

/// Montant en won signé : 50000 → "+₩50,000"
pub fn signed_won(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+{}", won(amount))
    } else {
        won(amount)
    }
}

// ============================================================================
// Texte des messages
// ============================================================================

/// Fragment de texte d'un message du chatbot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
        }
    }

    fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
        }
    }
}

/// Découpe un message en lignes de segments
///
/// - `**texte**` → segment gras (correspondance non gourmande, sur une ligne)
/// - `\n` → nouvelle ligne
/// - Un `**` sans fermeture reste du texte brut
pub fn message_lines(text: &str) -> Vec<Vec<Segment>> {
    text.split('\n').map(parse_line).collect()
}

fn parse_line(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };

        if start > 0 {
            segments.push(Segment::plain(&rest[..start]));
        }
        segments.push(Segment::bold(&after[..end]));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::plain(rest));
    }

    segments
}

// ============================================================================
// Seuils de couleur
// ============================================================================

/// Palette des jauges de sécurité (taux en pourcentage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeTone {
    /// ≥ 50 %
    Safe,
    /// ≥ 30 %
    Caution,
    /// < 30 %
    Danger,
}

impl GaugeTone {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 50.0 {
            GaugeTone::Safe
        } else if rate >= 30.0 {
            GaugeTone::Caution
        } else {
            GaugeTone::Danger
        }
    }

    /// Couleur de l'arc "sûr"
    pub fn fill_hex(&self) -> &'static str {
        match self {
            GaugeTone::Safe => "#4caf50",
            GaugeTone::Caution => "#ff9800",
            GaugeTone::Danger => "#f44336",
        }
    }

    /// Couleur de l'arc "risqué"
    pub fn track_hex(&self) -> &'static str {
        match self {
            GaugeTone::Safe => "#e0e0e0",
            GaugeTone::Caution => "#ffccbc",
            GaugeTone::Danger => "#ffebee",
        }
    }
}

/// Niveau d'une probabilité de hausse (barres, mini donuts, barres de progression)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityTier {
    /// ≥ 60 %
    High,
    /// ≥ 50 %
    Medium,
    /// < 50 %
    Low,
}

impl ProbabilityTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 60.0 {
            ProbabilityTier::High
        } else if probability >= 50.0 {
            ProbabilityTier::Medium
        } else {
            ProbabilityTier::Low
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ProbabilityTier::High => "#4caf50",
            ProbabilityTier::Medium => "#ff9800",
            ProbabilityTier::Low => "#f44336",
        }
    }

    /// Commentaire associé au niveau
    pub fn caption(&self) -> &'static str {
        match self {
            ProbabilityTier::High => "✨ Forte hausse attendue",
            ProbabilityTier::Medium => "⚡ Hausse modérée attendue",
            ProbabilityTier::Low => "⚠️ Faible hausse attendue",
        }
    }
}

/// Couleur de bordure d'une carte inline selon le risque (0.0 ~ 1.0)
pub fn risk_border_hex(risk: f64) -> &'static str {
    if risk <= 0.3 {
        "#4caf50"
    } else if risk <= 0.7 {
        "#ff9800"
    } else {
        "#f44336"
    }
}

/// Convertit "#rrggbb" en triplet RGB
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

// ============================================================================
// Direction
// ============================================================================

/// Direction affichée sur une carte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "📈 Hausse",
            Direction::Down => "📉 Baisse",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Direction::Up => "#4caf50",
            Direction::Down => "#f44336",
        }
    }
}

/// Règle de direction
///
/// - direction == 1 → hausse
/// - sinon, probabilité de direction < 0.5 → hausse
/// - sinon → baisse
///
/// Une probabilité absente ou nulle vaut 0.5.
pub fn direction_of(direction: Option<i64>, direction_probability: Option<f64>) -> Direction {
    if direction == Some(1) {
        return Direction::Up;
    }

    let probability = match direction_probability {
        Some(p) if p != 0.0 && p.is_finite() => p,
        _ => 0.5,
    };

    if probability < 0.5 {
        Direction::Up
    } else {
        Direction::Down
    }
}
