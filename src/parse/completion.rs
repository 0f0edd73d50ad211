//! Italian free-text completion time parser.
//!
//! `platinum_date` holds values like "2 ORE, 30 MINUTI", "163 GIORNI" or
//! "Platinato in: 3 MESI, 10 GIORNI (PS4)", and compilation entries carry a
//! three-part "(CB1) … (CB2) … (CB3)" compound where only the middle game
//! counts. Parsing yields a total in minutes for ranking plus a canonical
//! display string.

use std::sync::OnceLock;

use regex::Regex;

/// A successfully parsed completion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCompletion {
    /// Normalized total (1 year = 365 days, 1 month = 30 days)
    pub total_minutes: i64,

    /// Canonical rendering of the matched components
    pub display: String,

    /// The input text, untouched
    pub original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl Unit {
    fn minutes(self) -> i64 {
        match self {
            Unit::Year => 365 * 24 * 60,
            Unit::Month => 30 * 24 * 60,
            Unit::Day => 24 * 60,
            Unit::Hour => 60,
            Unit::Minute => 1,
        }
    }

    fn word(self, count: i64) -> &'static str {
        match (self, count) {
            (Unit::Year, 1) => "ANNO",
            (Unit::Year, _) => "ANNI",
            (Unit::Month, 1) => "MESE",
            (Unit::Month, _) => "MESI",
            (Unit::Day, 1) => "GIORNO",
            (Unit::Day, _) => "GIORNI",
            (Unit::Hour, 1) => "ORA",
            (Unit::Hour, _) => "ORE",
            (Unit::Minute, 1) => "MINUTO",
            (Unit::Minute, _) => "MINUTI",
        }
    }
}

/// One entry of the pattern cascade. Capture groups map 1:1 onto `units`.
struct DurationPattern {
    regex: Regex,
    units: &'static [Unit],
}

fn pattern(re: &str, units: &'static [Unit]) -> DurationPattern {
    DurationPattern {
        regex: Regex::new(&format!("(?i)^{}$", re)).unwrap(),
        units,
    }
}

/// The cascade is tried top to bottom and the first match wins. The order
/// is load-bearing: the patterns overlap, and in particular the singular
/// "GIORNO … MINUTI" form must be tried before the general "GIORNI … ORE"
/// form. Do not rearrange.
fn cascade() -> &'static [DurationPattern] {
    static CASCADE: OnceLock<Vec<DurationPattern>> = OnceLock::new();
    CASCADE.get_or_init(|| {
        vec![
            pattern(
                r"(\d+)\s*OR[EA](?:\s*,\s*(\d+)\s*MINUT[OI])?",
                &[Unit::Hour, Unit::Minute],
            ),
            pattern(
                r"(\d+)\s*GIORNO(?:\s*,\s*(\d+)\s*MINUT[OI])?",
                &[Unit::Day, Unit::Minute],
            ),
            pattern(
                r"(\d+)\s*GIORNI(?:\s*,\s*(\d+)\s*OR[EA])?",
                &[Unit::Day, Unit::Hour],
            ),
            pattern(
                r"(\d+)\s*ANN[OI](?:\s*,\s*(\d+)\s*MES[EI])?(?:\s*,\s*(\d+)\s*GIORN[OI])?",
                &[Unit::Year, Unit::Month, Unit::Day],
            ),
            pattern(
                r"(\d+)\s*MES[EI](?:\s*,\s*(\d+)\s*GIORN[OI])?",
                &[Unit::Month, Unit::Day],
            ),
            pattern(
                r"(\d+)\s*ANN[OI]\s*,\s*(\d+)\s*MES[EI]",
                &[Unit::Year, Unit::Month],
            ),
            pattern(r"(\d+)\s*GIORN[OI]", &[Unit::Day]),
        ]
    })
}

fn re_compound_middle() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\(CB1\)(.*)\(CB3\)").unwrap())
}

fn re_days_hours() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*GIORNI\s*,\s*(\d+)\s*ORE").unwrap())
}

fn re_compound_tail() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\(CB2\)(.*)$").unwrap())
}

fn re_parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

/// Parse a free-text completion time. Returns `None` when nothing matches;
/// callers treat that as "no completion time recorded", not as an error.
pub fn parse_completion(text: &str) -> Option<ParsedCompletion> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Compound compilation entries: only the middle game counts.
    if trimmed.to_uppercase().contains("(CB2)") {
        if let Some((total_minutes, display)) = parse_compound(trimmed) {
            return Some(ParsedCompletion {
                total_minutes,
                display,
                original: text.to_string(),
            });
        }
    }

    let (total_minutes, display) = parse_normal(trimmed)?;
    Some(ParsedCompletion {
        total_minutes,
        display,
        original: text.to_string(),
    })
}

/// Handle the "(CB1) … (CB2) … (CB3)" compound form: prefer a
/// "days GIORNI, hours ORE" match inside the CB1–CB3 span, then fall back
/// to parsing whatever follows the (CB2) marker.
fn parse_compound(text: &str) -> Option<(i64, String)> {
    if let Some(caps) = re_compound_middle().captures(text) {
        let middle = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if let Some(dh) = re_days_hours().captures(middle) {
            let days: i64 = dh[1].parse().ok()?;
            let hours: i64 = dh[2].parse().ok()?;
            let display = format!(
                "{} (CB2)",
                format_components(&[(days, Unit::Day), (hours, Unit::Hour)])
            );
            return Some((days * Unit::Day.minutes() + hours * Unit::Hour.minutes(), display));
        }
    }

    if let Some(caps) = re_compound_tail().captures(text) {
        let tail = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim();
        if let Some((minutes, display)) = parse_normal(tail) {
            return Some((minutes, format!("{} (CB2)", display)));
        }
    }

    None
}

/// Strip the label prefix and parenthetical annotations, then run the
/// pattern cascade.
fn parse_normal(text: &str) -> Option<(i64, String)> {
    // "Platinato/Masterato in: …" and similar labels
    let text = match text.find(':') {
        Some(idx) => &text[idx + 1..],
        None => text,
    };

    // Annotations like "(PS4)" or "(seconda run)"
    let cleaned = re_parenthetical().replace_all(text, " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    for pattern in cascade() {
        if let Some(caps) = pattern.regex.captures(&cleaned) {
            let components: Vec<(i64, Unit)> = pattern
                .units
                .iter()
                .enumerate()
                .map(|(i, unit)| {
                    let count = caps
                        .get(i + 1)
                        .and_then(|m| m.as_str().parse::<i64>().ok())
                        .unwrap_or(0);
                    (count, *unit)
                })
                .collect();

            let total = components.iter().map(|(c, u)| c * u.minutes()).sum();
            return Some((total, format_components(&components)));
        }
    }

    None
}

/// Render the non-zero components in pattern order, singular for count 1.
fn format_components(components: &[(i64, Unit)]) -> String {
    let parts: Vec<String> = components
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, unit)| format!("{} {}", count, unit.word(*count)))
        .collect();

    if parts.is_empty() {
        // Everything was zero; show the leading component rather than nothing.
        let (count, unit) = components[0];
        return format!("{} {}", count, unit.word(count));
    }

    parts.join(", ")
}
