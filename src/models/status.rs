//! Completion status vocabulary.

/// Known status labels. The field is free text, so this list is advisory
/// (UI dropdowns, documentation) rather than a constraint.
pub const KNOWN_STATUSES: [&str; 10] = [
    "Masterato/Platinato",
    "Completato (100%)",
    "Finito",
    "In Pausa",
    "In Corso",
    "Droppato",
    "Archiviato",
    "Online/Senza Fine",
    "Da Recuperare",
    "Da Rigiocare",
];

/// Whether a status label counts as full completion (platinum trophy or
/// RetroAchievements mastery). Matched loosely since the label is free text.
pub fn is_full_completion(status: &str) -> bool {
    let lower = status.to_lowercase();
    lower.contains("platinato") || lower.contains("masterato")
}
