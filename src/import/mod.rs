//! Bulk TSV import.
//!
//! The input is a spreadsheet export: a tab-separated header row followed by
//! one game per line. Header names are matched case-insensitively in both
//! Italian and English; unrecognized columns are dropped. A bad row records
//! an error and the batch carries on; a single typo never aborts an import.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::models::{GameDraft, PlatformInput, Section};
use crate::store::{GameStore, Result, StoreError};

/// Result of an import run.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Rows inserted successfully
    pub imported: usize,

    /// One message per failed row, in row order
    pub errors: Vec<String>,
}

impl ImportOutcome {
    /// The batch counts as successful when something was imported or there
    /// was nothing to complain about.
    pub fn is_success(&self) -> bool {
        self.imported > 0 || self.errors.is_empty()
    }
}

/// A parsed data row, or the reason it was rejected.
#[derive(Debug)]
pub struct RowOutcome {
    /// 1-based row number as a spreadsheet shows it (the header is row 1,
    /// so the first data row is row 2)
    pub row_number: usize,
    pub result: std::result::Result<GameDraft, String>,
}

/// Parse TSV bytes into per-row drafts. The bytes are decoded leniently;
/// exports from old spreadsheets are not always clean UTF-8.
pub fn parse_tsv(bytes: &[u8]) -> Vec<RowOutcome> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines();

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let columns = map_headers(header_line);

    let mut outcomes = Vec::new();
    let mut row_number = 1usize;

    for line in lines {
        row_number += 1;

        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() < 2 {
            continue; // skip empty rows
        }

        outcomes.push(RowOutcome {
            row_number,
            result: build_draft(&columns, &cells, row_number),
        });
    }

    outcomes
}

/// Map header cells onto canonical field names, case-insensitively, in
/// Italian or English. Unknown headers are silently ignored.
fn map_headers(header_line: &str) -> HashMap<&'static str, usize> {
    let mut columns = HashMap::new();

    for (index, header) in header_line.split('\t').enumerate() {
        let header = header.trim().to_lowercase();
        let field = match header.as_str() {
            "titolo" | "title" => "title",
            "piattaforma" | "platform" => "platform",
            "ore di gioco" | "playtime" => "playtime",
            "voto totale" | "total_score" => "total_score",
            "voto aesthetic" | "aesthetic_score" => "aesthetic_score",
            "voto ost" | "ost_score" => "ost_score",
            "difficoltà" | "difficulty" => "difficulty",
            "stato" | "status" => "status",
            "% trofei" | "trophy_percentage" => "trophy_percentage",
            "platino/masterato in" | "platinum_date" => "platinum_date",
            "replay completati" | "replays" => "replays",
            "prima volta giocato" | "first_played" => "first_played",
            "ultima volta finito" | "last_finished" => "last_finished",
            "recensione" | "review" => "review",
            "link copertina" | "cover_url" => "cover_url",
            _ => continue,
        };
        columns.insert(field, index);
    }

    columns
}

fn build_draft(
    columns: &HashMap<&'static str, usize>,
    cells: &[&str],
    row_number: usize,
) -> std::result::Result<GameDraft, String> {
    let cell = |field: &str| -> Option<String> {
        columns
            .get(field)
            .and_then(|&index| cells.get(index))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let Some(title) = cell("title") else {
        return Err(format!("Riga {}: Titolo mancante", row_number));
    };

    // Imports land in the played section.
    let mut draft = GameDraft::new(title, Section::Played);
    draft.platform = cell("platform").map(PlatformInput::One);
    draft.playtime = cell("playtime");
    draft.status = cell("status");
    draft.platinum_date = cell("platinum_date");
    draft.first_played = cell("first_played");
    draft.last_finished = cell("last_finished");
    draft.review = cell("review");
    draft.cover_url = cell("cover_url");
    draft.total_score = cell("total_score").and_then(|v| coerce_int(&v));
    draft.aesthetic_score = cell("aesthetic_score").and_then(|v| coerce_int(&v));
    draft.ost_score = cell("ost_score").and_then(|v| coerce_int(&v));
    draft.difficulty = cell("difficulty").and_then(|v| coerce_int(&v));
    draft.trophy_percentage = cell("trophy_percentage").and_then(|v| coerce_int(&v));
    draft.replays = cell("replays").and_then(|v| coerce_int(&v));

    Ok(draft)
}

/// Coerce a fully numeric cell to an integer (decimal values truncate).
/// Anything else is treated as absent.
fn coerce_int(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|f| f as i64))
}

/// The TSV importer. Parses the upload and inserts each valid row
/// individually through the store.
pub struct Importer<'a> {
    store: &'a GameStore,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a GameStore) -> Self {
        Self { store }
    }

    /// Run an import. Authorization is checked before a single byte is
    /// parsed; after that, per-row failures accumulate and never abort.
    pub async fn import(&self, auth: &AuthContext, bytes: &[u8]) -> Result<ImportOutcome> {
        if !auth.is_admin() {
            return Err(StoreError::Unauthorized);
        }

        let mut outcome = ImportOutcome::default();

        for row in parse_tsv(bytes) {
            match row.result {
                Ok(draft) => match self.store.add(auth, &draft).await {
                    Ok(_) => outcome.imported += 1,
                    Err(e) => {
                        warn!("Import row {} failed: {}", row.row_number, e);
                        outcome
                            .errors
                            .push(format!("Riga {}: {}", row.row_number, e));
                    }
                },
                Err(message) => outcome.errors.push(message),
            }
        }

        info!(
            "Import finished: {} imported, {} errors",
            outcome.imported,
            outcome.errors.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tsv(lines: &[&str]) -> Vec<u8> {
        lines.join("\n").into_bytes()
    }

    #[test]
    fn test_header_mapping_is_bilingual_and_case_insensitive() {
        let columns = map_headers("TITOLO\tPlatform\tVoto Totale\tboh\tDifficoltà");

        assert_eq!(columns.get("title"), Some(&0));
        assert_eq!(columns.get("platform"), Some(&1));
        assert_eq!(columns.get("total_score"), Some(&2));
        assert_eq!(columns.get("difficulty"), Some(&4));
        assert_eq!(columns.len(), 4); // "boh" dropped
    }

    #[test]
    fn test_first_data_row_is_row_two() {
        let rows = parse_tsv(&tsv(&["Titolo\tPiattaforma", "Okami\tPS2"]));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].result.as_ref().unwrap().title, "Okami");
    }

    #[test]
    fn test_missing_title_is_a_row_error() {
        let rows = parse_tsv(&tsv(&[
            "Titolo\tPiattaforma",
            "Okami\tPS2",
            "\tPS3",
            "Ico\tPS2",
        ]));

        assert_eq!(rows.len(), 3);
        assert!(rows[0].result.is_ok());
        assert_eq!(
            rows[1].result.as_ref().unwrap_err(),
            "Riga 3: Titolo mancante"
        );
        assert!(rows[2].result.is_ok());
    }

    #[test]
    fn test_short_rows_are_skipped_but_counted() {
        let rows = parse_tsv(&tsv(&[
            "Titolo\tPiattaforma",
            "",
            "solo-una-cella",
            "Okami\tPS2",
        ]));

        // The skipped rows still advance the counter.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 4);
    }

    #[test]
    fn test_numeric_coercion() {
        let rows = parse_tsv(&tsv(&[
            "Titolo\tVoto Totale\tDifficoltà\tReplay Completati",
            "Okami\t95\tsette\t1.9",
        ]));

        let draft = rows[0].result.as_ref().unwrap();
        assert_eq!(draft.total_score, Some(95));
        assert_eq!(draft.difficulty, None); // non-numeric, dropped
        assert_eq!(draft.replays, Some(1)); // decimal truncates
    }

    #[test]
    fn test_empty_cells_are_absent() {
        let rows = parse_tsv(&tsv(&[
            "Titolo\tStato\tOre di Gioco",
            "Okami\t  \t40 PS2",
        ]));

        let draft = rows[0].result.as_ref().unwrap();
        assert_eq!(draft.status, None);
        assert_eq!(draft.playtime, Some("40 PS2".to_string()));
    }

    #[test]
    fn test_lenient_decoding_of_invalid_utf8() {
        let mut bytes = b"Titolo\tStato\nOkami\tFinito".to_vec();
        bytes.push(0xFF);

        let rows = parse_tsv(&bytes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result.as_ref().unwrap().title, "Okami");
    }

    #[tokio::test]
    async fn test_import_end_to_end() {
        let store = GameStore::in_memory().await.unwrap();
        let admin = AuthContext::admin();

        let bytes = tsv(&[
            "Titolo\tPiattaforma\tVoto Totale",
            "Okami\tPS2, Fisico\t93",
            "\tPS3\t80",
            "Ico\tPS2\t88",
        ]);

        let outcome = Importer::new(&store)
            .import(&admin, &bytes)
            .await
            .unwrap();

        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.errors, vec!["Riga 3: Titolo mancante".to_string()]);
        assert!(outcome.is_success());

        let games = store.list(Section::Played, "title", "ASC").await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].title, "Ico");
        assert_eq!(games[1].platforms, vec!["PS2", "Fisico"]);
    }

    #[tokio::test]
    async fn test_import_requires_admin() {
        let store = GameStore::in_memory().await.unwrap();
        let outcome = Importer::new(&store)
            .import(&AuthContext::anonymous(), b"Titolo\nOkami")
            .await;

        assert!(matches!(outcome, Err(StoreError::Unauthorized)));
    }

    #[test]
    fn test_zero_rows_zero_errors_is_success() {
        let outcome = ImportOutcome::default();
        assert!(outcome.is_success());

        let failed = ImportOutcome {
            imported: 0,
            errors: vec!["Riga 2: Titolo mancante".to_string()],
        };
        assert!(!failed.is_success());
    }
}
