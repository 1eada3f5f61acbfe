//! Header normalization and canonical column resolution.
//!
//! Imported spreadsheets label the same data many ways (`Quadra`, `QD.`,
//! `Valor do Imóvel (R$)`). Each canonical field carries an ordered alias
//! list; [`resolve_columns`] matches normalized input headers against
//! normalized aliases, first alias wins. The original header text of each
//! resolved field is recorded in an [`ImportSession`] so exports can restore
//! the operator's own column names.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// The fixed internal fields of the canonical lot table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    Stage,
    Block,
    Unit,
    CashPrice,
    DownPayment,
}

impl CanonicalField {
    /// Canonical column order: `ETAPA, BLOCO, UNIDADE, VALOR_A_VISTA, ENTRADA`.
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Stage,
        CanonicalField::Block,
        CanonicalField::Unit,
        CanonicalField::CashPrice,
        CanonicalField::DownPayment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Stage => "ETAPA",
            CanonicalField::Block => "BLOCO",
            CanonicalField::Unit => "UNIDADE",
            CanonicalField::CashPrice => "VALOR_A_VISTA",
            CanonicalField::DownPayment => "ENTRADA",
        }
    }

    /// Recognized alias spellings, scanned in declared order; the first alias
    /// whose normalized form matches an input header wins.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Stage => &["ETAPA", "FASE"],
            CanonicalField::Block => &["BLOCO", "QUADRA", "QD"],
            CanonicalField::Unit => &["UNIDADE", "LOTE", "LT", "NUMERO DO LOTE"],
            CanonicalField::CashPrice => &[
                "VALOR A VISTA",
                "VALOR_A_VISTA",
                "VALOR DO IMOVEL",
                "VALOR DO LOTE",
                "VALOR TOTAL",
                "PRECO",
                "PRECO A VISTA",
            ],
            CanonicalField::DownPayment => &["ENTRADA", "SINAL", "ATO", "VALOR DE ENTRADA"],
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            CanonicalField::Block | CanonicalField::Unit | CanonicalField::CashPrice
        )
    }
}

/// Per-import registry of which original header each canonical field was
/// resolved from. Threaded explicitly through loader and export calls; one
/// session per import, never shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    resolved: BTreeMap<CanonicalField, String>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all recorded headers. Called at the start of a primary import.
    pub fn reset(&mut self) {
        self.resolved.clear();
    }

    /// The original header a field was resolved from, if any.
    pub fn original_header(&self, field: CanonicalField) -> Option<&str> {
        self.resolved.get(&field).map(String::as_str)
    }

    fn record(&mut self, field: CanonicalField, original: &str) {
        self.resolved.insert(field, original.to_string());
    }
}

/// A canonical field resolved to a concrete input column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatch {
    pub field: CanonicalField,
    pub index: usize,
    pub original: String,
}

fn parenthesized_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").expect("valid regex"))
}

fn date_like_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b").expect("valid regex"))
}

/// Produces the normalization key used for alias lookup.
///
/// Strips parenthesized suffixes and day/month/year date fragments, folds
/// accents, turns underscores into spaces, drops stray periods, and
/// uppercases. The result is a lookup key, never a display value.
pub fn normalize_header(raw: &str) -> String {
    let without_parens = parenthesized_re().replace_all(raw, " ");
    let without_dates = date_like_re().replace_all(&without_parens, " ");
    let folded = strip_accents(&without_dates)
        .replace('_', " ")
        .replace('.', "");
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Resolves input headers to canonical fields.
///
/// For each canonical field the alias list is scanned in declared order and
/// the first alias whose normalized form matches a normalized input header
/// wins. Two input headers that normalize identically tie-break to whichever
/// appears first in column order. Fields with no matching alias are simply
/// absent from the result; required-field enforcement happens in the loader.
///
/// On a merge import only `UNIDADE` and `ENTRADA` resolutions are recorded
/// into the session, so the primary table's recorded headers survive.
pub fn resolve_columns(
    headers: &[String],
    session: &mut ImportSession,
    is_merge: bool,
) -> Vec<ColumnMatch> {
    let mut by_key: BTreeMap<String, (usize, &String)> = BTreeMap::new();
    for (index, header) in headers.iter().enumerate() {
        by_key.entry(normalize_header(header)).or_insert((index, header));
    }

    let mut matches = Vec::new();
    for field in CanonicalField::ALL {
        for alias in field.aliases() {
            if let Some(&(index, original)) = by_key.get(&normalize_header(alias)) {
                let record_into_session = !is_merge
                    || matches!(field, CanonicalField::Unit | CanonicalField::DownPayment);
                if record_into_session {
                    session.record(field, original);
                }
                matches.push(ColumnMatch {
                    field,
                    index,
                    original: original.clone(),
                });
                break;
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_header_strips_accents_and_underscores() {
        assert_eq!(normalize_header("Valor do Imóvel"), "VALOR DO IMOVEL");
        assert_eq!(normalize_header("VALOR_DO_IMOVEL"), "VALOR DO IMOVEL");
        assert_eq!(
            normalize_header("Valor do Imóvel (R$)"),
            normalize_header("VALOR_DO_IMOVEL")
        );
    }

    #[test]
    fn normalize_header_strips_parenthesized_and_date_fragments() {
        assert_eq!(normalize_header("Etapa (opcional)"), "ETAPA");
        assert_eq!(normalize_header("Entrada 01/06/2024"), "ENTRADA");
        assert_eq!(normalize_header("Preço 1-6-24 à vista"), "PRECO A VISTA");
    }

    #[test]
    fn normalize_header_drops_stray_periods() {
        assert_eq!(normalize_header("QD."), "QD");
    }

    #[test]
    fn resolve_columns_maps_aliases_to_canonical_fields() {
        let mut session = ImportSession::new();
        let input = headers(&["Quadra", "Lote", "Valor do Imóvel (R$)", "Sinal"]);
        let matches = resolve_columns(&input, &mut session, false);

        let fields: Vec<_> = matches.iter().map(|m| m.field).collect();
        assert_eq!(
            fields,
            vec![
                CanonicalField::Block,
                CanonicalField::Unit,
                CanonicalField::CashPrice,
                CanonicalField::DownPayment,
            ]
        );
        assert_eq!(
            session.original_header(CanonicalField::CashPrice),
            Some("Valor do Imóvel (R$)")
        );
    }

    #[test]
    fn resolve_columns_prefers_earlier_alias_in_declared_order() {
        let mut session = ImportSession::new();
        // Both headers resolve to VALOR_A_VISTA; "VALOR TOTAL" comes before
        // "PRECO" in the alias list, so it wins even though the PRECO header
        // is the first column.
        let input = headers(&["Preço", "Valor Total"]);
        let matches = resolve_columns(&input, &mut session, false);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].original, "Valor Total");
    }

    #[test]
    fn resolve_columns_ties_break_to_first_input_column() {
        let mut session = ImportSession::new();
        let input = headers(&["Unidade", "UNIDADE "]);
        let matches = resolve_columns(&input, &mut session, false);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 0);
        assert_eq!(matches[0].original, "Unidade");
    }

    #[test]
    fn merge_resolution_only_records_unit_and_down_payment() {
        let mut session = ImportSession::new();
        resolve_columns(
            &headers(&["Bloco", "Unidade", "Valor a Vista"]),
            &mut session,
            false,
        );
        assert_eq!(session.original_header(CanonicalField::Block), Some("Bloco"));

        // The merge sheet renames everything in its own working table, but
        // only UNIDADE/ENTRADA land in the shared session.
        resolve_columns(&headers(&["Quadra", "LOTE", "Sinal"]), &mut session, true);
        assert_eq!(session.original_header(CanonicalField::Block), Some("Bloco"));
        assert_eq!(session.original_header(CanonicalField::Unit), Some("LOTE"));
        assert_eq!(
            session.original_header(CanonicalField::DownPayment),
            Some("Sinal")
        );
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let mut session = ImportSession::new();
        let input = headers(&["Observações", "Corretor"]);
        assert!(resolve_columns(&input, &mut session, false).is_empty());
    }
}
