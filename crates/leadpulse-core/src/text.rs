//! Label folding shared by header matching, status parsing, and the
//! metric vocabulary.

/// Trims, lower-cases, and strips Portuguese diacritics so that
/// `"Observações"`, `"observacoes "` and `"OBSERVAÇÕES"` compare equal.
#[must_use]
pub fn fold_label(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_label_strips_accents_and_case() {
        assert_eq!(fold_label("  Observações "), "observacoes");
        assert_eq!(fold_label("CONEXÕES REALIZADAS"), "conexoes realizadas");
    }

    #[test]
    fn fold_label_strips_bom() {
        assert_eq!(fold_label("\u{feff}Nome"), "nome");
    }

    #[test]
    fn fold_label_is_idempotent() {
        let once = fold_label("Reunião Agendada");
        assert_eq!(fold_label(&once), once);
    }
}
