/// Case-insensitive substring match on names.
///
/// SQLite's `LIKE` and `NOCASE` only fold ASCII, so "CAFÉ" would miss
/// "Café". Matching is done on Unicode-lowercased text instead. An empty
/// term matches every name, and `%`/`_` have no special meaning.
#[derive(Debug, Clone)]
pub struct NameSearch {
    folded: String,
}

impl NameSearch {
    pub fn new(term: &str) -> Self {
        Self {
            folded: term.to_lowercase(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.folded.is_empty() || name.to_lowercase().contains(&self.folded)
    }

    /// Keeps the rows whose name matches, preserving their order.
    pub fn filter<T>(&self, rows: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
        rows.into_iter().filter(|row| self.matches(name(row))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_case() {
        let search = NameSearch::new("hop");
        assert!(search.matches("The Musical Hop"));
        assert!(!search.matches("The Dueling Pianos Bar"));
    }

    #[test]
    fn test_matches_folds_non_ascii() {
        assert!(NameSearch::new("élan").matches("Café Élan"));
        assert!(NameSearch::new("CAFÉ").matches("Café Élan"));
        assert!(NameSearch::new("STRASSE").matches("Konzerthaus Strasse"));
    }

    #[test]
    fn test_wildcards_are_literal() {
        assert!(!NameSearch::new("%").matches("The Musical Hop"));
        assert!(NameSearch::new("100%").matches("100% Jazz"));
        assert!(!NameSearch::new("_op").matches("The Musical Hop"));
    }

    #[test]
    fn test_empty_term_matches_everything() {
        assert!(NameSearch::new("").matches("anything"));
    }
}
