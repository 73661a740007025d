use chrono::NaiveDateTime;

use super::error::ValidationError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// A submitted form as flat key/value pairs, in submission order.
///
/// Keys may repeat (multi-select fields such as `genres`); single-valued
/// accessors read the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value, treating empty strings as absent.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.first(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, key: &'static str) -> Result<String, ValidationError> {
        self.optional(key)
            .ok_or(ValidationError::Missing { field: key })
    }

    /// Raw value used for user-facing messages, even when it failed validation.
    pub fn raw(&self, key: &str) -> &str {
        self.first(key).unwrap_or_default()
    }

    /// Checkbox semantics: absent means false.
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.first(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("y" | "yes" | "on" | "true" | "1")
        )
    }

    /// Every non-empty value submitted under `key`, deduplicated case-insensitively.
    pub fn all(&self, key: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for (_, value) in self.0.iter().filter(|(k, _)| k == key) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                values.push(value.to_string());
            }
        }
        values
    }

    pub fn required_all(&self, key: &'static str) -> Result<Vec<String>, ValidationError> {
        let values = self.all(key);
        if values.is_empty() {
            return Err(ValidationError::Missing { field: key });
        }
        Ok(values)
    }

    pub fn required_id(&self, key: &'static str) -> Result<i32, ValidationError> {
        self.required(key)?
            .parse()
            .map_err(|e: std::num::ParseIntError| ValidationError::Invalid {
                field: key,
                reason: e.to_string(),
            })
    }

    pub fn required_date_time(&self, key: &'static str) -> Result<NaiveDateTime, ValidationError> {
        let value = self.required(key)?;
        parse_date_time(&value).ok_or_else(|| ValidationError::Invalid {
            field: key,
            reason: format!("`{value}` is not a date and time"),
        })
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_required_rejects_missing_and_blank() {
        let data = form(&[("name", "   ")]);
        assert_eq!(
            data.required("name"),
            Err(ValidationError::Missing { field: "name" })
        );
        assert_eq!(
            data.required("city"),
            Err(ValidationError::Missing { field: "city" })
        );
    }

    #[test]
    fn test_required_trims() {
        let data = form(&[("name", "  The Musical Hop ")]);
        assert_eq!(data.required("name").unwrap(), "The Musical Hop");
    }

    #[test]
    fn test_all_dedups_repeated_keys() {
        let data = form(&[
            ("genres", "Jazz"),
            ("genres", "jazz"),
            ("genres", ""),
            ("genres", "Folk"),
        ]);
        assert_eq!(data.all("genres"), vec!["Jazz", "Folk"]);
        assert!(form(&[]).required_all("genres").is_err());
    }

    #[test]
    fn test_flag() {
        let data = form(&[("seeking_talent", "y"), ("seeking_venue", "false")]);
        assert!(data.flag("seeking_talent"));
        assert!(!data.flag("seeking_venue"));
        assert!(!data.flag("missing"));
    }

    #[test]
    fn test_required_id() {
        let data = form(&[("venue_id", "12"), ("artist_id", "twelve")]);
        assert_eq!(data.required_id("venue_id").unwrap(), 12);
        assert!(matches!(
            data.required_id("artist_id"),
            Err(ValidationError::Invalid {
                field: "artist_id",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_date_time_formats() {
        let expected = NaiveDateTime::parse_from_str("2035-04-01 20:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(parse_date_time("2035-04-01 20:00:00"), Some(expected));
        assert_eq!(parse_date_time("2035-04-01T20:00"), Some(expected));
        assert_eq!(parse_date_time("2035-04-01 20:00"), Some(expected));
        assert_eq!(parse_date_time("next tuesday"), None);
    }
}
