use crate::error::CatalogError;
use regex::Regex;

/// Case-insensitive glob over entry names and coordinates.
///
/// `*` and `?` are wildcards; a pattern without any is matched as `*pattern*`.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Result<Self, CatalogError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::Pattern(
                "Filter pattern cannot be empty".to_string(),
            ));
        }

        let adjusted = if trimmed.contains(['*', '?']) {
            trimmed.to_string()
        } else {
            format!("*{}*", trimmed)
        };

        let regex = Self::compile_glob(&adjusted)?;
        Ok(Self { regex })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// True when any of `values` matches.
    pub fn matches_any<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> bool {
        values.into_iter().any(|value| self.matches(value))
    }

    fn compile_glob(pattern: &str) -> Result<Regex, CatalogError> {
        let mut regex = String::from("(?i)^");
        for ch in pattern.chars() {
            match ch {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                    regex.push('\\');
                    regex.push(ch);
                }
                _ => regex.push(ch),
            }
        }
        regex.push('$');

        Regex::new(&regex)
            .map_err(|e| CatalogError::Pattern(format!("'{}': {}", pattern, e)))
    }
}
