//! Destination patterns with `{variable}` segments.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A slash-separated destination pattern such as `chat/{chatId}/send`.
///
/// ```
/// use relay_chats::utils::DestinationPattern;
///
/// let pattern = DestinationPattern::parse("chat/{chatId}/send");
/// let vars = pattern.matches("/chat/42/send").unwrap();
/// assert_eq!(vars.get("chatId"), Some("42"));
/// assert!(pattern.matches("chat/42/typing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl DestinationPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split(pattern)
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Variable(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a concrete destination, extracting path variables on success.
    pub fn matches(&self, destination: &str) -> Option<PathVariables> {
        let parts: Vec<&str> = split(destination).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut variables = PathVariables::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Variable(name) => {
                    variables.0.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(variables)
    }
}

/// Values captured by a matched pattern.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathVariables(HashMap<String, String>);

impl PathVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_segments_must_match_exactly() {
        let pattern = DestinationPattern::parse("chat/{chatId}/typing");
        assert!(pattern.matches("chats/1/typing").is_none());
        assert!(pattern.matches("chat/1/typing/extra").is_none());
        assert!(pattern.matches("chat/typing").is_none());
    }

    #[test]
    fn multiple_variables_are_captured() {
        let pattern = DestinationPattern::parse("org/{orgId}/chat/{chatId}");
        let vars = pattern.matches("org/a/chat/b").unwrap();
        assert_eq!(vars.get("orgId"), Some("a"));
        assert_eq!(vars.get("chatId"), Some("b"));
        assert_eq!(vars.get("missing"), None);
    }
}
