//! Replication idea generator
//!
//! Turns a spiking note into a short list of follow-up content
//! suggestions. Deterministic template cycling for now; a model-backed
//! generator can replace [`generate_ideas`] without touching callers.

use serde::Serialize;

/// Suggestion templates, cycled in order. `{}` receives the note title.
const IDEA_TEMPLATES: [&str; 3] = [
    "Remake \"{}\" with the same hook but a new example",
    "Film a behind-the-scenes follow-up to \"{}\"",
    "Turn \"{}\" into a 3-part series and link the posts",
];

/// Replication ideas for one note
#[derive(Debug, Clone, Serialize)]
pub struct NoteIdeas {
    /// Title of the note the ideas are derived from
    pub title: String,
    /// Numbered suggestions, in generation order
    pub suggestions: Vec<String>,
}

impl NoteIdeas {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Generate `count` numbered replication ideas for a note.
///
/// Ideas are numbered from 1 and cycle through the template set, so any
/// two ideas with different numbers differ as strings even past the
/// template count.
pub fn generate_ideas(title: &str, count: usize) -> NoteIdeas {
    let suggestions = (0..count)
        .map(|i| {
            let template = IDEA_TEMPLATES[i % IDEA_TEMPLATES.len()];
            format!("Idea {}: {}", i + 1, template.replace("{}", title))
        })
        .collect();

    NoteIdeas {
        title: title.to_string(),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_count() {
        let ideas = generate_ideas("Morning routine", 3);
        assert_eq!(ideas.title, "Morning routine");
        assert_eq!(ideas.suggestions.len(), 3);
    }

    #[test]
    fn test_ideas_are_numbered_and_mention_title() {
        let ideas = generate_ideas("Desk setup", 3);

        for (i, suggestion) in ideas.suggestions.iter().enumerate() {
            assert!(suggestion.starts_with(&format!("Idea {}:", i + 1)));
            assert!(suggestion.contains("Desk setup"));
        }
    }

    #[test]
    fn test_deterministic() {
        let first = generate_ideas("A", 5);
        let second = generate_ideas("A", 5);
        assert_eq!(first.suggestions, second.suggestions);
    }

    #[test]
    fn test_distinct_past_template_count() {
        let ideas = generate_ideas("A", 6);

        // Templates repeat after 3 but the numbering keeps every line unique
        let mut seen = std::collections::HashSet::new();
        for suggestion in &ideas.suggestions {
            assert!(seen.insert(suggestion.clone()));
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        let ideas = generate_ideas("A", 0);
        assert!(ideas.is_empty());
    }
}
