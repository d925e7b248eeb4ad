//! Naming helpers shared by schemas, routes and storage
//!
//! Labels, slugs and table names are all derived from declared identifiers.

use heck::{ToKebabCase, ToSnakeCase, ToTitleCase};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Humanize an identifier for display (`display_order` -> `Display Order`)
pub fn humanize(name: &str) -> String {
    name.to_title_case()
}

/// Derive a URL-safe slug from free text (`Hello, World!` -> `hello-world`)
///
/// Accented Latin letters are folded to ASCII (`Crème brûlée` ->
/// `creme-brulee`). Only ASCII letters and digits survive; every other run
/// of characters becomes a single dash.
pub fn parameterize(text: &str) -> String {
    let cleaned: String = transliterate(text)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.to_kebab_case()
}

/// Fold Latin letters to ASCII: strip combining accents, expand ligatures
fn transliterate(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());

    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'Æ' => folded.push_str("AE"),
            'œ' => folded.push_str("oe"),
            'Œ' => folded.push_str("OE"),
            'ø' => folded.push('o'),
            'Ø' => folded.push('O'),
            'đ' | 'ð' => folded.push('d'),
            'Đ' | 'Ð' => folded.push('D'),
            'ł' => folded.push('l'),
            'Ł' => folded.push('L'),
            'þ' => folded.push_str("th"),
            'Þ' => folded.push_str("TH"),
            other => folded.push(other),
        }
    }

    folded
}

/// Pluralize a snake_case word for table names
pub fn pluralize(word: &str) -> String {
    let snake = word.to_snake_case();

    if snake.is_empty() || snake.ends_with('s') {
        snake
    } else if snake.ends_with('x') || snake.ends_with("ch") || snake.ends_with("sh") {
        format!("{}es", snake)
    } else if snake.ends_with('y')
        && !snake.ends_with("ey")
        && !snake.ends_with("ay")
        && !snake.ends_with("oy")
    {
        format!("{}ies", &snake[..snake.len() - 1])
    } else {
        format!("{}s", snake)
    }
}

/// Singularize a snake_case word for route names
pub fn singularize(word: &str) -> String {
    let snake = word.to_snake_case();

    if let Some(stem) = snake.strip_suffix("ies") {
        format!("{}y", stem)
    } else if snake.ends_with("ches") || snake.ends_with("shes") || snake.ends_with("xes") {
        snake[..snake.len() - 2].to_string()
    } else if snake.ends_with("ss") {
        snake
    } else if let Some(stem) = snake.strip_suffix('s') {
        stem.to_string()
    } else {
        snake
    }
}

/// Check if a string is a valid field identifier
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    // First character must be letter or underscore
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check if a string is a valid slug (lowercase letters, digits, dashes/underscores)
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("display_order"), "Display Order");
        assert_eq!(humanize("question"), "Question");
    }

    #[test]
    fn test_parameterize() {
        assert_eq!(parameterize("Hello World"), "hello-world");
        assert_eq!(parameterize("  Hello,   World! "), "hello-world");
        assert_eq!(parameterize("Rust & Ruby: 2025 edition"), "rust-ruby-2025-edition");
        assert_eq!(parameterize("Crème brûlée"), "creme-brulee");
        assert_eq!(parameterize("Straße in Łódź"), "strasse-in-lodz");
        assert_eq!(parameterize("Smørrebrød 日本"), "smorrebrod");
        assert_eq!(parameterize("!!!"), "");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("blog"), "blogs");
        assert_eq!(pluralize("faqs"), "faqs");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("TeamMember"), "team_members");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("products"), "product");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("team"), "team");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("address"), "address");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("vendor_ids"));
        assert!(is_valid_identifier("_private"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("with-dash"));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("team-members"));
        assert!(is_valid_slug("faqs"));
        assert!(!is_valid_slug("Team"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-blog"));
    }
}
