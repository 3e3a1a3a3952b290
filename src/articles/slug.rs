use sqlx::PgPool;

use crate::articles::repo;

/// Base used when a title slugifies to nothing (symbol-only titles).
const FALLBACK_BASE: &str = "article";

/// Lowercases the title and collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// The candidate for a given retry counter: `base`, then `base-1`, `base-2`, …
pub fn candidate(base: &str, counter: u32) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{base}-{counter}")
    }
}

/// Finds the first slug candidate not used by any other article. When
/// renaming, `exclude_id` keeps the article's own slug out of the check so an
/// unchanged title never grows a counter.
pub async fn unique_slug(
    db: &PgPool,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<String, sqlx::Error> {
    let base = slugify(title);
    let base = if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    };

    let mut counter = 0;
    loop {
        let slug = candidate(&base, counter);
        if !repo::slug_exists(db, &slug, exclude_id).await? {
            return Ok(slug);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("breaking -- news:   update"), "breaking-news-update");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  ...Quantum Breakthrough?  "), "quantum-breakthrough");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 Stories of 2024"), "top-10-stories-of-2024");
    }

    #[test]
    fn non_ascii_becomes_separator() {
        assert_eq!(slugify("café société"), "caf-soci-t");
    }

    #[test]
    fn symbol_only_title_slugifies_to_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn candidates_count_up_from_base() {
        assert_eq!(candidate("the-future-of-ai", 0), "the-future-of-ai");
        assert_eq!(candidate("the-future-of-ai", 1), "the-future-of-ai-1");
        assert_eq!(candidate("the-future-of-ai", 2), "the-future-of-ai-2");
    }
}
