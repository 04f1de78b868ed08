//! Markdown file import into the post editor
//!
//! An imported file becomes a [`DraftPatch`]: front-matter fields map onto draft
//! fields and the body replaces the content. Fields the file does not mention
//! are left out of the patch, so applying it never resets anything.

use super::draft::DraftPatch;
use super::frontmatter::FrontMatter;
use super::post::Category;

/// Parse `text` into a patch, resolving category names against `categories`.
///
/// Text without a leading front-matter block is imported as plain content.
pub fn import(text: &str, categories: &[Category]) -> DraftPatch {
    let Some((fm, body)) = FrontMatter::split(text) else {
        return DraftPatch::content_only(text.trim());
    };

    tracing::debug!("Importing markdown with {} front-matter fields", fm.len());

    DraftPatch {
        title: fm.get("title").map(String::from),
        slug: fm.get("slug").map(String::from),
        excerpt: fm.get_any(&["excerpt", "description"]).map(String::from),
        tags: fm.get("tags").map(String::from),
        read_time: read_time(&fm),
        category_id: fm
            .get_any(&["category", "categories"])
            .and_then(|name| find_category(categories, name))
            .map(|category| category.id.clone()),
        content: Some(body.trim().to_string()),
    }
}

/// `read_time`, else `readtime`; a value without a leading integer is absent
fn read_time(fm: &FrontMatter) -> Option<u32> {
    let raw = fm.get_any(&["read_time", "readtime"])?;
    let minutes = parse_leading_int(raw);
    if minutes.is_none() {
        tracing::warn!("Ignoring non-numeric read time {:?}", raw);
    }
    minutes
}

/// Parse the leading run of digits, so `"7 min"` reads as 7. One leading
/// `+` is allowed.
fn parse_leading_int(value: &str) -> Option<u32> {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    let digits = value
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(value, |(end, _)| &value[..end]);
    digits.parse().ok()
}

/// First category whose name matches case-insensitively
pub fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = name.to_lowercase();
    categories.iter().find(|c| c.name.to_lowercase() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Draft;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("c1".into(), "Tech".into(), "tech".into()),
            Category::new("c2".into(), "Life".into(), "life".into()),
        ]
    }

    fn prior_draft() -> Draft {
        Draft {
            title: "Prior".to_string(),
            slug: "prior".to_string(),
            excerpt: Some("Prior excerpt".to_string()),
            content: "Prior body".to_string(),
            category_id: Some("c2".to_string()),
            published: true,
            cover_image: None,
            tags: "old".to_string(),
            read_time: 9,
        }
    }

    const FULL: &str = "---\ntitle: My Post\nslug: my-post\ntags: a, b, c\nread_time: 7\ncategory: Tech\n---\nBody text here.\n";

    #[test]
    fn test_plain_text_is_content_only() {
        let patch = import("  Hello world\n", &categories());
        assert_eq!(patch, DraftPatch::content_only("Hello world"));

        let draft = prior_draft().merged(patch);
        assert_eq!(draft, Draft { content: "Hello world".to_string(), ..prior_draft() });
    }

    #[test]
    fn test_full_front_matter() {
        let patch = import(FULL, &categories());
        assert_eq!(
            patch,
            DraftPatch {
                title: Some("My Post".to_string()),
                slug: Some("my-post".to_string()),
                excerpt: None,
                tags: Some("a, b, c".to_string()),
                read_time: Some(7),
                category_id: Some("c1".to_string()),
                content: Some("Body text here.".to_string()),
            }
        );
    }

    #[test]
    fn test_quoted_title() {
        let patch = import("---\ntitle: \"Quoted Title\"\n---\nx", &categories());
        assert_eq!(patch.title.as_deref(), Some("Quoted Title"));
    }

    #[test]
    fn test_unknown_category_leaves_reference() {
        let patch = import("---\ncategory: Unknown\n---\nx", &categories());
        assert_eq!(patch.category_id, None);
        assert_eq!(prior_draft().merged(patch).category_id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_category_match_ignores_case() {
        let patch = import("---\ncategory: tech\n---\nx", &categories());
        assert_eq!(patch.category_id.as_deref(), Some("c1"));

        let patch = import("---\ncategories: LIFE\n---\nx", &categories());
        assert_eq!(patch.category_id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_duplicate_category_names_take_first() {
        let mut cats = categories();
        cats.push(Category::new("c3".into(), "tech".into(), "tech-2".into()));
        let patch = import("---\ncategory: TECH\n---\nx", &cats);
        assert_eq!(patch.category_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_import_is_idempotent() {
        let cats = categories();
        assert_eq!(import(FULL, &cats), import(FULL, &cats));
    }

    #[test]
    fn test_crlf_matches_lf() {
        let crlf = FULL.replace('\n', "\r\n");
        assert_eq!(import(&crlf, &categories()), import(FULL, &categories()));
    }

    #[test]
    fn test_partial_front_matter_preserves_fields() {
        let draft = prior_draft().merged(import("---\ntitle: Only title\n---\nNew body", &categories()));
        assert_eq!(draft.title, "Only title");
        assert_eq!(draft.content, "New body");
        assert_eq!(draft.slug, "prior");
        assert_eq!(draft.excerpt.as_deref(), Some("Prior excerpt"));
        assert_eq!(draft.tags, "old");
        assert_eq!(draft.read_time, 9);
        assert_eq!(draft.category_id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_description_is_excerpt_fallback() {
        let patch = import("---\ndescription: Short intro\n---\nx", &categories());
        assert_eq!(patch.excerpt.as_deref(), Some("Short intro"));
    }

    #[test]
    fn test_read_time_parsing() {
        let cats = categories();
        assert_eq!(import("---\nreadtime: 4\n---\nx", &cats).read_time, Some(4));
        assert_eq!(import("---\nread_time: 7 min\n---\nx", &cats).read_time, Some(7));
        assert_eq!(import("---\nread_time: soon\n---\nx", &cats).read_time, None);
        assert_eq!(import("---\nread_time: +5\n---\nx", &cats).read_time, Some(5));
        assert_eq!(import("---\nread_time: ++5\n---\nx", &cats).read_time, None);
        assert_eq!(import("---\nread_time: abc\nreadtime: 3\n---\nx", &cats).read_time, None);

        let draft = prior_draft().merged(import("---\nread_time: soon\n---\nx", &cats));
        assert_eq!(draft.read_time, 9);
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let patch = import("---\nlayout: post\ndate: 2024-01-01\n---\nBody", &categories());
        assert_eq!(patch, DraftPatch::content_only("Body"));
    }
}
