//! Post, category and settings records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of tags shown on a post card before collapsing into a count
const CARD_TAG_LIMIT: usize = 3;

/// A stored blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Public URL key, `/blog/<slug>`
    pub slug: String,
    pub excerpt: Option<String>,
    /// Raw markdown body
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub read_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a stored post from validated input
    pub fn from_input(id: String, input: PostInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            cover_image: input.cover_image,
            published: input.published,
            published_at: input.published_at,
            category_id: input.category_id,
            tags: input.tags,
            read_time: input.read_time,
            created_at: now,
            updated_at: input.updated_at,
        }
    }

    /// Overwrite the editable fields, keeping identity and creation time
    pub fn apply_input(&mut self, input: PostInput) {
        self.title = input.title;
        self.slug = input.slug;
        self.excerpt = input.excerpt;
        self.content = input.content;
        self.cover_image = input.cover_image;
        self.published = input.published;
        self.published_at = input.published_at;
        self.category_id = input.category_id;
        self.tags = input.tags;
        self.read_time = input.read_time;
        self.updated_at = input.updated_at;
    }

    /// Date shown to readers: publication date, falling back to creation
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

/// The writable part of a post, as sent to the post store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub read_time: u32,
    pub updated_at: DateTime<Utc>,
}

/// A post category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: String, name: String, slug: String) -> Self {
        Self {
            id,
            name,
            slug,
            created_at: Utc::now(),
        }
    }
}

/// Payload for creating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

/// Links shown in the site footer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub email: Option<String>,
}

/// Site-wide settings, a single row in the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub blog_name: String,
    pub blog_description: String,
    pub footer_text: String,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blog_name: "Mark的博客".to_string(),
            blog_description: String::new(),
            footer_text: String::new(),
            social_links: SocialLinks::default(),
            updated_at: Utc::now(),
        }
    }
}

impl Settings {
    /// Apply a partial update; absent fields keep their value
    pub fn apply(&mut self, patch: SettingsPatch, now: DateTime<Utc>) {
        if let Some(blog_name) = patch.blog_name {
            self.blog_name = blog_name;
        }
        if let Some(blog_description) = patch.blog_description {
            self.blog_description = blog_description;
        }
        if let Some(footer_text) = patch.footer_text {
            self.footer_text = footer_text;
        }
        if let Some(social_links) = patch.social_links {
            self.social_links = social_links;
        }
        self.updated_at = now;
    }
}

/// Partial settings update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub blog_name: Option<String>,
    pub blog_description: Option<String>,
    pub footer_text: Option<String>,
    pub social_links: Option<SocialLinks>,
}

/// A post as listed in feeds and search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub path: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub date: String,
    pub category: Option<String>,
    pub category_slug: Option<String>,
    /// Listing path of the category, filled in by the reader
    pub category_path: Option<String>,
    /// At most three tags
    pub tags: Vec<String>,
    /// Tags beyond the visible ones
    pub more_tags: usize,
    pub read_time: u32,
}

impl PostSummary {
    pub fn new(post: &Post, category: Option<&Category>, path: String, date: String) -> Self {
        let tags = post.tag_list();
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            path,
            excerpt: post.excerpt.clone(),
            cover_image: post.cover_image.clone(),
            date,
            category: category.map(|c| c.name.clone()),
            category_slug: category.map(|c| c.slug.clone()),
            category_path: None,
            tags: tags.iter().take(CARD_TAG_LIMIT).cloned().collect(),
            more_tags: tags.len().saturating_sub(CARD_TAG_LIMIT),
            read_time: post.read_time,
        }
    }
}
