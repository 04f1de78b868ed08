//! Public reading surface: home feed, category listings and post pages

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::content::{Category, MarkdownRenderer, Post, PostSummary};
use crate::helpers::{category_path, date_xml, encode_segment, full_url_for, locale_date, post_path};
use crate::store::{CategoryStore, PostStore};

/// Home page data
#[derive(Debug, Serialize)]
pub struct HomeFeed {
    pub posts: Vec<PostSummary>,
    pub categories: Vec<Category>,
    /// One category per configured featured keyword, when one matches
    pub featured: Vec<Category>,
}

/// A category listing
#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub protected: bool,
    /// Empty while a protected category is still locked
    pub posts: Vec<PostSummary>,
}

/// A single post, rendered
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub datetime: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub read_time: u32,
    /// Absolute link for sharing
    pub url: String,
    pub html: String,
}

/// Read-only view over the stores
pub struct Reader<'a> {
    config: &'a SiteConfig,
    posts: &'a dyn PostStore,
    categories: &'a dyn CategoryStore,
}

impl<'a> Reader<'a> {
    pub fn new(
        config: &'a SiteConfig,
        posts: &'a dyn PostStore,
        categories: &'a dyn CategoryStore,
    ) -> Self {
        Self {
            config,
            posts,
            categories,
        }
    }

    /// Published posts, newest first, plus the category list
    pub fn home(&self) -> Result<HomeFeed> {
        let categories = self.categories.list()?;
        let posts = self.posts.list_published()?;

        let featured = self
            .config
            .featured
            .iter()
            .filter_map(|keyword| categories.iter().find(|c| c.name.contains(keyword.as_str())))
            .cloned()
            .collect();

        Ok(HomeFeed {
            posts: self.summaries(&posts, &categories),
            categories,
            featured,
        })
    }

    /// Listing for a category slug. `unlocked` says whether the reader passed
    /// the password gate; it only matters for the protected category.
    pub fn category(&self, slug: &str, unlocked: bool) -> Result<Option<CategoryPage>> {
        let categories = self.categories.list()?;
        let Some(category) = resolve_category(&categories, slug) else {
            tracing::debug!("Category not found for slug: {}", slug);
            return Ok(None);
        };

        let protected = self.is_protected(category);
        let posts = if protected && !unlocked {
            Vec::new()
        } else {
            let posts: Vec<Post> = self
                .posts
                .list_published()?
                .into_iter()
                .filter(|p| p.category_id.as_deref() == Some(category.id.as_str()))
                .collect();
            self.summaries(&posts, &categories)
        };

        Ok(Some(CategoryPage {
            category: category.clone(),
            protected,
            posts,
        }))
    }

    /// A published post by slug with its body rendered
    pub fn post(&self, slug: &str, renderer: &MarkdownRenderer) -> Result<Option<PostDetail>> {
        let Some(post) = self.posts.find_by_slug(slug)?.filter(|p| p.published) else {
            return Ok(None);
        };
        let category = match &post.category_id {
            Some(id) => self.categories.list()?.into_iter().find(|c| &c.id == id),
            None => None,
        };

        Ok(Some(PostDetail {
            date: self.display_date(&post),
            datetime: date_xml(&post.display_date()),
            html: renderer.render(&post.content)?,
            url: full_url_for(self.config, &format!("blog/{}", encode_segment(&post.slug))),
            category: category.map(|c| c.name),
            tags: post.tag_list().to_vec(),
            id: post.id,
            title: post.title,
            slug: post.slug,
            cover_image: post.cover_image,
            read_time: post.read_time,
        }))
    }

    pub fn is_protected(&self, category: &Category) -> bool {
        category.slug == self.config.gate.protected_category
    }

    /// Card summaries with category names resolved
    pub fn summaries(&self, posts: &[Post], categories: &[Category]) -> Vec<PostSummary> {
        let by_id: HashMap<&str, &Category> =
            categories.iter().map(|c| (c.id.as_str(), c)).collect();

        posts
            .iter()
            .map(|post| {
                let category = post
                    .category_id
                    .as_deref()
                    .and_then(|id| by_id.get(id).copied());
                let mut summary = PostSummary::new(
                    post,
                    category,
                    post_path(self.config, &post.slug),
                    self.display_date(post),
                );
                summary.category_path = category.map(|c| category_path(self.config, &c.slug));
                summary
            })
            .collect()
    }

    fn display_date(&self, post: &Post) -> String {
        locale_date(&post.display_date(), self.config.tz(), &self.config.language)
    }
}

/// Find a category by exact slug, else by case-insensitive name containment
pub fn resolve_category<'c>(categories: &'c [Category], slug: &str) -> Option<&'c Category> {
    categories.iter().find(|c| c.slug == slug).or_else(|| {
        let needle = slug.to_lowercase();
        categories
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    })
}
