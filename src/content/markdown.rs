//! Markdown rendering for post bodies and editor previews

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::html_escape;

/// Shown in the preview pane when the draft body is empty
const EMPTY_PREVIEW: &str = "*空内容*";

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Markdown renderer with syntax-highlighted code blocks
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Use a named syntect theme, falling back to the default one
    pub fn with_theme(name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(name)
            .or_else(|| themes.remove(DEFAULT_THEME))
            .unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    let (lang, code) = code_block
                        .take()
                        .ok_or_else(|| anyhow!("unbalanced code block"))?;
                    events.push(Event::Html(CowStr::from(
                        self.highlight_code(&code, lang.as_deref()),
                    )));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    /// Render the editor preview pane
    pub fn render_preview(&self, markdown: &str) -> Result<String> {
        if markdown.is_empty() {
            self.render(EMPTY_PREVIEW)
        } else {
            self.render(markdown)
        }
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => {
                format!(r#"<figure class="highlight {}">{}</figure>"#, class, highlighted)
            }
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    class,
                    html_escape(code)
                )
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
