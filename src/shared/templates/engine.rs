//! Page template engine using Jinja2 syntax.
//!
//! Templates are embedded in the binary from `templates/` and compiled once
//! when [`Templates::new`] is called at startup.

use minijinja::{Environment, Value};
use thiserror::Error;

/// Page templates shipped with the binary, keyed by name
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("index.html", include_str!("../../../templates/index.html")),
    ("detail.html", include_str!("../../../templates/detail.html")),
    ("edit.html", include_str!("../../../templates/edit.html")),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to load template '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Compiled template environment shared by all handlers
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();

        for &(name, source) in EMBEDDED_TEMPLATES {
            env.add_template(name, source)
                .map_err(|source| TemplateError::Load {
                    name: name.to_string(),
                    source,
                })?;
            tracing::debug!("Loaded template: {}", name);
        }

        Ok(Self { env })
    }

    /// Render a template with the given context.
    ///
    /// # Arguments
    /// * `template_name` - The template name (e.g., "index.html")
    /// * `ctx` - Any serializable context, usually built with `minijinja::context!`
    pub fn render(&self, template_name: &str, ctx: Value) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    /// Check if a template exists
    #[cfg(test)]
    pub fn template_exists(&self, template_name: &str) -> bool {
        self.env.get_template(template_name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_embedded_templates_load() {
        let templates = Templates::new().unwrap();
        for &(name, _) in EMBEDDED_TEMPLATES {
            assert!(templates.template_exists(name), "missing {}", name);
        }
    }

    #[test]
    fn test_render_missing_template() {
        let templates = Templates::new().unwrap();
        let result = templates.render("nonexistent.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_html_is_autoescaped() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                "detail.html",
                context! {
                    flashes => Vec::<String>::new(),
                    text_file => context! {
                        id => 1,
                        display_name => "<b>bold</b>",
                        original_filename => "bold.txt",
                        content => "<script>alert(1)</script>",
                        created_at => "2025-01-01 00:00 UTC",
                        updated_at => "2025-01-01 00:00 UTC",
                    },
                },
            )
            .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(!html.contains("<b>bold</b>"));
    }
}
