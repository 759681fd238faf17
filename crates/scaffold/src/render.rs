//! Template rendering and destination writes.

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {}", path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template '{name}'")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders handlebars templates and writes files under the destination
/// directory.
///
/// Escaping is disabled; generated files are plain text, not HTML.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Render a template string with `data`.
    ///
    /// `name` only labels the template in error messages.
    pub fn render_str<T: Serialize>(
        &self,
        name: &str,
        template: &str,
        data: &T,
    ) -> Result<String, RenderError> {
        self.registry
            .render_template(template, data)
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Render a template and write the result to `dest`, creating parent
    /// directories as needed.
    pub fn render_to<T: Serialize>(
        &self,
        dest: &Path,
        name: &str,
        template: &str,
        data: &T,
    ) -> Result<(), RenderError> {
        let rendered = self.render_str(name, template, data)?;
        self.write_file(dest, &rendered)
    }

    /// Render a template read from disk to `dest`. Used for templates that
    /// are not compiled in, such as user-supplied ones.
    pub fn render_file<T: Serialize>(
        &self,
        template: &Path,
        dest: &Path,
        data: &T,
    ) -> Result<(), RenderError> {
        let text =
            fs::read_to_string(template).map_err(|source| RenderError::TemplateNotFound {
                path: template.to_path_buf(),
                source,
            })?;
        let name = template.display().to_string();
        self.render_to(dest, &name, &text, data)
    }

    /// Write `contents` to `dest`, creating parent directories as needed.
    pub fn write_file(&self, dest: &Path, contents: &str) -> Result<(), RenderError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Write {
                path: dest.to_path_buf(),
                source,
            })?;
        }
        fs::write(dest, contents).map_err(|source| RenderError::Write {
            path: dest.to_path_buf(),
            source,
        })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
