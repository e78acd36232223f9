// Per-name stub pages
//
// One `<qualified-name>.rst` per documented class or function. The page kind
// comes from the same class-before-callable probe the classifier uses, so a
// class gets exactly one write: its class page.

use crate::error::Result;
use crate::namespace::{Entry, Kind};
use crate::output::templates::TemplateEngine;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directive style of a generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Class,
    Function,
}

impl PageKind {
    /// Page kind for a value; `None` for values that are neither
    pub fn for_entry(entry: &Entry) -> Option<PageKind> {
        match Kind::probe(entry) {
            Kind::Class => Some(PageKind::Class),
            Kind::Callable => Some(PageKind::Function),
            Kind::Other => None,
        }
    }
}

/// Writes stub pages into an output directory
pub struct PageEmitter<'a> {
    engine: &'a TemplateEngine,
    output_dir: &'a Path,
}

impl<'a> PageEmitter<'a> {
    pub fn new(engine: &'a TemplateEngine, output_dir: &'a Path) -> Self {
        Self { engine, output_dir }
    }

    /// Path of the page for a qualified name
    pub fn page_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.rst", name))
    }

    /// Write the page for `name`, replacing any previous file.
    ///
    /// Returns the kind of page written, or `None` when the value is neither
    /// a class nor callable and no page was written.
    pub fn emit(&self, name: &str, entry: &Entry) -> Result<Option<PageKind>> {
        let kind = match PageKind::for_entry(entry) {
            Some(kind) => kind,
            None => return Ok(None),
        };

        let content = match kind {
            PageKind::Class => self.engine.render_class(name)?,
            PageKind::Function => self.engine.render_function(name)?,
        };

        let path = self.page_path(name);
        fs::write(&path, content)?;
        debug!(path = %path.display(), ?kind, "wrote page");

        Ok(Some(kind))
    }
}
