// Index page writer
//
// Writes the aggregate index while emitting pages: for every documented
// name the page is written first, then its `:doc:` line is appended. A name
// without a page gets no `:doc:` line, so every reference resolves.

use crate::classify::{Bucket, Buckets};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::output::pages::{PageEmitter, PageKind};
use crate::output::templates::{underline, IndexHeader, TemplateEngine};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Minimum width of a section heading rule
const SECTION_RULE_MIN: usize = 16;

/// Summary of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub class_pages: usize,
    pub function_pages: usize,
    pub constants: usize,
    /// Group members that have no page and were left out of the index
    pub skipped: Vec<String>,
    pub index_path: PathBuf,
}

impl GenerationReport {
    pub fn pages_written(&self) -> usize {
        self.class_pages + self.function_pages
    }

    /// Get a one-line summary
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Wrote {} pages ({} classes, {} functions), {} constants",
            self.pages_written(),
            self.class_pages,
            self.function_pages,
            self.constants
        );
        if !self.skipped.is_empty() {
            s.push_str(&format!(", {} skipped", self.skipped.len()));
        }
        s
    }
}

/// Writes the index and, through it, every page
pub struct IndexWriter<'a> {
    config: &'a Config,
    engine: TemplateEngine,
}

impl<'a> IndexWriter<'a> {
    /// Create a writer, loading custom templates when configured
    pub fn new(config: &'a Config) -> Result<Self> {
        let engine = match &config.output.templates {
            Some(dir) => TemplateEngine::from_dir(dir)?,
            None => TemplateEngine::new()?,
        };
        Ok(Self { config, engine })
    }

    /// Write all pages and the index for a classified namespace.
    ///
    /// A group member with no page (plain data inside the exceptions or
    /// native group) gets no `:doc:` line; it is listed in
    /// `GenerationReport::skipped` instead.
    pub fn write(&self, root: &Namespace, buckets: &Buckets) -> Result<GenerationReport> {
        let output_dir = &self.config.output.directory;
        fs::create_dir_all(output_dir)?;

        let index_path = output_dir.join(&self.config.output.index);
        let mut report = GenerationReport {
            index_path: index_path.clone(),
            ..GenerationReport::default()
        };

        let mut index = BufWriter::new(File::create(&index_path)?);
        let description = self.config.index.description_for(root.name());
        let header = self.engine.render_index_header(&IndexHeader {
            label: &self.config.index.label,
            title: &self.config.index.title,
            description: &description,
            module: root.name(),
        })?;
        index.write_all(header.as_bytes())?;

        let emitter = PageEmitter::new(&self.engine, output_dir);

        for bucket in Bucket::ALL {
            let title = self.config.index.section_title(bucket);
            let rule = underline(title, '*', SECTION_RULE_MIN.max(title.chars().count() + 4));
            write!(index, "\n{}\n{}\n\n", title, rule)?;

            for name in buckets.get(bucket) {
                if !bucket.has_pages() {
                    writeln!(index, ".. py:data:: {}", name)?;
                    report.constants += 1;
                    continue;
                }

                let entry = root
                    .resolve(name)
                    .ok_or_else(|| Error::NameNotFound(name.clone()))?;

                match emitter.emit(name, entry)? {
                    Some(kind) => {
                        write!(index, ":doc:`{}`\n\n", name)?;
                        match kind {
                            PageKind::Class => report.class_pages += 1,
                            PageKind::Function => report.function_pages += 1,
                        }
                    }
                    None => {
                        warn!(name = %name, ?bucket, "no page for a value that is neither class nor callable; leaving it out of the index");
                        report.skipped.push(name.clone());
                    }
                }
            }
        }

        index.flush()?;
        info!(path = %index_path.display(), pages = report.pages_written(), "index written");
        Ok(report)
    }
}
