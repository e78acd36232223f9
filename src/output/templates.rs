// Template engine for generating reStructuredText output

use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera, Value};

pub const CLASS_TEMPLATE: &str = "class.rst.tera";
pub const FUNCTION_TEMPLATE: &str = "function.rst.tera";
pub const INDEX_TEMPLATE: &str = "quickref.rst.tera";

/// Template engine wrapping Tera with the page and index templates
pub struct TemplateEngine {
    tera: Tera,
}

/// Text placed at the top of the index page
#[derive(Debug, Clone)]
pub struct IndexHeader<'a> {
    pub label: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub module: &'a str,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: embedded()?,
        })
    }

    /// Create a template engine from a custom directory.
    ///
    /// Templates found in the directory replace the embedded ones with the
    /// same name; anything missing falls back to the embedded template.
    pub fn from_dir(template_dir: &Path) -> Result<Self> {
        let pattern = format!("{}/**/*.tera", template_dir.display());
        let mut tera = Tera::new(&pattern)?;
        register_filters(&mut tera);
        tera.extend(&embedded()?)?;
        Ok(Self { tera })
    }

    /// Render a class page
    pub fn render_class(&self, name: &str) -> Result<String> {
        self.render_page(CLASS_TEMPLATE, name)
    }

    /// Render a function page
    pub fn render_function(&self, name: &str) -> Result<String> {
        self.render_page(FUNCTION_TEMPLATE, name)
    }

    /// Render the fixed header block of the index page
    pub fn render_index_header(&self, header: &IndexHeader) -> Result<String> {
        let mut context = Context::new();
        context.insert("label", header.label);
        context.insert("title", header.title);
        context.insert("description", header.description);
        context.insert("module", header.module);
        Ok(self.tera.render(INDEX_TEMPLATE, &context)?)
    }

    fn render_page(&self, template: &str, name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", name);
        Ok(self.tera.render(template, &context)?)
    }
}

fn embedded() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (CLASS_TEMPLATE, include_str!("../../templates/class.rst.tera")),
        (FUNCTION_TEMPLATE, include_str!("../../templates/function.rst.tera")),
        (INDEX_TEMPLATE, include_str!("../../templates/quickref.rst.tera")),
    ])?;
    register_filters(&mut tera);
    Ok(tera)
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("underline", underline_filter);
}

/// Heading rule under a title: `char` repeated to cover the title, at least `min` long
fn underline_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let title = value.as_str().unwrap_or("");
    let ch = args
        .get("char")
        .and_then(|v| v.as_str())
        .and_then(|s| s.chars().next())
        .unwrap_or('=');
    let min = args.get("min").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    Ok(Value::String(underline(title, ch, min)))
}

/// Repeat `ch` to the title's width, but no shorter than `min`
pub fn underline(title: &str, ch: char, min: usize) -> String {
    let width = title.chars().count().max(min);
    std::iter::repeat(ch).take(width).collect()
}
