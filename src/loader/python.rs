// Python stub loader using tree-sitter

use crate::error::{Error, Result};
use crate::namespace::{Entry, Namespace};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};
use walkdir::WalkDir;

/// A `from .module import ...` re-export inside a package
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeImport {
    /// Sibling module path (`a.b`); empty for `from . import x`
    pub module: String,
    /// Imported names with their optional aliases
    pub names: Vec<(String, Option<String>)>,
    /// `from .module import *`
    pub star: bool,
    pub line: usize,
}

/// A parsed module: its namespace plus the re-exports still to resolve
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub namespace: Namespace,
    pub imports: Vec<RelativeImport>,
    /// Literal `__all__` list, when the module defines one
    pub exports: Option<Vec<String>>,
    /// Line of the last module-level binding of each local name
    pub bound_at: BTreeMap<String, usize>,
}

/// Bindings collected while walking a module body
#[derive(Debug, Default)]
struct ModuleScope {
    imports: Vec<RelativeImport>,
    exports: Option<Vec<String>>,
    bound_at: BTreeMap<String, usize>,
}

/// Sibling modules of a package, with their `__all__` lists
#[derive(Debug, Default)]
struct Submodules {
    modules: BTreeMap<String, Namespace>,
    exports: BTreeMap<String, Vec<String>>,
}

/// Loader for Python modules and stub files
pub struct PythonLoader {
    parser: Parser,
}

impl PythonLoader {
    /// Create a new Python loader
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser.set_language(&language).map_err(|e| {
            Error::Parser(format!("Failed to set Python language: {}", e))
        })?;
        Ok(Self { parser })
    }

    /// Load a single module file. An `__init__` file loads its whole package.
    pub fn load_file(&mut self, path: &Path, name: &str) -> Result<Namespace> {
        if is_init_file(path) {
            if let Some(dir) = path.parent() {
                return self.load_package(dir, name);
            }
        }

        let parsed = self.parse_file(path, name)?;
        for import in &parsed.imports {
            debug!(line = import.line, module = %import.module, "ignoring relative import outside a package");
        }
        Ok(parsed.namespace)
    }

    /// Load a package directory.
    ///
    /// Submodules and subpackages become namespace members. Relative
    /// re-exports in `__init__` are bound in source order against the local
    /// definitions, so whichever binding comes last wins. A star import
    /// takes the source module's `__all__` when it has one.
    pub fn load_package(&mut self, dir: &Path, name: &str) -> Result<Namespace> {
        self.load_package_with_exports(dir, name).map(|(ns, _)| ns)
    }

    fn load_package_with_exports(
        &mut self,
        dir: &Path,
        name: &str,
    ) -> Result<(Namespace, Option<Vec<String>>)> {
        let init = find_init(dir).ok_or_else(|| {
            Error::parse(dir, "not a package: no __init__.py or __init__.pyi")
        })?;

        let parsed = self.parse_file(&init, name)?;
        let mut ns = parsed.namespace;
        let submodules = self.load_submodules(dir, name)?;

        for import in &parsed.imports {
            apply_import(&mut ns, &submodules, &parsed.bound_at, import);
        }

        for (attr, sub) in submodules.modules {
            if !ns.contains(&attr) {
                ns.insert(attr, Entry::module(sub));
            }
        }

        debug!(package = name, members = ns.len(), "loaded package");
        Ok((ns, parsed.exports))
    }

    /// Parse one file into a module namespace
    pub fn parse_file(&mut self, path: &Path, name: &str) -> Result<ParsedModule> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;
        self.parse_source(&source, path, name)
    }

    /// Parse Python source into a module namespace
    pub fn parse_source(&mut self, source: &str, path: &Path, name: &str) -> Result<ParsedModule> {
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            Error::parser("Failed to parse source")
        })?;

        let root = tree.root_node();
        if let Some(bad) = find_error(&root) {
            return Err(Error::parse(
                path,
                format!("syntax error at line {}", bad.start_position().row + 1),
            ));
        }

        let mut namespace = Namespace::new(name);
        let mut scope = ModuleScope::default();
        collect_block(&root, source.as_bytes(), &mut namespace, Some(&mut scope));

        Ok(ParsedModule {
            namespace,
            imports: scope.imports,
            exports: scope.exports,
            bound_at: scope.bound_at,
        })
    }

    fn load_submodules(&mut self, dir: &Path, package: &str) -> Result<Submodules> {
        let mut submodules = Submodules::default();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let qualified = format!("{}.{}", package, stem);

            if entry.file_type().is_dir() {
                if find_init(path).is_some() {
                    let (sub, exports) = self.load_package_with_exports(path, &qualified)?;
                    if let Some(exports) = exports {
                        submodules.exports.insert(stem.clone(), exports);
                    }
                    submodules.modules.insert(stem, sub);
                }
                continue;
            }

            if !is_python_file(path) || is_init_file(path) {
                continue;
            }
            // foo.pyi shadows foo.py
            if extension(path) == Some("py") && path.with_extension("pyi").exists() {
                continue;
            }

            let parsed = self.parse_file(path, &qualified)?;
            if let Some(exports) = parsed.exports {
                submodules.exports.insert(stem.clone(), exports);
            }
            submodules.modules.insert(stem, parsed.namespace);
        }

        Ok(submodules)
    }
}

/// Whether the path has a `.py` or `.pyi` extension
pub fn is_python_file(path: &Path) -> bool {
    matches!(extension(path), Some("py") | Some("pyi"))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn is_init_file(path: &Path) -> bool {
    path.file_stem().map(|s| s == "__init__").unwrap_or(false) && is_python_file(path)
}

/// Package initializer, preferring the stub
fn find_init(dir: &Path) -> Option<std::path::PathBuf> {
    ["__init__.pyi", "__init__.py"]
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.is_file())
}

/// First error or missing node in the tree
fn find_error<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_error(&child) {
            return Some(found);
        }
    }
    Some(*node)
}

/// Walk a module or class body, defining every binding it makes.
///
/// `scope` is only present for module bodies.
fn collect_block(node: &Node, source: &[u8], ns: &mut Namespace, mut scope: Option<&mut ModuleScope>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let bound: Vec<String> = match child.kind() {
            "class_definition" | "function_definition" => define(&child, source, ns).into_iter().collect(),
            "decorated_definition" => child
                .child_by_field_name("definition")
                .and_then(|def| define(&def, source, ns))
                .into_iter()
                .collect(),
            "expression_statement" => {
                if let Some(scope) = scope.as_deref_mut() {
                    collect_exports(&child, source, &mut scope.exports);
                }
                collect_assignments(&child, source, ns)
            }
            // Only the first branch is taken, as for `if sys.version_info >= ...:`
            "if_statement" => {
                if let Some(body) = child.child_by_field_name("consequence") {
                    collect_block(&body, source, ns, scope.as_deref_mut());
                }
                Vec::new()
            }
            "try_statement" => {
                if let Some(body) = child.child_by_field_name("body") {
                    collect_block(&body, source, ns, scope.as_deref_mut());
                }
                Vec::new()
            }
            "import_from_statement" => {
                if let Some(scope) = scope.as_deref_mut() {
                    if let Some(import) = parse_relative_import(&child, source) {
                        scope.imports.push(import);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        };

        if let Some(scope) = scope.as_deref_mut() {
            let line = child.start_position().row + 1;
            for name in bound {
                scope.bound_at.insert(name, line);
            }
        }
    }
}

/// Define a class or function, returning the bound name
fn define(node: &Node, source: &[u8], ns: &mut Namespace) -> Option<String> {
    let name = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())?;
    let qualified = ns.qualify(name);

    let entry = if node.kind() == "class_definition" {
        let mut entry = Entry::class(qualified);
        if let Some(body) = node.child_by_field_name("body") {
            collect_block(&body, source, &mut entry.members, None);
        }
        entry
    } else {
        Entry::function(qualified)
    };

    ns.insert(name, entry);
    Some(name.to_string())
}

fn collect_assignments(node: &Node, source: &[u8], ns: &mut Namespace) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "assignment" {
            names.extend(collect_assignment(&child, source, ns));
        }
    }
    names
}

/// Bind the targets of `a = b = value` or an annotation `a: T`
fn collect_assignment(node: &Node, source: &[u8], ns: &mut Namespace) -> Vec<String> {
    let mut targets = Vec::new();
    let mut current = *node;
    let value = loop {
        if let Some(left) = current.child_by_field_name("left") {
            targets.push(left);
        }
        match current.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => current = right,
            right => break right,
        }
    };

    let mut bound = Vec::new();
    for target in targets {
        match target.kind() {
            "identifier" => {
                if let Ok(name) = target.utf8_text(source) {
                    let qualified = ns.qualify(name);
                    bound.push((name, value_entry(value, source, ns, &qualified)));
                }
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let mut cursor = target.walk();
                for part in target.children(&mut cursor) {
                    if part.kind() == "identifier" {
                        if let Ok(name) = part.utf8_text(source) {
                            bound.push((name, Entry::data(ns.qualify(name))));
                        }
                    }
                }
            }
            // attribute and subscript targets bind nothing here
            _ => {}
        }
    }

    bound
        .into_iter()
        .map(|(name, entry)| {
            ns.insert(name, entry);
            name.to_string()
        })
        .collect()
}

/// Record `__all__ = [...]` and `__all__ += [...]` when the value is a literal
fn collect_exports(node: &Node, source: &[u8], exports: &mut Option<Vec<String>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let extend = match child.kind() {
            "assignment" => false,
            "augmented_assignment" => true,
            _ => continue,
        };
        let target = child
            .child_by_field_name("left")
            .and_then(|l| l.utf8_text(source).ok());
        if target != Some("__all__") {
            continue;
        }

        match child.child_by_field_name("right").and_then(|v| string_list(&v, source)) {
            Some(names) => match exports {
                Some(existing) if extend => existing.extend(names),
                _ => *exports = Some(names),
            },
            None => {
                debug!(line = child.start_position().row + 1, "__all__ is not a literal list of strings");
            }
        }
    }
}

/// Items of a list or tuple literal made only of plain strings
fn string_list(node: &Node, source: &[u8]) -> Option<Vec<String>> {
    if !matches!(node.kind(), "list" | "tuple") {
        return None;
    }
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for item in node.named_children(&mut cursor) {
        match item.kind() {
            "comment" => continue,
            "string" => {
                let text = item.utf8_text(source).ok()?;
                names.push(text.trim_matches(|c| c == '"' || c == '\'').to_string());
            }
            _ => return None,
        }
    }
    Some(names)
}

/// Value bound by an assignment
fn value_entry(value: Option<Node>, source: &[u8], ns: &Namespace, qualified: &str) -> Entry {
    match value {
        Some(v) if v.kind() == "lambda" => Entry::function(qualified),
        Some(v) if v.kind() == "identifier" => {
            match v.utf8_text(source).ok().and_then(|n| ns.get(n)) {
                Some(aliased) => aliased.renamed(qualified),
                None => Entry::data(qualified),
            }
        }
        _ => Entry::data(qualified),
    }
}

/// Parse `from .x import a, b as c` / `from . import x` / `from .x import *`
fn parse_relative_import(node: &Node, source: &[u8]) -> Option<RelativeImport> {
    let line = node.start_position().row + 1;
    let mut level = 0;
    let mut module = String::new();
    let mut names = Vec::new();
    let mut star = false;
    let mut seen_import_keyword = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "relative_import" => {
                let mut inner_cursor = child.walk();
                for inner in child.children(&mut inner_cursor) {
                    match inner.kind() {
                        "import_prefix" => {
                            level = inner.utf8_text(source).ok()?.chars().filter(|c| *c == '.').count();
                        }
                        "dotted_name" => {
                            module = inner.utf8_text(source).ok()?.to_string();
                        }
                        _ => {}
                    }
                }
            }
            "import" => {
                seen_import_keyword = true;
            }
            "dotted_name" if seen_import_keyword => {
                names.push((child.utf8_text(source).ok()?.to_string(), None));
            }
            "aliased_import" => {
                let name = child.child_by_field_name("name")?.utf8_text(source).ok()?;
                let alias = child
                    .child_by_field_name("alias")
                    .and_then(|a| a.utf8_text(source).ok())
                    .map(str::to_string);
                names.push((name.to_string(), alias));
            }
            "wildcard_import" => {
                star = true;
            }
            _ => {}
        }
    }

    if level != 1 {
        if level > 1 {
            debug!(line, "ignoring import from a parent package");
        }
        return None;
    }

    Some(RelativeImport {
        module,
        names,
        star,
        line,
    })
}

/// Resolve a dotted sibling module path against loaded submodules
fn lookup_module<'a>(submodules: &'a BTreeMap<String, Namespace>, dotted: &str) -> Option<&'a Namespace> {
    let mut parts = dotted.split('.');
    let mut ns = submodules.get(parts.next()?)?;
    for part in parts {
        ns = &ns.get(part)?.members;
    }
    Some(ns)
}

fn apply_import(
    ns: &mut Namespace,
    submodules: &Submodules,
    bound_at: &BTreeMap<String, usize>,
    import: &RelativeImport,
) {
    let mut bind = |attr: &str, entry: &Entry| {
        if matches!(bound_at.get(attr), Some(&local) if local > import.line) {
            debug!(name = attr, "re-export rebound later in the package");
            return;
        }
        let qualified = ns.qualify(attr);
        ns.insert(attr, entry.renamed(&qualified));
    };

    if import.module.is_empty() {
        for (name, alias) in &import.names {
            match submodules.modules.get(name) {
                Some(sub) => bind(alias.as_deref().unwrap_or(name), &Entry::module(sub.clone())),
                None => warn!(line = import.line, module = %name, "relative import of unknown submodule"),
            }
        }
        return;
    }

    let source = match lookup_module(&submodules.modules, &import.module) {
        Some(source) => source,
        None => {
            warn!(line = import.line, module = %import.module, "relative import from unknown submodule");
            return;
        }
    };

    if import.star {
        match submodules.exports.get(&import.module) {
            Some(exports) => {
                for name in exports {
                    match source.get(name) {
                        Some(entry) => bind(name.as_str(), entry),
                        None => warn!(line = import.line, name = %name, module = %import.module, "name listed in __all__ not found"),
                    }
                }
            }
            None => {
                for (attr, entry) in source.iter() {
                    if !attr.starts_with('_') {
                        bind(attr, entry);
                    }
                }
            }
        }
        return;
    }

    for (name, alias) in &import.names {
        match source.get(name) {
            Some(entry) => bind(alias.as_deref().unwrap_or(name), entry),
            None => warn!(line = import.line, name = %name, module = %import.module, "imported name not found"),
        }
    }
}
