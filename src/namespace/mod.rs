// Namespace model
//
// An in-memory lookup table standing in for the live module object: every
// attribute resolves to an `Entry` carrying the runtime traits the loader
// observed plus the entry's own child namespace.

use std::collections::BTreeMap;

/// Runtime traits of a namespace value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traits {
    /// The value is a class (type object)
    pub class: bool,
    /// The value can be called
    pub callable: bool,
}

impl Traits {
    /// Classes are constructible, so they are callable too
    pub const CLASS: Traits = Traits { class: true, callable: true };
    pub const CALLABLE: Traits = Traits { class: false, callable: true };
    pub const DATA: Traits = Traits { class: false, callable: false };
}

/// Kind of a value, as decided by `Kind::probe`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Class,
    Callable,
    Other,
}

impl Kind {
    /// Probe a value's traits. The class check runs first, so a
    /// constructible class is never reported as a plain callable.
    pub fn probe(entry: &Entry) -> Kind {
        if entry.traits.class {
            Kind::Class
        } else if entry.traits.callable {
            Kind::Callable
        } else {
            Kind::Other
        }
    }
}

/// A resolved attribute value
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub traits: Traits,
    /// Attributes reachable through this value (`dir(value)`)
    pub members: Namespace,
}

impl Entry {
    pub fn new(qualified_name: impl Into<String>, traits: Traits) -> Self {
        Self {
            traits,
            members: Namespace::new(qualified_name),
        }
    }

    pub fn class(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, Traits::CLASS)
    }

    pub fn function(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, Traits::CALLABLE)
    }

    pub fn data(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, Traits::DATA)
    }

    /// A submodule: not callable, but enumerable
    pub fn module(namespace: Namespace) -> Self {
        Self {
            traits: Traits::DATA,
            members: namespace,
        }
    }

    /// Fully-qualified name of this value
    pub fn qualified_name(&self) -> &str {
        self.members.name()
    }

    /// Copy of this entry re-rooted under another qualified name
    pub fn renamed(&self, qualified_name: &str) -> Entry {
        Entry {
            traits: self.traits,
            members: self.members.renamed(qualified_name),
        }
    }

    pub fn kind(&self) -> Kind {
        Kind::probe(self)
    }
}

/// Named, enumerable attribute table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    name: String,
    // BTreeMap keeps `dir()` ordering: sorted by code point
    entries: BTreeMap<String, Entry>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Fully-qualified name of the namespace itself
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualify an attribute name with this namespace's name
    pub fn qualify(&self, attr: &str) -> String {
        format!("{}.{}", self.name, attr)
    }

    /// Insert or replace an attribute
    pub fn insert(&mut self, attr: impl Into<String>, entry: Entry) {
        self.entries.insert(attr.into(), entry);
    }

    /// Look up a direct attribute
    pub fn get(&self, attr: &str) -> Option<&Entry> {
        self.entries.get(attr)
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.entries.contains_key(attr)
    }

    /// Attribute names in directory order
    pub fn dir(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Attributes with their values, in directory order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a dotted, fully-qualified name to its value.
    ///
    /// The name must start with this namespace's own name; the remaining
    /// components are walked one attribute at a time.
    pub fn resolve(&self, qualified: &str) -> Option<&Entry> {
        let rest = qualified
            .strip_prefix(self.name.as_str())?
            .strip_prefix('.')?;

        let mut parts = rest.split('.');
        let mut entry = self.get(parts.next()?)?;
        for part in parts {
            entry = entry.members.get(part)?;
        }
        Some(entry)
    }

    /// Deep copy under a new qualified name
    pub fn renamed(&self, name: &str) -> Namespace {
        let mut copy = Namespace::new(name);
        for (attr, entry) in &self.entries {
            copy.insert(attr.clone(), entry.renamed(&format!("{}.{}", name, attr)));
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Namespace {
        let mut root = Namespace::new("gpstk");
        root.insert("Foo", Entry::class("gpstk.Foo"));
        root.insert("bar", Entry::function("gpstk.bar"));

        let mut constants = Namespace::new("gpstk.constants");
        constants.insert("X", Entry::data("gpstk.constants.X"));
        root.insert("constants", Entry::module(constants));
        root
    }

    #[test]
    fn test_probe_class_before_callable() {
        let entry = Entry::class("gpstk.Foo");
        assert!(entry.traits.callable);
        assert_eq!(Kind::probe(&entry), Kind::Class);
    }

    #[test]
    fn test_probe_callable_and_other() {
        assert_eq!(Entry::function("m.f").kind(), Kind::Callable);
        assert_eq!(Entry::data("m.x").kind(), Kind::Other);
        assert_eq!(Entry::module(Namespace::new("m.sub")).kind(), Kind::Other);
    }

    #[test]
    fn test_dir_is_sorted() {
        let mut ns = Namespace::new("m");
        ns.insert("zeta", Entry::data("m.zeta"));
        ns.insert("Alpha", Entry::data("m.Alpha"));
        ns.insert("beta", Entry::data("m.beta"));
        let names: Vec<&str> = ns.dir().collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_resolve_nested() {
        let root = sample();
        let x = root.resolve("gpstk.constants.X").unwrap();
        assert_eq!(x.qualified_name(), "gpstk.constants.X");
        assert_eq!(root.resolve("gpstk.Foo").unwrap().kind(), Kind::Class);
    }

    #[test]
    fn test_resolve_rejects_foreign_names() {
        let root = sample();
        assert!(root.resolve("gpstk").is_none());
        assert!(root.resolve("other.Foo").is_none());
        assert!(root.resolve("gpstkFoo").is_none());
        assert!(root.resolve("gpstk.constants.Y").is_none());
    }

    #[test]
    fn test_renamed_requalifies_children() {
        let root = sample();
        let copy = root.get("constants").unwrap().renamed("gpstk.consts");
        assert_eq!(copy.qualified_name(), "gpstk.consts");
        assert_eq!(
            copy.members.get("X").unwrap().qualified_name(),
            "gpstk.consts.X"
        );
    }

    #[test]
    fn test_insert_replaces() {
        let mut ns = Namespace::new("m");
        ns.insert("f", Entry::data("m.f"));
        ns.insert("f", Entry::function("m.f"));
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("f").unwrap().kind(), Kind::Callable);
    }
}
