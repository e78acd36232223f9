// Namespace classification
//
// Splits the root namespace into the five documentation buckets. Special
// sub-namespaces are matched by name before any type probing happens, and
// the type probe itself checks class before callable.

use crate::config::ModuleConfig;
use crate::error::Result;
use crate::namespace::{Kind, Namespace};
use serde::Serialize;
use tracing::debug;

/// Classification outcome for a documented name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Classes,
    Functions,
    Constants,
    Exceptions,
    Native,
}

impl Bucket {
    /// Index section order
    pub const ALL: [Bucket; 5] = [
        Bucket::Classes,
        Bucket::Functions,
        Bucket::Constants,
        Bucket::Exceptions,
        Bucket::Native,
    ];

    /// Whether names in this bucket get their own page
    pub fn has_pages(self) -> bool {
        self != Bucket::Constants
    }
}

/// Ordered, fully-qualified names per bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Buckets {
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub constants: Vec<String>,
    pub exceptions: Vec<String>,
    pub native: Vec<String>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Classes => &self.classes,
            Bucket::Functions => &self.functions,
            Bucket::Constants => &self.constants,
            Bucket::Exceptions => &self.exceptions,
            Bucket::Native => &self.native,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Classes => &mut self.classes,
            Bucket::Functions => &mut self.functions,
            Bucket::Constants => &mut self.constants,
            Bucket::Exceptions => &mut self.exceptions,
            Bucket::Native => &mut self.native,
        }
    }

    /// Bucket holding `name`, if any
    pub fn bucket_of(&self, name: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|b| self.get(*b).iter().any(|n| n == name))
    }

    /// Total number of classified names
    pub fn total(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.get(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classifier for a root namespace
pub struct Classifier<'a> {
    config: &'a ModuleConfig,
    exclude: Vec<glob::Pattern>,
}

impl<'a> Classifier<'a> {
    /// Create a classifier, compiling the exclude patterns
    pub fn new(config: &'a ModuleConfig) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { config, exclude })
    }

    /// Whether a name qualified under `root` may appear in any bucket.
    ///
    /// The private-marker and dunder checks only look at the part below the
    /// root, so a root such as `pkg._native` still documents its members.
    /// Exclude patterns match the full qualified name.
    pub fn is_visible(&self, root: &str, qualified: &str) -> bool {
        let relative = qualified
            .strip_prefix(root)
            .filter(|rest| rest.starts_with('.'))
            .unwrap_or(qualified);
        let private = format!(".{}", self.config.private_marker);
        !relative.contains(&private)
            && !relative.contains("__")
            && !self.exclude.iter().any(|p| p.matches(qualified))
    }

    /// Classify every public name of `root`
    pub fn classify(&self, root: &Namespace) -> Buckets {
        let mut buckets = Buckets::default();

        for (attr, entry) in root.iter() {
            let qualified = root.qualify(attr);
            if !self.is_visible(root.name(), &qualified) {
                debug!(name = %qualified, "skipping non-public name");
                continue;
            }

            let group = if attr == self.config.constants {
                Some(Bucket::Constants)
            } else if attr == self.config.exceptions {
                Some(Bucket::Exceptions)
            } else if attr == self.config.native {
                Some(Bucket::Native)
            } else {
                None
            };

            if let Some(bucket) = group {
                let members = self.public_members(root.name(), &entry.members);
                debug!(name = %qualified, ?bucket, count = members.len(), "expanding group");
                buckets.get_mut(bucket).extend(members);
                continue;
            }

            match entry.kind() {
                Kind::Class => buckets.classes.push(qualified),
                Kind::Callable => buckets.functions.push(qualified),
                Kind::Other => {
                    debug!(name = %qualified, "dropping name that is neither class nor callable");
                }
            }
        }

        buckets
    }

    /// Qualified public members of a sub-namespace, in directory order
    fn public_members(&self, root: &str, ns: &Namespace) -> Vec<String> {
        ns.dir()
            .map(|attr| ns.qualify(attr))
            .filter(|q| self.is_visible(root, q))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Entry;

    fn scenario() -> Namespace {
        let mut root = Namespace::new("gpstk");
        root.insert("Foo", Entry::class("gpstk.Foo"));
        root.insert("bar", Entry::function("gpstk.bar"));
        root.insert("_hidden", Entry::function("gpstk._hidden"));
        root.insert("__version__", Entry::data("gpstk.__version__"));
        root.insert("VERSION", Entry::data("gpstk.VERSION"));

        let mut constants = Namespace::new("gpstk.constants");
        constants.insert("X", Entry::data("gpstk.constants.X"));
        constants.insert("__doc__", Entry::data("gpstk.constants.__doc__"));
        constants.insert("_private", Entry::data("gpstk.constants._private"));
        root.insert("constants", Entry::module(constants));

        let mut exceptions = Namespace::new("gpstk.exceptions");
        exceptions.insert("BadThing", Entry::class("gpstk.exceptions.BadThing"));
        root.insert("exceptions", Entry::module(exceptions));

        let mut cpp = Namespace::new("gpstk.cpp");
        cpp.insert("vector_double", Entry::class("gpstk.cpp.vector_double"));
        cpp.insert("map_int_str", Entry::class("gpstk.cpp.map_int_str"));
        root.insert("cpp", Entry::module(cpp));
        root
    }

    fn classify(root: &Namespace) -> Buckets {
        let config = ModuleConfig::default();
        Classifier::new(&config).unwrap().classify(root)
    }

    #[test]
    fn test_scenario_buckets() {
        let buckets = classify(&scenario());
        assert_eq!(buckets.classes, vec!["gpstk.Foo"]);
        assert_eq!(buckets.functions, vec!["gpstk.bar"]);
        assert_eq!(buckets.constants, vec!["gpstk.constants.X"]);
        assert_eq!(buckets.exceptions, vec!["gpstk.exceptions.BadThing"]);
        assert_eq!(
            buckets.native,
            vec!["gpstk.cpp.map_int_str", "gpstk.cpp.vector_double"]
        );
    }

    #[test]
    fn test_hidden_names_appear_nowhere() {
        let buckets = classify(&scenario());
        for bucket in Bucket::ALL {
            for name in buckets.get(bucket) {
                assert!(!name.contains("._"), "{} leaked into {:?}", name, bucket);
                assert!(!name.contains("__"), "{} leaked into {:?}", name, bucket);
            }
        }
    }

    #[test]
    fn test_plain_data_is_dropped_silently() {
        let buckets = classify(&scenario());
        assert_eq!(buckets.bucket_of("gpstk.VERSION"), None);
        assert_eq!(buckets.total(), 6);
    }

    #[test]
    fn test_each_name_in_one_bucket() {
        let buckets = classify(&scenario());
        let mut all: Vec<&String> = Bucket::ALL
            .iter()
            .flat_map(|b| buckets.get(*b).iter())
            .collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn test_special_name_wins_over_type() {
        // A class named like the exceptions group is still expanded as a group
        let mut root = Namespace::new("m");
        let mut exc = Entry::class("m.exceptions");
        exc.members.insert("Oops", Entry::class("m.exceptions.Oops"));
        root.insert("exceptions", exc);

        let buckets = classify(&root);
        assert!(buckets.classes.is_empty());
        assert_eq!(buckets.exceptions, vec!["m.exceptions.Oops"]);
    }

    #[test]
    fn test_group_members_kept_regardless_of_kind() {
        let mut root = Namespace::new("m");
        let mut cpp = Namespace::new("m.cpp");
        cpp.insert("npos", Entry::data("m.cpp.npos"));
        root.insert("cpp", Entry::module(cpp));

        let buckets = classify(&root);
        assert_eq!(buckets.native, vec!["m.cpp.npos"]);
    }

    #[test]
    fn test_enumeration_order_preserved() {
        let mut root = Namespace::new("m");
        for name in ["zeta", "Alpha", "beta", "Gamma"] {
            let qualified = root.qualify(name);
            root.insert(name, Entry::function(qualified));
        }
        let buckets = classify(&root);
        assert_eq!(buckets.functions, vec!["m.Alpha", "m.Gamma", "m.beta", "m.zeta"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let mut config = ModuleConfig::default();
        config.exclude = vec!["*_swigregister".to_string(), "gpstk.cpp.map*".to_string()];
        let mut root = scenario();
        root.insert("Foo_swigregister", Entry::function("gpstk.Foo_swigregister"));

        let buckets = Classifier::new(&config).unwrap().classify(&root);
        assert_eq!(buckets.functions, vec!["gpstk.bar"]);
        assert_eq!(buckets.native, vec!["gpstk.cpp.vector_double"]);
    }

    #[test]
    fn test_custom_special_names() {
        let mut config = ModuleConfig::default();
        config.native = "std".to_string();
        let mut root = Namespace::new("m");
        let mut std_ns = Namespace::new("m.std");
        std_ns.insert("string", Entry::class("m.std.string"));
        root.insert("std", Entry::module(std_ns));
        root.insert("cpp", Entry::class("m.cpp"));

        let buckets = Classifier::new(&config).unwrap().classify(&root);
        assert_eq!(buckets.native, vec!["m.std.string"]);
        assert_eq!(buckets.classes, vec!["m.cpp"]);
    }

    #[test]
    fn test_private_looking_root_keeps_members() {
        for name in ["pkg._native", "my__ext"] {
            let mut root = Namespace::new(name);
            root.insert("Foo", Entry::class(root.qualify("Foo")));
            root.insert("bar", Entry::function(root.qualify("bar")));
            root.insert("_hidden", Entry::function(root.qualify("_hidden")));

            let mut constants = Namespace::new(root.qualify("constants"));
            constants.insert("X", Entry::data(constants.qualify("X")));
            constants.insert("_y", Entry::data(constants.qualify("_y")));
            root.insert("constants", Entry::module(constants));

            let buckets = classify(&root);
            assert_eq!(buckets.classes, vec![format!("{}.Foo", name)]);
            assert_eq!(buckets.functions, vec![format!("{}.bar", name)]);
            assert_eq!(buckets.constants, vec![format!("{}.constants.X", name)]);
        }
    }

    #[test]
    fn test_visibility_relative_to_root() {
        let config = ModuleConfig::default();
        let classifier = Classifier::new(&config).unwrap();
        assert!(classifier.is_visible("pkg._native", "pkg._native.Foo"));
        assert!(!classifier.is_visible("pkg._native", "pkg._native._Foo"));
        assert!(!classifier.is_visible("pkg._native", "pkg._native.cpp.__len__"));
        assert!(!classifier.is_visible("gpstk", "gpstk.constants._x"));
    }

    #[test]
    fn test_exclude_matches_full_name_under_private_root() {
        let mut config = ModuleConfig::default();
        config.exclude = vec!["pkg._native.*_swigregister".to_string()];
        let mut root = Namespace::new("pkg._native");
        root.insert("Foo", Entry::class("pkg._native.Foo"));
        root.insert("Foo_swigregister", Entry::function("pkg._native.Foo_swigregister"));

        let buckets = Classifier::new(&config).unwrap().classify(&root);
        assert_eq!(buckets.classes, vec!["pkg._native.Foo"]);
        assert!(buckets.functions.is_empty());
    }

    #[test]
    fn test_empty_namespace() {
        let buckets = classify(&Namespace::new("empty"));
        assert!(buckets.is_empty());
    }
}
