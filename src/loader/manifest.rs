// Namespace manifest loader
//
// A manifest is a JSON dump of a live module taken in the documentation
// environment: each member carries its name, its runtime kind and, for
// classes and modules, its own members.

use crate::error::{Error, Result};
use crate::namespace::{Entry, Namespace, Traits};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level manifest document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Root module name
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

/// One attribute of a namespace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSpec {
    pub name: String,
    pub kind: MemberKind,
    /// Overrides the callable flag implied by `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberSpec>,
}

/// Runtime kind recorded for a member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Class,
    Function,
    Module,
    Data,
}

impl MemberKind {
    fn traits(self) -> Traits {
        match self {
            MemberKind::Class => Traits::CLASS,
            MemberKind::Function => Traits::CALLABLE,
            MemberKind::Module | MemberKind::Data => Traits::DATA,
        }
    }
}

impl Manifest {
    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&contents)?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::parse(path, "manifest has an empty module name"));
        }
        validate_members(&self.members, &self.name, path)
    }

    /// Build the namespace table, optionally under a different root name
    pub fn into_namespace(self, name: Option<&str>) -> Namespace {
        let root = name.unwrap_or(&self.name).to_string();
        build_namespace(&root, &self.members)
    }
}

fn validate_members(members: &[MemberSpec], parent: &str, path: &Path) -> Result<()> {
    for member in members {
        if member.name.is_empty() || member.name.contains('.') {
            return Err(Error::parse(
                path,
                format!("invalid member name '{}' in {}", member.name, parent),
            ));
        }
        let qualified = format!("{}.{}", parent, member.name);
        validate_members(&member.members, &qualified, path)?;
    }
    Ok(())
}

fn build_namespace(name: &str, members: &[MemberSpec]) -> Namespace {
    let mut ns = Namespace::new(name);
    for member in members {
        let qualified = ns.qualify(&member.name);
        let mut traits = member.kind.traits();
        if let Some(callable) = member.callable {
            traits.callable = callable;
        }
        let entry = Entry {
            traits,
            members: build_namespace(&qualified, &member.members),
        };
        ns.insert(member.name.clone(), entry);
    }
    ns
}
