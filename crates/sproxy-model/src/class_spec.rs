//! Finished class declarations

use crate::modifiers::Modifiers;
use crate::overload::{MemberGroup, Overload};
use sproxy_types::{ClassName, TypeDescriptor};

/// Name of the finalizer the emitter generates unless one is declared
pub const FINALIZE_NAME: &str = "finalize";

/// Complete, validated description of one proxy class.
///
/// Built only through [`crate::ClassSpecBuilder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    pub(crate) package: String,
    pub(crate) name: String,
    pub(crate) modifiers: Modifiers,
    pub(crate) extends: Option<ClassName>,
    pub(crate) implements: Vec<ClassName>,
    pub(crate) constructors: MemberGroup,
    pub(crate) methods: Vec<MemberGroup>,
    pub(crate) source_file: Option<String>,
}

impl ClassSpec {
    /// Package, empty for the default package
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary name including the package
    pub fn qualified_name(&self) -> ClassName {
        if self.package.is_empty() {
            ClassName::new(self.name.as_str())
        } else {
            ClassName::new(format!("{}.{}", self.package, self.name))
        }
    }

    /// Class modifiers
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Declared base class, `None` meaning `java.lang.Object`
    pub fn extends(&self) -> Option<&ClassName> {
        self.extends.as_ref()
    }

    /// Effective base class
    pub fn base(&self) -> ClassName {
        self.extends.clone().unwrap_or_else(ClassName::object)
    }

    /// Implemented interfaces in declaration order
    pub fn implements(&self) -> &[ClassName] {
        &self.implements
    }

    /// Constructor overloads (never empty)
    pub fn constructors(&self) -> &MemberGroup {
        &self.constructors
    }

    /// Method groups in declaration order
    pub fn methods(&self) -> &[MemberGroup] {
        &self.methods
    }

    /// Method group by name
    pub fn method(&self, name: &str) -> Option<&MemberGroup> {
        self.methods.iter().find(|g| g.name() == name)
    }

    /// Dynamic module file recorded as the class's `SourceFile`
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Whether a no-argument `finalize` is declared
    pub fn declares_finalize(&self) -> bool {
        self.method(FINALIZE_NAME)
            .map(|g| g.overloads().iter().any(|o| o.signature().params().is_empty()))
            .unwrap_or(false)
    }

    /// Every member, constructors first, as `(name, overload)` pairs
    pub fn members(&self) -> impl Iterator<Item = (&str, &Overload)> {
        std::iter::once(&self.constructors)
            .chain(self.methods.iter())
            .flat_map(|group| group.overloads().iter().map(move |o| (group.name(), o)))
    }

    /// Look up a member by its `name + descriptor` key
    pub fn find_member(&self, key: &str) -> Option<(&str, &Overload)> {
        let paren = key.find('(')?;
        let name = &key[..paren];
        let descriptor = &key[paren..];
        let group = if name == self.constructors.name() {
            &self.constructors
        } else {
            self.method(name)?
        };
        group
            .overloads()
            .iter()
            .find(|o| o.signature().descriptor() == descriptor)
            .map(|o| (group.name(), o))
    }

    /// Every type mentioned by the class, for reference checks
    pub fn referenced_types(&self) -> Vec<TypeDescriptor> {
        let mut out = Vec::new();
        out.push(TypeDescriptor::Reference(self.base()));
        out.extend(self.implements.iter().cloned().map(TypeDescriptor::Reference));
        for (_, overload) in self.members() {
            out.extend(overload.signature().params().iter().cloned());
            out.push(overload.signature().ret().clone());
            out.extend(overload.throws().iter().cloned().map(TypeDescriptor::Reference));
        }
        out
    }
}
