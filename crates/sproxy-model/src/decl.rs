//! Declaration files (`*.toml`)
//!
//! A declaration file describes the proxy classes of one dynamic module:
//!
//! ```toml
//! module = "chaquopy.test.static_proxy.basic"
//! source = "basic.py"
//!
//! [imports]
//! String = "java.lang.String"
//!
//! [[class]]
//! name = "BasicAdder"
//!
//! [[class.constructor]]
//! args = ["int"]
//!
//! [[class.method]]
//! name = "add"
//! returns = "int"
//! args = ["int"]
//! ```
//!
//! Each class is built independently so one bad declaration does not hide
//! the others.

use crate::builder::{ClassSpecBuilder, ConstructorDecl, MethodDecl};
use crate::class_spec::ClassSpec;
use crate::error::DeclError;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use sproxy_types::{ImportTable, TypeCatalogue};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a declaration file
#[derive(Debug, Error)]
pub enum DeclFileError {
    /// Failed to read the file
    #[error("Failed to read declaration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse declaration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Structurally valid TOML that cannot describe a module
    #[error("Invalid declaration file: {0}")]
    ValidationError(String),
}

/// Contents of one declaration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleDecl {
    /// Dynamic module name; the default package of its classes
    pub module: String,

    /// Module file recorded as `SourceFile`
    #[serde(default)]
    pub source: Option<String>,

    /// Simple name → qualified class name
    #[serde(default)]
    pub imports: BTreeMap<String, String>,

    /// Qualified names of classes with no accessible no-arg constructor
    #[serde(default)]
    pub no_default_constructor: Vec<String>,

    /// Classes in file order
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,

    /// Emitter overrides
    #[serde(default)]
    pub emit: EmitOverrides,
}

/// One `[[class]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassDecl {
    /// Simple class name
    pub name: String,

    /// Base class token
    #[serde(default)]
    pub extends: Option<String>,

    /// Interface tokens
    #[serde(default)]
    pub implements: Vec<String>,

    /// Package; absent means the module name, `""` the default package
    #[serde(default)]
    pub package: Option<String>,

    /// Class modifiers string
    #[serde(default)]
    pub modifiers: Option<String>,

    /// Constructors in declaration order
    #[serde(default, rename = "constructor")]
    pub constructors: Vec<ConstructorDecl>,

    /// Methods in declaration order
    #[serde(default, rename = "method")]
    pub methods: Vec<NamedMethodDecl>,
}

/// One `[[class.method]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedMethodDecl {
    /// Method name
    pub name: String,

    /// Everything else
    #[serde(flatten)]
    pub decl: MethodDecl,
}

/// The `[emit]` table. Every field is optional; unset fields keep the
/// emitter's defaults. An empty `marker` disables the marker interface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmitOverrides {
    /// Bridge class name
    #[serde(default)]
    pub bridge: Option<String>,

    /// Marker interface name, `""` for none
    #[serde(default)]
    pub marker: Option<String>,

    /// Class-file major version
    #[serde(default)]
    pub major_version: Option<u16>,

    /// Whether to write the `SourceFile` attribute
    #[serde(default)]
    pub source_file: Option<bool>,

    /// Whether to generate `finalize`
    #[serde(default)]
    pub finalize: Option<bool>,
}

impl ModuleDecl {
    /// Load a declaration file from disk
    pub fn from_file(path: &Path) -> Result<Self, DeclFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a declaration file from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, DeclFileError> {
        let decl: ModuleDecl = toml::from_str(content)?;
        decl.validate()?;
        Ok(decl)
    }

    /// Check file-level constraints
    pub fn validate(&self) -> Result<(), DeclFileError> {
        let mut seen = FxHashSet::default();
        for class in &self.classes {
            let package = class.package.as_deref().unwrap_or(&self.module);
            if !seen.insert((package, class.name.as_str())) {
                return Err(DeclFileError::ValidationError(format!(
                    "class {} is declared more than once in package {:?}",
                    class.name, package
                )));
            }
        }
        Ok(())
    }

    /// Name resolver built from `[imports]`
    pub fn import_table(&self) -> ImportTable {
        let mut table = ImportTable::new();
        for (name, qualified) in &self.imports {
            table.bind(name.as_str(), qualified.as_str());
        }
        self.no_default_constructor
            .iter()
            .fold(table, |t, class| t.without_default_constructor(class.as_str()))
    }

    /// Catalogue over [`ModuleDecl::import_table`]
    pub fn catalogue(&self) -> TypeCatalogue {
        TypeCatalogue::new(self.import_table())
    }

    /// Build every class, returning `(class name, result)` in file order
    pub fn build(&self, catalogue: &TypeCatalogue) -> Vec<(String, Result<ClassSpec, DeclError>)> {
        self.classes
            .iter()
            .map(|class| (class.name.clone(), self.build_class(catalogue, class)))
            .collect()
    }

    fn build_class(&self, catalogue: &TypeCatalogue, class: &ClassDecl) -> Result<ClassSpec, DeclError> {
        let mut builder = ClassSpecBuilder::new(catalogue, &self.module, &class.name)?;
        if let Some(package) = &class.package {
            builder.package(package)?;
        }
        builder.modifiers(class.modifiers.as_deref())?;
        if let Some(extends) = &class.extends {
            builder.extends(extends)?;
        }
        for interface in &class.implements {
            builder.implements(interface)?;
        }
        if let Some(source) = &self.source {
            builder.source_file(source.as_str());
        }
        for ctor in &class.constructors {
            builder.constructor(ctor.clone())?;
        }
        for method in &class.methods {
            builder.method(&method.name, method.decl.clone())?;
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
module = "chaquopy.test.static_proxy.basic"
source = "basic.py"

[imports]
String = "java.lang.String"

[[class]]
name = "BasicAdder"

[[class.constructor]]
args = ["int"]

[[class.method]]
name = "add"
returns = "int"
args = ["int"]

[[class]]
name = "Broken"

[[class.method]]
name = "f"
args = ["Missing"]
"#;

    #[test]
    fn test_parse_and_build() {
        let decl = ModuleDecl::from_str(BASIC).unwrap();
        assert_eq!(decl.classes.len(), 2);
        assert_eq!(decl.emit, EmitOverrides::default());

        let cat = decl.catalogue();
        let built = decl.build(&cat);
        let adder = built[0].1.as_ref().unwrap();
        assert_eq!(adder.qualified_name().as_str(), "chaquopy.test.static_proxy.basic.BasicAdder");
        assert_eq!(adder.source_file(), Some("basic.py"));
        assert!(adder.find_member("add(I)I").is_some());

        assert_eq!(built[1].0, "Broken");
        assert!(matches!(built[1].1, Err(DeclError::UnknownType { .. })));
    }

    #[test]
    fn test_method_defaults_and_emit_table() {
        let decl = ModuleDecl::from_str(
            r#"
module = "m"
[[class]]
name = "C"
[[class.method]]
name = "run"
override = true
[emit]
marker = ""
major_version = 55
"#,
        )
        .unwrap();
        let method = &decl.classes[0].methods[0];
        assert_eq!(method.decl.returns, "void");
        assert!(method.decl.is_override);
        assert_eq!(decl.emit.marker.as_deref(), Some(""));
        assert_eq!(decl.emit.major_version, Some(55));
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let err = ModuleDecl::from_str(
            r#"
module = "m"
[[class]]
name = "C"
[[class]]
name = "C"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DeclFileError::ValidationError(_)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ModuleDecl::from_str("module = "),
            Err(DeclFileError::ParseError(_))
        ));
    }
}
