//! Class declaration builder
//!
//! Each call validates its input against the catalogue immediately, so a bad
//! declaration is reported where it is written rather than at emit time.
//! Repeated `method` calls for one name stack overloads in call order.

use crate::class_spec::ClassSpec;
use crate::error::DeclError;
use crate::modifiers::{Modifier, ModifierError, Modifiers};
use crate::overload::{MemberGroup, Overload, CONSTRUCTOR_IMPLEMENTATION, CONSTRUCTOR_NAME};
use crate::resolver;
use crate::signature::Signature;
use serde::Deserialize;
use sproxy_types::{is_identifier, ClassName, TypeCatalogue, TypeDescriptor};

const CLASS_MODIFIERS: [Modifier; 3] = [Modifier::Public, Modifier::Final, Modifier::Abstract];
const CONSTRUCTOR_MODIFIERS: [Modifier; 3] =
    [Modifier::Public, Modifier::Protected, Modifier::Private];

fn default_returns() -> String {
    "void".to_string()
}

/// A method declaration as written: type tokens, not yet resolved
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodDecl {
    /// Return type token
    #[serde(default = "default_returns")]
    pub returns: String,
    /// Parameter type tokens
    #[serde(default)]
    pub args: Vec<String>,
    /// Thrown type tokens
    #[serde(default)]
    pub throws: Vec<String>,
    /// Modifiers string; `None` means `public`
    #[serde(default)]
    pub modifiers: Option<String>,
    /// Override flag
    #[serde(default, rename = "override")]
    pub is_override: bool,
    /// Dynamic-side callable, defaulting to the method name
    #[serde(default)]
    pub implementation: Option<String>,
}

impl MethodDecl {
    /// Method returning `returns`, no parameters, public
    pub fn new(returns: impl Into<String>) -> Self {
        Self {
            returns: returns.into(),
            args: Vec::new(),
            throws: Vec::new(),
            modifiers: None,
            is_override: false,
            implementation: None,
        }
    }

    /// Append a parameter
    pub fn arg(mut self, token: impl Into<String>) -> Self {
        self.args.push(token.into());
        self
    }

    /// Append several parameters
    pub fn args<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Append a thrown type
    pub fn throws(mut self, token: impl Into<String>) -> Self {
        self.throws.push(token.into());
        self
    }

    /// Set the modifiers string
    pub fn modifiers(mut self, text: impl Into<String>) -> Self {
        self.modifiers = Some(text.into());
        self
    }

    /// Set the override flag
    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Route calls to a differently-named dynamic callable
    pub fn implementation(mut self, name: impl Into<String>) -> Self {
        self.implementation = Some(name.into());
        self
    }
}

/// A constructor declaration as written
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstructorDecl {
    /// Parameter type tokens
    #[serde(default)]
    pub args: Vec<String>,
    /// Thrown type tokens
    #[serde(default)]
    pub throws: Vec<String>,
    /// Modifiers string; `None` means `public`
    #[serde(default)]
    pub modifiers: Option<String>,
}

impl ConstructorDecl {
    /// Public no-arg constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn arg(mut self, token: impl Into<String>) -> Self {
        self.args.push(token.into());
        self
    }

    /// Append several parameters
    pub fn args<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Append a thrown type
    pub fn throws(mut self, token: impl Into<String>) -> Self {
        self.throws.push(token.into());
        self
    }

    /// Set the modifiers string
    pub fn modifiers(mut self, text: impl Into<String>) -> Self {
        self.modifiers = Some(text.into());
        self
    }
}

/// Incrementally declares one proxy class
#[derive(Debug)]
pub struct ClassSpecBuilder<'a> {
    catalogue: &'a TypeCatalogue,
    name: String,
    package: String,
    modifiers: Modifiers,
    extends: Option<ClassName>,
    implements: Vec<ClassName>,
    constructors: MemberGroup,
    methods: Vec<MemberGroup>,
    source_file: Option<String>,
}

impl<'a> ClassSpecBuilder<'a> {
    /// Start a public class named `name` in the package named after `module`
    pub fn new(catalogue: &'a TypeCatalogue, module: &str, name: &str) -> Result<Self, DeclError> {
        if !is_identifier(name) {
            return Err(DeclError::InvalidClassName {
                name: name.to_string(),
            });
        }
        let mut builder = Self {
            catalogue,
            name: name.to_string(),
            package: String::new(),
            modifiers: Modifiers::public(),
            extends: None,
            implements: Vec::new(),
            constructors: MemberGroup::constructors(),
            methods: Vec::new(),
            source_file: None,
        };
        builder.package(module)?;
        Ok(builder)
    }

    /// Place the class in `package`; `""` is the default package
    pub fn package(&mut self, package: &str) -> Result<&mut Self, DeclError> {
        if !package.is_empty() && !package.split('.').all(is_identifier) {
            return Err(DeclError::InvalidClassName {
                name: format!("{}.{}", package, self.name),
            });
        }
        self.package = package.to_string();
        Ok(self)
    }

    /// Class modifiers; only `public`, `final` and `abstract` are accepted
    pub fn modifiers(&mut self, text: Option<&str>) -> Result<&mut Self, DeclError> {
        let modifiers = Modifiers::parse(text)
            .and_then(|m| m.restrict_to(&CLASS_MODIFIERS).map(|_| m))
            .map_err(|source| self.modifier_error("class", text, source))?;
        self.modifiers = modifiers;
        Ok(self)
    }

    /// Set the base class
    pub fn extends(&mut self, token: &str) -> Result<&mut Self, DeclError> {
        let base = self
            .catalogue
            .resolve_class(token)
            .map_err(|source| self.unknown_type("extends", source))?;
        self.extends = Some(base);
        Ok(self)
    }

    /// Append an implemented interface
    pub fn implements(&mut self, token: &str) -> Result<&mut Self, DeclError> {
        let interface = self
            .catalogue
            .resolve_class(token)
            .map_err(|source| self.unknown_type("implements", source))?;
        if self.implements.contains(&interface) {
            return Err(DeclError::DuplicateInterface {
                class: self.name.clone(),
                interface: interface.to_string(),
            });
        }
        self.implements.push(interface);
        Ok(self)
    }

    /// Record the dynamic module file name
    pub fn source_file(&mut self, name: impl Into<String>) -> &mut Self {
        self.source_file = Some(name.into());
        self
    }

    /// Add a constructor overload
    pub fn constructor(&mut self, decl: ConstructorDecl) -> Result<&mut Self, DeclError> {
        let label = declared_label(&self.name, &decl.args);
        let modifiers = Modifiers::parse(decl.modifiers.as_deref())
            .and_then(|m| m.restrict_to(&CONSTRUCTOR_MODIFIERS).map(|_| m))
            .map_err(|source| self.modifier_error(&label, decl.modifiers.as_deref(), source))?;
        let params = self.resolve_params(&label, &decl.args)?;
        let throws = self.resolve_throws(&label, &decl.throws)?;

        let overload = Overload::new(Signature::constructor(params), modifiers, CONSTRUCTOR_IMPLEMENTATION)
            .with_throws(throws);
        resolver::admit(&mut self.constructors, overload, &self.name)?;
        Ok(self)
    }

    /// Add a method overload; repeated names stack in call order
    pub fn method(&mut self, name: &str, decl: MethodDecl) -> Result<&mut Self, DeclError> {
        if name == CONSTRUCTOR_NAME || name == "<clinit>" || !is_identifier(name) {
            return Err(DeclError::ReservedName {
                class: self.name.clone(),
                name: name.to_string(),
            });
        }

        let label = declared_label(name, &decl.args);
        let modifiers = Modifiers::parse(decl.modifiers.as_deref())
            .map_err(|source| self.modifier_error(&label, decl.modifiers.as_deref(), source))?;
        let ret = self
            .catalogue
            .resolve(&decl.returns)
            .map_err(|source| self.unknown_type(&label, source))?;
        let params = self.resolve_params(&label, &decl.args)?;
        let throws = self.resolve_throws(&label, &decl.throws)?;

        let implementation = decl.implementation.unwrap_or_else(|| name.to_string());
        let overload = Overload::new(Signature::new(params, ret), modifiers, implementation)
            .with_throws(throws)
            .with_override(decl.is_override);

        let class = self.name.clone();
        let group = match self.methods.iter().position(|g| g.name() == name) {
            Some(idx) => &mut self.methods[idx],
            None => {
                self.methods.push(MemberGroup::new(name));
                let last = self.methods.len() - 1;
                &mut self.methods[last]
            }
        };
        if let Err(err) = resolver::admit(group, overload, &class) {
            if group.is_empty() {
                self.methods.retain(|g| !g.is_empty());
            }
            return Err(err);
        }
        Ok(self)
    }

    /// Finish the declaration
    pub fn build(mut self) -> Result<ClassSpec, DeclError> {
        let base = self.extends.clone().unwrap_or_else(ClassName::object);
        if !self.catalogue.resolver().has_no_arg_constructor(base.as_str()) {
            return Err(DeclError::NoDefaultConstructor {
                class: self.name.clone(),
                base: base.to_string(),
            });
        }

        if self.constructors.is_empty() {
            self.constructor(ConstructorDecl::new())?;
        }

        let constructors = resolver::finalize(self.constructors, &self.name)?;
        let methods = self
            .methods
            .into_iter()
            .map(|g| resolver::finalize(g, &self.name))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "declared {} with {} constructor(s) and {} method group(s)",
            self.name,
            constructors.len(),
            methods.len()
        );

        Ok(ClassSpec {
            package: self.package,
            name: self.name,
            modifiers: self.modifiers,
            extends: self.extends,
            implements: self.implements,
            constructors,
            methods,
            source_file: self.source_file,
        })
    }

    fn resolve_params(&self, label: &str, args: &[String]) -> Result<Vec<TypeDescriptor>, DeclError> {
        args.iter()
            .map(|token| {
                let ty = self
                    .catalogue
                    .resolve(token)
                    .map_err(|source| self.unknown_type(label, source))?;
                if ty.is_void() {
                    return Err(DeclError::VoidParameter {
                        class: self.name.clone(),
                        member: label.to_string(),
                    });
                }
                Ok(ty)
            })
            .collect()
    }

    fn resolve_throws(&self, label: &str, throws: &[String]) -> Result<Vec<ClassName>, DeclError> {
        throws
            .iter()
            .map(|token| {
                let ty = self
                    .catalogue
                    .resolve(token)
                    .map_err(|source| self.unknown_type(label, source))?;
                match ty {
                    TypeDescriptor::Reference(name) => Ok(name),
                    _ => Err(DeclError::NotThrowable {
                        class: self.name.clone(),
                        member: label.to_string(),
                        token: token.clone(),
                    }),
                }
            })
            .collect()
    }

    fn unknown_type(&self, member: &str, source: sproxy_types::TypeError) -> DeclError {
        DeclError::UnknownType {
            class: self.name.clone(),
            member: member.to_string(),
            source,
        }
    }

    fn modifier_error(&self, member: &str, text: Option<&str>, source: ModifierError) -> DeclError {
        DeclError::InvalidModifier {
            class: self.name.clone(),
            member: member.to_string(),
            text: text.unwrap_or_default().to_string(),
            source,
        }
    }
}

fn declared_label(name: &str, args: &[String]) -> String {
    format!("{}({})", name, args.join(", "))
}
