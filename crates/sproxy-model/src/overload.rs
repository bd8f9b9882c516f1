//! Overloads and member groups

use crate::modifiers::Modifiers;
use crate::signature::Signature;
use sproxy_types::ClassName;

/// VM name of constructors
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Dynamic-side callable that implements constructors
pub const CONSTRUCTOR_IMPLEMENTATION: &str = "__init__";

/// One concrete VM member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    signature: Signature,
    modifiers: Modifiers,
    throws: Vec<ClassName>,
    is_override: bool,
    implementation: String,
}

impl Overload {
    /// Create an overload with no thrown types
    pub fn new(signature: Signature, modifiers: Modifiers, implementation: impl Into<String>) -> Self {
        Self {
            signature,
            modifiers,
            throws: Vec::new(),
            is_override: false,
            implementation: implementation.into(),
        }
    }

    /// Set the declared thrown types
    pub fn with_throws(mut self, throws: Vec<ClassName>) -> Self {
        self.throws = throws;
        self
    }

    /// Mark the overload as overriding a base member
    pub fn with_override(mut self, is_override: bool) -> Self {
        self.is_override = is_override;
        self
    }

    /// Parameter and return types
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Declared modifiers
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Declared thrown types, in order
    pub fn throws(&self) -> &[ClassName] {
        &self.throws
    }

    /// Whether this overload was declared with the override flag
    pub fn is_override(&self) -> bool {
        self.is_override
    }

    /// Name of the dynamic-side callable
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// Modifiers as rendered in Java source: the override flag becomes a
    /// leading `@Override`
    pub fn source_modifiers(&self) -> String {
        let rendered = self.modifiers.to_string();
        match (self.is_override, rendered.is_empty()) {
            (false, _) => rendered,
            (true, true) => "@Override".to_string(),
            (true, false) => format!("@Override {}", rendered),
        }
    }
}

/// Overloads sharing one member name, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberGroup {
    name: String,
    overloads: Vec<Overload>,
}

impl MemberGroup {
    /// Empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overloads: Vec::new(),
        }
    }

    /// Empty constructor group
    pub fn constructors() -> Self {
        Self::new(CONSTRUCTOR_NAME)
    }

    /// Member name (`<init>` for constructors)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the constructor group
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Overloads in declaration order
    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    /// Append without checking; see [`crate::resolver::admit`]
    pub(crate) fn push(&mut self, overload: Overload) {
        self.overloads.push(overload);
    }

    /// Number of overloads
    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    /// Whether there are no overloads
    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Find the overload with the given parameter list
    pub fn find(&self, signature: &Signature) -> Option<&Overload> {
        self.overloads
            .iter()
            .find(|o| o.signature.same_params(signature))
    }

    /// Member key of each overload, in order
    pub fn member_keys(&self) -> impl Iterator<Item = (String, &Overload)> {
        self.overloads
            .iter()
            .map(move |o| (o.signature.member_key(&self.name), o))
    }
}

impl<'a> IntoIterator for &'a MemberGroup {
    type Item = &'a Overload;
    type IntoIter = std::slice::Iter<'a, Overload>;

    fn into_iter(self) -> Self::IntoIter {
        self.overloads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sproxy_types::TypeDescriptor;

    #[test]
    fn test_source_modifiers() {
        let sig = Signature::new(vec![], TypeDescriptor::VOID);
        let plain = Overload::new(sig.clone(), Modifiers::public(), "f");
        assert_eq!(plain.source_modifiers(), "public");
        let over = plain.clone().with_override(true);
        assert_eq!(over.source_modifiers(), "@Override public");
        let bare = Overload::new(sig, Modifiers::none(), "f").with_override(true);
        assert_eq!(bare.source_modifiers(), "@Override");
    }

    #[test]
    fn test_member_keys() {
        let mut group = MemberGroup::new("f");
        group.push(Overload::new(
            Signature::new(vec![], TypeDescriptor::VOID),
            Modifiers::public(),
            "f",
        ));
        group.push(Overload::new(
            Signature::new(vec![TypeDescriptor::object()], TypeDescriptor::VOID),
            Modifiers::public(),
            "f",
        ));
        let keys: Vec<String> = group.member_keys().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["f()V", "f(Ljava/lang/Object;)V"]);
        assert!(!group.is_constructor());
        assert!(MemberGroup::constructors().is_constructor());
    }
}
