//! Method signatures

use sproxy_types::TypeDescriptor;
use std::fmt;

/// Ordered parameter types plus a return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<TypeDescriptor>,
    ret: TypeDescriptor,
}

impl Signature {
    /// Create a signature. Callers are responsible for keeping `void` out of
    /// the parameter list; the builder enforces this for declarations.
    pub fn new(params: Vec<TypeDescriptor>, ret: TypeDescriptor) -> Self {
        Self { params, ret }
    }

    /// Constructor signature: the given parameters returning `void`
    pub fn constructor(params: Vec<TypeDescriptor>) -> Self {
        Self::new(params, TypeDescriptor::VOID)
    }

    /// Parameter types
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Return type
    pub fn ret(&self) -> &TypeDescriptor {
        &self.ret
    }

    /// Whether the two signatures take the same parameter types.
    ///
    /// Overloads are distinct iff this is false; the return type never
    /// disambiguates.
    pub fn same_params(&self, other: &Signature) -> bool {
        self.params == other.params
    }

    /// VM method descriptor (`(ILjava/lang/String;)V`)
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        self.ret.write_descriptor(&mut out);
        out
    }

    /// Stable key identifying an overload: `name + descriptor`
    pub fn member_key(&self, name: &str) -> String {
        format!("{}{}", name, self.descriptor())
    }

    /// Local-variable slots used by the parameters, not counting `this`
    pub fn param_slots(&self) -> u32 {
        self.params.iter().map(|p| u32::from(p.size())).sum()
    }

    /// Human-readable form used in diagnostics: `name(int, java.lang.String)`
    pub fn display_with<'a>(&'a self, name: &'a str) -> impl fmt::Display + 'a {
        DisplayWith { sig: self, name }
    }
}

struct DisplayWith<'a> {
    sig: &'a Signature,
    name: &'a str,
}

impl fmt::Display for DisplayWith<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.sig.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}
