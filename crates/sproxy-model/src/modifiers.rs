//! Member and class modifiers
//!
//! A modifiers string is a space-separated list of Java keywords, optionally
//! preceded by one `@`-prefixed manual token (`"@Override protected"`). An
//! absent string means `public`; an empty string means no modifiers at all.

use std::fmt;
use thiserror::Error;

/// A single modifier keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `final`
    Final,
    /// `abstract`
    Abstract,
    /// `static`
    Static,
    /// `synchronized`
    Synchronized,
    /// `native`
    Native,
    /// `strictfp`
    Strictfp,
}

impl Modifier {
    /// Every modifier keyword
    pub const ALL: [Modifier; 9] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Final,
        Modifier::Abstract,
        Modifier::Static,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Strictfp,
    ];

    /// Look up a modifier by keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.keyword() == keyword)
    }

    /// Source keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
        }
    }

    /// Whether this is one of the three visibility keywords
    pub fn is_visibility(self) -> bool {
        matches!(self, Modifier::Public | Modifier::Protected | Modifier::Private)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Why a modifiers string was rejected
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModifierError {
    /// Not a modifier keyword and not an `@` token
    #[error("unknown modifier `{0}`")]
    Unknown(String),

    /// Keyword listed twice
    #[error("duplicate modifier `{0}`")]
    Duplicate(Modifier),

    /// Two of public/protected/private
    #[error("conflicting visibility `{0}` and `{1}`")]
    MultipleVisibility(Modifier, Modifier),

    /// Two `@` tokens
    #[error("only one manual token is allowed, found `{0}` and `{1}`")]
    MultipleManual(String, String),

    /// Keyword combination the VM rejects
    #[error("`{0}` cannot be combined with `{1}`")]
    Incompatible(Modifier, Modifier),

    /// Keyword not permitted on this kind of declaration
    #[error("`{0}` is not allowed here")]
    NotAllowed(Modifier),
}

/// Parsed modifiers: keywords in declaration order plus an optional manual token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    keywords: Vec<Modifier>,
    manual: Option<String>,
}

impl Modifiers {
    /// `public`
    pub fn public() -> Self {
        Self {
            keywords: vec![Modifier::Public],
            manual: None,
        }
    }

    /// No modifiers (package-private)
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a modifiers string; `None` means `public`
    pub fn parse(text: Option<&str>) -> Result<Self, ModifierError> {
        let Some(text) = text else {
            return Ok(Self::public());
        };

        let mut out = Self::none();
        for token in text.split_whitespace() {
            if token.starts_with('@') && token.len() > 1 {
                if let Some(existing) = &out.manual {
                    return Err(ModifierError::MultipleManual(
                        existing.clone(),
                        token.to_string(),
                    ));
                }
                out.manual = Some(token.to_string());
                continue;
            }

            let modifier = Modifier::from_keyword(token)
                .ok_or_else(|| ModifierError::Unknown(token.to_string()))?;
            if out.keywords.contains(&modifier) {
                return Err(ModifierError::Duplicate(modifier));
            }
            if modifier.is_visibility() {
                if let Some(existing) = out.visibility() {
                    return Err(ModifierError::MultipleVisibility(existing, modifier));
                }
            }
            out.keywords.push(modifier);
        }

        out.check_abstract()?;
        Ok(out)
    }

    fn check_abstract(&self) -> Result<(), ModifierError> {
        if !self.contains(Modifier::Abstract) {
            return Ok(());
        }
        const EXCLUSIVE: [Modifier; 6] = [
            Modifier::Final,
            Modifier::Private,
            Modifier::Static,
            Modifier::Synchronized,
            Modifier::Native,
            Modifier::Strictfp,
        ];
        match EXCLUSIVE.iter().find(|m| self.contains(**m)) {
            Some(other) => Err(ModifierError::Incompatible(Modifier::Abstract, *other)),
            None => Ok(()),
        }
    }

    /// Fail with [`ModifierError::NotAllowed`] on the first keyword outside `allowed`
    pub fn restrict_to(&self, allowed: &[Modifier]) -> Result<(), ModifierError> {
        match self.keywords.iter().find(|m| !allowed.contains(m)) {
            Some(m) => Err(ModifierError::NotAllowed(*m)),
            None => Ok(()),
        }
    }

    /// Keywords in declaration order
    pub fn keywords(&self) -> &[Modifier] {
        &self.keywords
    }

    /// The `@` token, if any
    pub fn manual(&self) -> Option<&str> {
        self.manual.as_deref()
    }

    /// Whether the keyword is present
    pub fn contains(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }

    /// The visibility keyword, if any
    pub fn visibility(&self) -> Option<Modifier> {
        self.keywords.iter().copied().find(|m| m.is_visibility())
    }

    /// `static`
    pub fn is_static(&self) -> bool {
        self.contains(Modifier::Static)
    }

    /// Whether a member with these modifiers has no code body
    pub fn is_bodiless(&self) -> bool {
        self.contains(Modifier::Abstract) || self.contains(Modifier::Native)
    }

    /// No keywords and no manual token
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.manual.is_none()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in self
            .manual
            .iter()
            .map(String::as_str)
            .chain(self.keywords.iter().map(|m| m.keyword()))
        {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
            first = false;
        }
        Ok(())
    }
}
