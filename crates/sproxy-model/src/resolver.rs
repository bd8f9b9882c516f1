//! Overload resolution
//!
//! Checks that a member group can be emitted as a set of distinct VM members.
//! Overloads keep their own thrown-type lists; nothing is merged.

use crate::error::DeclError;
use crate::overload::{MemberGroup, Overload};

const OVERRIDE_TOKEN: &str = "@Override";

/// Validate one candidate against the overloads already in `group`
pub fn check(group: &MemberGroup, candidate: &Overload, class: &str) -> Result<(), DeclError> {
    let signature = || {
        candidate
            .signature()
            .display_with(group.name())
            .to_string()
    };

    if candidate.is_override() && candidate.modifiers().manual() == Some(OVERRIDE_TOKEN) {
        return Err(DeclError::ConflictingOverride {
            class: class.to_string(),
            signature: signature(),
            manual: OVERRIDE_TOKEN.to_string(),
        });
    }

    if group.find(candidate.signature()).is_some() {
        return Err(DeclError::AmbiguousOverload {
            class: class.to_string(),
            signature: signature(),
        });
    }
    Ok(())
}

/// Validate `candidate` and append it to `group`
pub fn admit(group: &mut MemberGroup, candidate: Overload, class: &str) -> Result<(), DeclError> {
    check(group, &candidate, class)?;
    group.push(candidate);
    Ok(())
}

/// Re-check a whole group, returning it unchanged (same order) if it is valid
pub fn finalize(group: MemberGroup, class: &str) -> Result<MemberGroup, DeclError> {
    let mut checked = MemberGroup::new(group.name());
    for overload in group.overloads() {
        admit(&mut checked, overload.clone(), class)?;
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::Modifiers;
    use crate::signature::Signature;
    use sproxy_types::{PrimitiveKind, TypeDescriptor};

    fn overload(params: Vec<TypeDescriptor>, ret: TypeDescriptor) -> Overload {
        Overload::new(Signature::new(params, ret), Modifiers::public(), "f")
    }

    fn int() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::Int)
    }

    #[test]
    fn test_distinct_overloads_finalize() {
        let mut group = MemberGroup::new("f");
        admit(&mut group, overload(vec![int()], int()), "C").unwrap();
        admit(&mut group, overload(vec![TypeDescriptor::object()], int()), "C").unwrap();
        let done = finalize(group.clone(), "C").unwrap();
        assert_eq!(done, group);
    }

    #[test]
    fn test_return_type_does_not_disambiguate() {
        let mut group = MemberGroup::new("f");
        admit(&mut group, overload(vec![int()], int()), "C").unwrap();
        let err = admit(&mut group, overload(vec![int()], TypeDescriptor::VOID), "C").unwrap_err();
        assert_eq!(
            err,
            DeclError::AmbiguousOverload {
                class: "C".into(),
                signature: "f(int)".into()
            }
        );
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_conflicting_override() {
        let mut group = MemberGroup::new("f");
        let manual = Overload::new(
            Signature::new(vec![], TypeDescriptor::VOID),
            Modifiers::parse(Some("@Override public")).unwrap(),
            "f",
        );
        admit(&mut group, manual.clone(), "C").unwrap();

        let flagged = overload(vec![int()], TypeDescriptor::VOID).with_override(true);
        admit(&mut group, flagged, "C").unwrap();

        let both = Overload::new(
            Signature::new(vec![TypeDescriptor::object()], TypeDescriptor::VOID),
            Modifiers::parse(Some("@Override")).unwrap(),
            "f",
        )
        .with_override(true);
        assert!(matches!(
            admit(&mut group, both, "C"),
            Err(DeclError::ConflictingOverride { .. })
        ));
    }
}
