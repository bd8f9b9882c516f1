//! Field and method descriptor parsing

/// Shape of a method descriptor as far as the operand stack is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodShape {
    /// Slots taken by the arguments (long/double count twice)
    pub arg_slots: u16,
    /// Slots taken by the return value (0 for void)
    pub return_slots: u16,
    /// First character of the return descriptor (`V`, `I`, `L`, `[`, ...)
    pub return_kind: char,
}

/// Parse one field descriptor at the start of `s`, returning the number of
/// bytes consumed and the slot size
fn parse_field(s: &[u8]) -> Option<(usize, u16)> {
    let mut i = 0;
    while s.get(i) == Some(&b'[') {
        i += 1;
    }
    if i > 255 {
        return None;
    }
    let is_array = i > 0;
    match *s.get(i)? {
        b'B' | b'C' | b'F' | b'I' | b'S' | b'Z' => Some((i + 1, 1)),
        b'J' | b'D' => Some((i + 1, if is_array { 1 } else { 2 })),
        b'L' => {
            let end = s[i + 1..].iter().position(|&c| c == b';')?;
            let name = &s[i + 1..i + 1 + end];
            if name.is_empty() || name.iter().any(|&c| matches!(c, b'.' | b'[' | b';')) {
                return None;
            }
            Some((i + end + 2, 1))
        }
        _ => None,
    }
}

/// Whether `descriptor` is exactly one valid field descriptor
pub fn is_field_descriptor(descriptor: &str) -> bool {
    matches!(parse_field(descriptor.as_bytes()), Some((len, _)) if len == descriptor.len())
}

/// Parse a method descriptor such as `(I[Ljava/lang/String;)J`
pub fn parse_method_descriptor(descriptor: &str) -> Option<MethodShape> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }
    let mut i = 1;
    let mut arg_slots: u16 = 0;
    while *bytes.get(i)? != b')' {
        let (len, slots) = parse_field(&bytes[i..])?;
        arg_slots = arg_slots.checked_add(slots)?;
        i += len;
    }
    i += 1;

    let rest = &bytes[i..];
    let (return_slots, consumed) = if rest == b"V" {
        (0, 1)
    } else {
        let (len, slots) = parse_field(rest)?;
        (slots, len)
    };
    if consumed != rest.len() {
        return None;
    }
    Some(MethodShape {
        arg_slots,
        return_slots,
        return_kind: char::from(rest[0]),
    })
}
