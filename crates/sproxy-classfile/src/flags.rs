//! Access flags

/// `public`
pub const ACC_PUBLIC: u16 = 0x0001;
/// `private`
pub const ACC_PRIVATE: u16 = 0x0002;
/// `protected`
pub const ACC_PROTECTED: u16 = 0x0004;
/// `static`
pub const ACC_STATIC: u16 = 0x0008;
/// `final`
pub const ACC_FINAL: u16 = 0x0010;
/// Class: use modern `invokespecial` semantics
pub const ACC_SUPER: u16 = 0x0020;
/// Method: `synchronized` (shares the bit with `ACC_SUPER`)
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
/// Method: `native`
pub const ACC_NATIVE: u16 = 0x0100;
/// Class: interface
pub const ACC_INTERFACE: u16 = 0x0200;
/// `abstract`
pub const ACC_ABSTRACT: u16 = 0x0400;
/// Method: `strictfp`
pub const ACC_STRICT: u16 = 0x0800;
/// Compiler-generated
pub const ACC_SYNTHETIC: u16 = 0x1000;

const CLASS_FLAGS: &[(u16, &str)] = &[
    (ACC_PUBLIC, "public"),
    (ACC_FINAL, "final"),
    (ACC_SUPER, "super"),
    (ACC_INTERFACE, "interface"),
    (ACC_ABSTRACT, "abstract"),
    (ACC_SYNTHETIC, "synthetic"),
];

const METHOD_FLAGS: &[(u16, &str)] = &[
    (ACC_PUBLIC, "public"),
    (ACC_PRIVATE, "private"),
    (ACC_PROTECTED, "protected"),
    (ACC_STATIC, "static"),
    (ACC_FINAL, "final"),
    (ACC_SYNCHRONIZED, "synchronized"),
    (ACC_NATIVE, "native"),
    (ACC_ABSTRACT, "abstract"),
    (ACC_STRICT, "strictfp"),
    (ACC_SYNTHETIC, "synthetic"),
];

fn describe(flags: u16, table: &[(u16, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Names of the set class flags
pub fn describe_class(flags: u16) -> Vec<&'static str> {
    describe(flags, CLASS_FLAGS)
}

/// Names of the set method flags
pub fn describe_method(flags: u16) -> Vec<&'static str> {
    describe(flags, METHOD_FLAGS)
}

/// Number of visibility bits set
pub fn visibility_count(flags: u16) -> u32 {
    (flags & (ACC_PUBLIC | ACC_PRIVATE | ACC_PROTECTED)).count_ones()
}
