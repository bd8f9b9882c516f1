//! Build, encode, decode and verify a class end to end

use sproxy_classfile::class::{exceptions_info, CODE, DEFAULT_MAJOR_VERSION, EXCEPTIONS};
use sproxy_classfile::flags::{ACC_PUBLIC, ACC_SUPER};
use sproxy_classfile::*;

const CALL_DESC: &str = "(Ljava/lang/Object;Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/Object;";

/// `public int add(int)` forwarding to a static bridge method
fn forwarding_class() -> ClassFile {
    let mut pool = ConstantPool::new();
    let this_class = pool.class("demo/Adder").unwrap();
    let super_class = pool.class("java/lang/Object").unwrap();
    let object = pool.class("java/lang/Object").unwrap();
    let boxed = pool.class("java/lang/Integer").unwrap();
    let key = pool.string("add(I)I").unwrap();
    let value_of = pool
        .methodref("java/lang/Integer", "valueOf", "(I)Ljava/lang/Integer;")
        .unwrap();
    let int_value = pool.methodref("java/lang/Integer", "intValue", "()I").unwrap();
    let call = pool.methodref("demo/Bridge", "call", CALL_DESC).unwrap();
    let io = pool.class("java/io/IOException").unwrap();

    let mut code = CodeBuilder::new(2);
    code.load(LocalKind::Reference, 0).ldc(key);
    code.push_int(&mut pool, 1).unwrap();
    code.anewarray(object).dup();
    code.push_int(&mut pool, 0).unwrap();
    code.load(LocalKind::Int, 1);
    code.invoke(Opcode::Invokestatic, value_of, "(I)Ljava/lang/Integer;").unwrap();
    code.aastore();
    code.invoke(Opcode::Invokestatic, call, CALL_DESC).unwrap();
    code.checkcast(boxed);
    code.invoke(Opcode::Invokevirtual, int_value, "()I").unwrap();
    code.return_value('I').unwrap();

    let method = MemberInfo {
        access_flags: ACC_PUBLIC,
        name_index: pool.utf8("add").unwrap(),
        descriptor_index: pool.utf8("(I)I").unwrap(),
        attributes: vec![
            Attribute {
                name_index: pool.utf8(CODE).unwrap(),
                info: code.finish().to_info().unwrap(),
            },
            Attribute {
                name_index: pool.utf8(EXCEPTIONS).unwrap(),
                info: exceptions_info(&[io]),
            },
        ],
    };

    ClassFile {
        minor_version: 0,
        major_version: DEFAULT_MAJOR_VERSION,
        constant_pool: pool,
        access_flags: ACC_PUBLIC | ACC_SUPER,
        this_class,
        super_class,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: vec![method],
        attributes: Vec::new(),
    }
}

#[test]
fn test_forwarding_method_verifies_after_decode() {
    let class = forwarding_class();
    verify_class(&class).unwrap();

    let bytes = class.encode().unwrap();
    assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    assert_eq!(&bytes[6..8], &[0, 52]);

    let decoded = ClassFile::decode(&bytes).unwrap();
    verify_class(&decoded).unwrap();
    assert_eq!(decoded.this_class_name().unwrap(), "demo/Adder");
    assert_eq!(decoded.super_class_name().unwrap(), Some("java/lang/Object"));

    let method = decoded.find_method("add", "(I)I").unwrap();
    assert_eq!(decoded.exceptions_of(method).unwrap(), vec!["java/io/IOException"]);
    let code = decoded.code_of(method).unwrap().unwrap();
    assert_eq!(code.max_locals, 2);
    assert_eq!(code.max_stack, 6);

    let ops: Vec<Opcode> = decode_instructions("add(I)I", &code.code)
        .unwrap()
        .into_iter()
        .map(|i| i.opcode)
        .collect();
    assert_eq!(ops.first(), Some(&Opcode::Aload0));
    assert_eq!(ops.last(), Some(&Opcode::Ireturn));
    assert!(ops.contains(&Opcode::Checkcast));
}

#[test]
fn test_encoding_is_deterministic() {
    let a = forwarding_class().encode().unwrap();
    let b = forwarding_class().encode().unwrap();
    assert_eq!(a, b);
    assert_eq!(digest(&a), digest(&b));
    assert_eq!(digest(&a).len(), 64);
}

#[test]
fn test_corrupt_input() {
    let bytes = forwarding_class().encode().unwrap();

    let mut bad_magic = bytes.clone();
    bad_magic[0] = 0;
    assert!(matches!(
        ClassFile::decode(&bad_magic),
        Err(ClassFileError::InvalidMagic(_))
    ));

    assert!(matches!(
        ClassFile::decode(&bytes[..bytes.len() - 1]),
        Err(ClassFileError::DecodeError(_))
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        ClassFile::decode(&trailing),
        Err(ClassFileError::TrailingBytes(1))
    ));

    let mut future = bytes;
    future[7] = 200;
    assert!(matches!(
        ClassFile::decode(&future),
        Err(ClassFileError::UnsupportedVersion { major: 200, .. })
    ));
}

#[test]
fn test_verify_rejects_duplicate_methods() {
    let mut class = forwarding_class();
    let copy = class.methods[0].clone();
    class.methods.push(copy);
    assert!(matches!(
        verify_class(&class),
        Err(VerifyError::DuplicateMethod { .. })
    ));
}
