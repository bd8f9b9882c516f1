//! Forwarding method bodies
//!
//! Every generated body has the same straight-line shape: push the receiver
//! (or the class object for static members) and the member key, pack the
//! arguments into an `Object[]`, call the bridge, then unbox the result.

use sproxy_classfile::class::CodeAttribute;
use sproxy_classfile::{ClassFileError, CodeBuilder, ConstantPool, LocalKind, Opcode};
use sproxy_model::Signature;
use sproxy_types::{PrimitiveKind, TypeDescriptor};

/// Instance method entry point on the bridge
pub const CALL: &str = "call";
/// Static method entry point on the bridge
pub const CALL_STATIC: &str = "callStatic";
/// Constructor entry point on the bridge
pub const CONSTRUCT: &str = "construct";
/// Finalizer entry point on the bridge
pub const RELEASE: &str = "release";

/// `Object call(Object self, String key, Object[] args)`
pub const CALL_DESCRIPTOR: &str =
    "(Ljava/lang/Object;Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/Object;";
/// `Object callStatic(Class cls, String key, Object[] args)`
pub const CALL_STATIC_DESCRIPTOR: &str =
    "(Ljava/lang/Class;Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/Object;";
/// `void construct(Object self, String key, Object[] args)`
pub const CONSTRUCT_DESCRIPTOR: &str = "(Ljava/lang/Object;Ljava/lang/String;[Ljava/lang/Object;)V";
/// `void release(Object self)`
pub const RELEASE_DESCRIPTOR: &str = "(Ljava/lang/Object;)V";

const OBJECT: &str = "java/lang/Object";

fn local_kind(ty: &TypeDescriptor) -> LocalKind {
    match ty.as_primitive() {
        Some(PrimitiveKind::Long) => LocalKind::Long,
        Some(PrimitiveKind::Float) => LocalKind::Float,
        Some(PrimitiveKind::Double) => LocalKind::Double,
        Some(_) => LocalKind::Int,
        None => LocalKind::Reference,
    }
}

fn return_kind(ty: &TypeDescriptor) -> char {
    match ty {
        TypeDescriptor::Primitive(kind) => kind.descriptor_char(),
        TypeDescriptor::Reference(_) => 'L',
        TypeDescriptor::Array(_) => '[',
    }
}

fn box_internal(kind: PrimitiveKind) -> String {
    kind.box_class().replace('.', "/")
}

/// Writes bodies into one class's constant pool
pub(crate) struct BodyWriter<'a> {
    pub(crate) pool: &'a mut ConstantPool,
    /// Internal name of the bridge class
    pub(crate) bridge: &'a str,
    /// Internal name of the base class
    pub(crate) base: &'a str,
    /// Class index of the class being emitted
    pub(crate) this_class: u16,
}

impl BodyWriter<'_> {
    /// `new Object[]{ args... }` with primitives boxed; parameters start at
    /// `first_slot`
    fn pack_args(&mut self, code: &mut CodeBuilder, sig: &Signature, first_slot: u16) -> Result<(), ClassFileError> {
        let object = self.pool.class(OBJECT)?;
        code.push_int(self.pool, sig.params().len() as i32)?;
        code.anewarray(object);

        let mut slot = first_slot;
        for (i, param) in sig.params().iter().enumerate() {
            code.dup();
            code.push_int(self.pool, i as i32)?;
            code.load(local_kind(param), slot);
            if let Some(kind) = param.as_primitive() {
                let boxed = box_internal(kind);
                let descriptor = format!("({})L{};", kind.descriptor_char(), boxed);
                let value_of = self.pool.methodref(&boxed, "valueOf", &descriptor)?;
                code.invoke(Opcode::Invokestatic, value_of, &descriptor)?;
            }
            code.aastore();
            slot += param.size();
        }
        Ok(())
    }

    fn unbox_and_return(&mut self, code: &mut CodeBuilder, ret: &TypeDescriptor) -> Result<(), ClassFileError> {
        match ret {
            TypeDescriptor::Primitive(PrimitiveKind::Void) => {
                code.pop();
            }
            TypeDescriptor::Primitive(kind) => {
                let boxed = box_internal(*kind);
                let class = self.pool.class(&boxed)?;
                code.checkcast(class);
                if let Some(accessor) = kind.unbox_method() {
                    let descriptor = format!("(){}", kind.descriptor_char());
                    let method = self.pool.methodref(&boxed, accessor, &descriptor)?;
                    code.invoke(Opcode::Invokevirtual, method, &descriptor)?;
                }
            }
            other => {
                if let Some(name) = other.class_constant_name().filter(|n| n != OBJECT) {
                    let class = self.pool.class(&name)?;
                    code.checkcast(class);
                }
            }
        }
        code.return_value(return_kind(ret))?;
        Ok(())
    }

    /// Instance or static method forwarding to `call` / `callStatic`
    pub(crate) fn method(&mut self, key: &str, sig: &Signature, is_static: bool) -> Result<CodeAttribute, ClassFileError> {
        let receiver = u16::from(!is_static);
        let mut code = CodeBuilder::new(sig.param_slots() as u16 + receiver);

        if is_static {
            code.ldc(self.this_class);
        } else {
            code.load(LocalKind::Reference, 0);
        }
        let key_index = self.pool.string(key)?;
        code.ldc(key_index);
        self.pack_args(&mut code, sig, receiver)?;

        let (entry, descriptor) = if is_static {
            (CALL_STATIC, CALL_STATIC_DESCRIPTOR)
        } else {
            (CALL, CALL_DESCRIPTOR)
        };
        let bridge = self.pool.methodref(self.bridge, entry, descriptor)?;
        code.invoke(Opcode::Invokestatic, bridge, descriptor)?;
        self.unbox_and_return(&mut code, sig.ret())?;
        Ok(code.finish())
    }

    /// Constructor chaining to the base no-arg constructor, then `construct`
    pub(crate) fn constructor(&mut self, key: &str, sig: &Signature) -> Result<CodeAttribute, ClassFileError> {
        let mut code = CodeBuilder::new(sig.param_slots() as u16 + 1);

        let super_init = self.pool.methodref(self.base, "<init>", "()V")?;
        code.load(LocalKind::Reference, 0);
        code.invoke(Opcode::Invokespecial, super_init, "()V")?;

        code.load(LocalKind::Reference, 0);
        let key_index = self.pool.string(key)?;
        code.ldc(key_index);
        self.pack_args(&mut code, sig, 1)?;
        let construct = self.pool.methodref(self.bridge, CONSTRUCT, CONSTRUCT_DESCRIPTOR)?;
        code.invoke(Opcode::Invokestatic, construct, CONSTRUCT_DESCRIPTOR)?;
        code.return_value('V')?;
        Ok(code.finish())
    }

    /// `finalize()`: release the binding, then run the base finalizer
    pub(crate) fn finalizer(&mut self) -> Result<CodeAttribute, ClassFileError> {
        let mut code = CodeBuilder::new(1);
        let release = self.pool.methodref(self.bridge, RELEASE, RELEASE_DESCRIPTOR)?;
        let super_finalize = self.pool.methodref(self.base, "finalize", "()V")?;
        code.load(LocalKind::Reference, 0);
        code.invoke(Opcode::Invokestatic, release, RELEASE_DESCRIPTOR)?;
        code.load(LocalKind::Reference, 0);
        code.invoke(Opcode::Invokespecial, super_finalize, "()V")?;
        code.return_value('V')?;
        Ok(code.finish())
    }
}
