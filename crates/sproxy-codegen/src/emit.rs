//! Class emission

use crate::access::{class_flags, member_flags};
use crate::body::BodyWriter;
use crate::error::EmitError;
use crate::options::EmitOptions;
use sproxy_classfile::class::{exceptions_info, CODE, EXCEPTIONS, SOURCE_FILE};
use sproxy_classfile::constants::MAX_ENTRIES;
use sproxy_classfile::flags::ACC_PROTECTED;
use sproxy_classfile::{Attribute, ClassFile, ClassFileError, ConstantPool, MemberInfo};
use sproxy_model::class_spec::FINALIZE_NAME;
use sproxy_model::{ClassSpec, Overload, CONSTRUCTOR_NAME};
use sproxy_types::{ClassName, TypeDescriptor};

/// Parameter slots a method may use, including `this`
pub const MAX_PARAMETER_SLOTS: usize = 255;

const THROWABLE: &str = "java/lang/Throwable";

/// Turns class specs into class files.
///
/// Output is a pure function of the spec and the options: emitting the same
/// spec twice yields identical bytes.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    options: EmitOptions,
}

impl Emitter {
    /// Emitter with the given options
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Emit one class
    pub fn emit(&self, spec: &ClassSpec) -> Result<ClassFile, EmitError> {
        let class_name = spec.qualified_name();
        let class = class_name.as_str().to_string();
        self.check_references(spec, &class)?;

        let header_err = |e| fail(&class, "<class>", e);
        let bridge = ClassName::new(self.options.bridge.as_str()).internal_name();
        let base = spec.base().internal_name();

        let mut pool = ConstantPool::new();
        let this_class = pool.class(&class_name.internal_name()).map_err(header_err)?;
        let super_class = pool.class(&base).map_err(header_err)?;

        let mut interfaces = Vec::with_capacity(spec.implements().len() + 1);
        for interface in spec.implements() {
            interfaces.push(pool.class(&interface.internal_name()).map_err(header_err)?);
        }
        if let Some(marker) = &self.options.marker {
            if !spec.implements().iter().any(|i| i.as_str() == marker) {
                let internal = ClassName::new(marker.as_str()).internal_name();
                interfaces.push(pool.class(&internal).map_err(header_err)?);
            }
        }

        let mut methods = Vec::new();
        for (name, overload) in spec.members() {
            let key = overload.signature().member_key(name);
            self.check_limits(&class, &key, overload)?;
            let mut bodies = BodyWriter {
                pool: &mut pool,
                bridge: &bridge,
                base: &base,
                this_class,
            };
            let method = member(&mut bodies, name, &key, overload).map_err(|e| fail(&class, &key, e))?;
            methods.push(method);
        }

        if self.options.finalize && !spec.declares_finalize() {
            let key = format!("{}()V", FINALIZE_NAME);
            let mut bodies = BodyWriter {
                pool: &mut pool,
                bridge: &bridge,
                base: &base,
                this_class,
            };
            methods.push(finalizer(&mut bodies).map_err(|e| fail(&class, &key, e))?);
        }

        let mut attributes = Vec::new();
        if let Some(source) = spec.source_file().filter(|_| self.options.source_file) {
            let name_index = pool.utf8(SOURCE_FILE).map_err(header_err)?;
            let value = pool.utf8(source).map_err(header_err)?;
            attributes.push(Attribute {
                name_index,
                info: value.to_be_bytes().to_vec(),
            });
        }

        log::debug!(
            "emitted {} ({} methods, {} constants)",
            class,
            methods.len(),
            pool.len()
        );

        Ok(ClassFile {
            minor_version: 0,
            major_version: self.options.major_version,
            constant_pool: pool,
            access_flags: class_flags(spec.modifiers()),
            this_class,
            super_class,
            interfaces,
            fields: Vec::new(),
            methods,
            attributes,
        })
    }

    /// Emit one class and encode it
    pub fn emit_bytes(&self, spec: &ClassSpec) -> Result<Vec<u8>, EmitError> {
        let class = self.emit(spec)?;
        class
            .encode()
            .map_err(|e| fail(spec.qualified_name().as_str(), "<class>", e))
    }

    fn check_references(&self, spec: &ClassSpec, class: &str) -> Result<(), EmitError> {
        let unresolved = |name: &str| EmitError::UnresolvedReference {
            class: class.to_string(),
            name: name.to_string(),
        };

        let mut names = vec![spec.qualified_name(), ClassName::new(self.options.bridge.as_str())];
        names.extend(self.options.marker.as_deref().map(ClassName::new));
        for ty in spec.referenced_types() {
            let element = match &ty {
                TypeDescriptor::Array(array) => array.element().clone(),
                other => other.clone(),
            };
            if let Some(name) = element.as_reference() {
                names.push(name.clone());
            }
        }

        match names.iter().find(|n| !n.is_well_formed()) {
            Some(bad) => Err(unresolved(bad.as_str())),
            None => Ok(()),
        }
    }

    fn check_limits(&self, class: &str, key: &str, overload: &Overload) -> Result<(), EmitError> {
        let receiver = usize::from(!overload.modifiers().is_static());
        let slots = overload.signature().param_slots() as usize + receiver;
        if slots > MAX_PARAMETER_SLOTS {
            return Err(EmitError::LimitExceeded {
                class: class.to_string(),
                member: key.to_string(),
                what: "parameter slots",
                actual: slots,
                limit: MAX_PARAMETER_SLOTS,
            });
        }
        Ok(())
    }
}

fn fail(class: &str, member: &str, source: ClassFileError) -> EmitError {
    match source {
        ClassFileError::PoolOverflow => EmitError::LimitExceeded {
            class: class.to_string(),
            member: member.to_string(),
            what: "constant pool entries",
            actual: MAX_ENTRIES + 2,
            limit: MAX_ENTRIES + 1,
        },
        source => EmitError::ClassFile {
            class: class.to_string(),
            source,
        },
    }
}

fn member(bodies: &mut BodyWriter<'_>, name: &str, key: &str, overload: &Overload) -> Result<MemberInfo, ClassFileError> {
    let sig = overload.signature();
    let modifiers = overload.modifiers();

    let mut attributes = Vec::new();
    if !modifiers.is_bodiless() {
        let code = if name == CONSTRUCTOR_NAME {
            bodies.constructor(key, sig)?
        } else {
            bodies.method(key, sig, modifiers.is_static())?
        };
        attributes.push(Attribute {
            name_index: bodies.pool.utf8(CODE)?,
            info: code.to_info()?,
        });
    }

    if !overload.throws().is_empty() {
        let classes = overload
            .throws()
            .iter()
            .map(|t| bodies.pool.class(&t.internal_name()))
            .collect::<Result<Vec<_>, _>>()?;
        attributes.push(Attribute {
            name_index: bodies.pool.utf8(EXCEPTIONS)?,
            info: exceptions_info(&classes),
        });
    }

    Ok(MemberInfo {
        access_flags: member_flags(modifiers),
        name_index: bodies.pool.utf8(name)?,
        descriptor_index: bodies.pool.utf8(&sig.descriptor())?,
        attributes,
    })
}

fn finalizer(bodies: &mut BodyWriter<'_>) -> Result<MemberInfo, ClassFileError> {
    let code = bodies.finalizer()?;
    let throwable = bodies.pool.class(THROWABLE)?;
    Ok(MemberInfo {
        access_flags: ACC_PROTECTED,
        name_index: bodies.pool.utf8(FINALIZE_NAME)?,
        descriptor_index: bodies.pool.utf8("()V")?,
        attributes: vec![
            Attribute {
                name_index: bodies.pool.utf8(CODE)?,
                info: code.to_info()?,
            },
            Attribute {
                name_index: bodies.pool.utf8(EXCEPTIONS)?,
                info: exceptions_info(&[throwable]),
            },
        ],
    })
}

/// Emit with default options
pub fn emit(spec: &ClassSpec) -> Result<ClassFile, EmitError> {
    Emitter::default().emit(spec)
}

/// Emit and encode with default options
pub fn emit_bytes(spec: &ClassSpec) -> Result<Vec<u8>, EmitError> {
    Emitter::default().emit_bytes(spec)
}
