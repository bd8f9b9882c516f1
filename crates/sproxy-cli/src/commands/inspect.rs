//! `sproxy inspect`: decode, verify and print a class file

use anyhow::Context;
use sproxy_classfile::flags::{describe_class, describe_method};
use sproxy_classfile::{decode_instructions, digest, verify_class, ClassFile, Constant, Instruction, Opcode};
use std::fmt::Write;
use std::path::Path;

/// Readable form of a pool operand, if the instruction has one
fn pool_comment(class: &ClassFile, instr: &Instruction) -> Option<String> {
    let index = u16::try_from(instr.operand?).ok()?;
    let pool = &class.constant_pool;
    match instr.opcode {
        Opcode::Invokevirtual | Opcode::Invokespecial | Opcode::Invokestatic => {
            let (owner, name, descriptor) = pool.get_member_ref(index).ok()?;
            Some(format!("{}.{}:{}", owner, name, descriptor))
        }
        Opcode::Anewarray | Opcode::Checkcast => pool.get_class_name(index).ok().map(str::to_string),
        Opcode::Ldc | Opcode::LdcW => match pool.get(index)? {
            Constant::String(utf8) => pool.get_utf8(*utf8).ok().map(|s| format!("{:?}", s)),
            Constant::Class(_) => pool.get_class_name(index).ok().map(|s| format!("{}.class", s)),
            Constant::Integer(value) => Some(value.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Render the listing for a decoded class
pub fn render(class: &ClassFile, with_code: bool) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "class {} (version {}.{})",
        class.this_class_name()?,
        class.major_version,
        class.minor_version
    )?;
    writeln!(out, "  flags: {}", describe_class(class.access_flags).join(" "))?;
    if let Some(base) = class.super_class_name()? {
        writeln!(out, "  extends {}", base)?;
    }
    for interface in class.interface_names()? {
        writeln!(out, "  implements {}", interface)?;
    }
    if let Some(source) = class.source_file()? {
        writeln!(out, "  source {}", source)?;
    }

    for method in &class.methods {
        let (name, descriptor) = class.member_signature(method)?;
        writeln!(out)?;
        writeln!(
            out,
            "  {}{} [{}]",
            name,
            descriptor,
            describe_method(method.access_flags).join(" ")
        )?;
        let throws = class.exceptions_of(method)?;
        if !throws.is_empty() {
            writeln!(out, "    throws {}", throws.join(", "))?;
        }

        let Some(code) = class.code_of(method)? else {
            continue;
        };
        writeln!(out, "    max_stack {}, max_locals {}", code.max_stack, code.max_locals)?;
        if !with_code {
            continue;
        }
        let key = format!("{}{}", name, descriptor);
        for instr in decode_instructions(&key, &code.code)? {
            let mut line = format!("    {:>4}: {}", instr.offset, instr.opcode.mnemonic());
            if let Some(operand) = instr.operand {
                write!(line, " {}", operand)?;
            }
            if let Some(comment) = pool_comment(class, &instr) {
                write!(line, " // {}", comment)?;
            }
            writeln!(out, "{}", line)?;
        }
    }
    Ok(out)
}

pub fn execute(path: &Path, with_code: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let class = ClassFile::decode(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;
    verify_class(&class).with_context(|| format!("{} failed verification", path.display()))?;

    print!("{}", render(&class, with_code)?);
    println!();
    println!("sha256 {}", digest(&bytes));
    Ok(())
}
