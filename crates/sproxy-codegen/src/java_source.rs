//! Java source stubs
//!
//! Renders a class spec as compilable Java with empty member bodies, so
//! other Java code can be compiled against the proxy before the real class
//! file exists.

use sproxy_model::{ClassSpec, Overload, CONSTRUCTOR_NAME};
use sproxy_types::{ClassName, TypeDescriptor};
use std::fmt::Write;

const INDENT: usize = 4;

struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    /// Write one line with runs of whitespace collapsed
    fn line(&mut self, text: &str) {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            self.out.extend(std::iter::repeat(' ').take(self.indent));
            self.out.push_str(&collapsed);
        }
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.indent += INDENT;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(INDENT);
        self.line("}");
    }
}

fn optional(prefix: &str, items: &[String]) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("{} {}", prefix, items.join(", "))
    }
}

fn source_names(names: &[ClassName]) -> Vec<String> {
    names.iter().map(ClassName::source_name).collect()
}

fn args_and_throws(overload: &Overload) -> String {
    let mut args = String::new();
    for (i, ty) in overload.signature().params().iter().enumerate() {
        if i > 0 {
            args.push_str(", ");
        }
        let _ = write!(args, "{} arg{}", ty.source_name(), i);
    }
    let throws = optional("throws", &source_names(overload.throws()));
    if throws.is_empty() {
        format!("({})", args)
    } else {
        format!("({}) {}", args, throws)
    }
}

/// Java source for `spec`
pub fn java_source(spec: &ClassSpec) -> String {
    let mut w = SourceWriter {
        out: String::new(),
        indent: 0,
    };

    if !spec.package().is_empty() {
        w.line(&format!("package {};", spec.package()));
        w.line("");
    }

    let extends = spec
        .extends()
        .map(|base| format!("extends {}", base.source_name()))
        .unwrap_or_default();
    w.open(&format!(
        "{} class {} {} {}",
        spec.modifiers(),
        spec.name(),
        extends,
        optional("implements", &source_names(spec.implements()))
    ));
    w.line("");

    for (name, overload) in spec.members() {
        if name == CONSTRUCTOR_NAME {
            w.open(&format!(
                "{} {}{}",
                overload.modifiers(),
                spec.name(),
                args_and_throws(overload)
            ));
        } else if overload.modifiers().is_bodiless() {
            w.line(&format!(
                "{} {} {}{};",
                overload.source_modifiers(),
                overload.signature().ret().source_name(),
                name,
                args_and_throws(overload)
            ));
            w.line("");
            continue;
        } else {
            w.open(&format!(
                "{} {} {}{}",
                overload.source_modifiers(),
                overload.signature().ret().source_name(),
                name,
                args_and_throws(overload)
            ));
            if let Some(value) = default_return(overload.signature().ret()) {
                w.line(&format!("return {};", value));
            }
        }
        w.close();
        w.line("");
    }

    w.close();
    w.out
}

/// Placeholder return statement so stubs with non-void members compile
fn default_return(ty: &TypeDescriptor) -> Option<&'static str> {
    use sproxy_types::PrimitiveKind::*;
    match ty.as_primitive() {
        Some(Void) => None,
        Some(Boolean) => Some("false"),
        Some(Char) => Some("'\\0'"),
        Some(Byte | Short | Int | Long | Float | Double) => Some("0"),
        None => Some("null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sproxy_model::{ClassSpecBuilder, ConstructorDecl, MethodDecl};
    use sproxy_types::{ImportTable, TypeCatalogue};

    #[test]
    fn test_render() {
        let catalogue = TypeCatalogue::new(
            ImportTable::new()
                .with("String", "java.lang.String")
                .with("Runnable", "java.lang.Runnable")
                .with("Class1", "com.example.Class1"),
        );
        let mut b = ClassSpecBuilder::new(&catalogue, "pkg.sub", "Adder").unwrap();
        b.implements("Runnable").unwrap();
        b.constructor(ConstructorDecl::new().arg("int")).unwrap();
        b.method("add", MethodDecl::new("int").arg("int").throws("Class1"))
            .unwrap();
        b.method("run", MethodDecl::new("void").overriding()).unwrap();
        b.method("names", MethodDecl::new("String[][]").modifiers("protected static"))
            .unwrap();
        let spec = b.build().unwrap();

        let expected = "\
package pkg.sub;

public class Adder implements java.lang.Runnable {

    public Adder(int arg0) {
    }

    public int add(int arg0) throws com.example.Class1 {
        return 0;
    }

    @Override public void run() {
    }

    protected static java.lang.String[][] names() {
        return null;
    }

}
";
        assert_eq!(java_source(&spec), expected);
    }

    #[test]
    fn test_default_package_and_abstract() {
        let catalogue = TypeCatalogue::new(ImportTable::new());
        let mut b = ClassSpecBuilder::new(&catalogue, "", "Shape").unwrap();
        b.modifiers(Some("public abstract")).unwrap();
        b.method("area", MethodDecl::new("double").modifiers("public abstract"))
            .unwrap();
        b.method("peek", MethodDecl::new("int").modifiers("native").throws("java.io.IOException"))
            .unwrap();
        let source = java_source(&b.build().unwrap());
        assert!(source.starts_with("public abstract class Shape {\n"));
        assert!(source.contains("    public abstract double area();\n"));
        assert!(source.contains("    native int peek() throws java.io.IOException;\n"));
    }
}
