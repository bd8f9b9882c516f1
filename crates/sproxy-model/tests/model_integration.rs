//! Integration tests: declaration files through to JSON summaries

use serde_json::{json, Value};
use sproxy_model::summary::to_json;
use sproxy_model::{
    ClassSpec, ClassSpecBuilder, DeclError, MethodDecl, ModuleDecl,
};
use sproxy_types::{ImportTable, TypeCatalogue};

fn build_all(source: &str) -> Vec<ClassSpec> {
    let decl = ModuleDecl::from_str(source).unwrap();
    let cat = decl.catalogue();
    decl.build(&cat)
        .into_iter()
        .map(|(name, result)| result.unwrap_or_else(|e| panic!("{name}: {e}")))
        .collect()
}

fn summaries(source: &str) -> Value {
    serde_json::from_str(&to_json(&build_all(source)).unwrap()).unwrap()
}

const ARGS: &str = r#"
module = "args"

[imports]
Class1 = "com.example.Class1"
Class2 = "com.example.Class2"

[[class]]
name = "Class"

[[class.method]]
name = "simple2"
args = ["Class1", "Class2"]

[[class.method]]
name = "nested2"
args = ["Class1.Class11.Class111"]

[[class]]
name = "Array"

[[class.method]]
name = "class2d"
args = ["Class1[][]"]

[[class]]
name = "Mixed"

[[class.method]]
name = "mixed1"
args = ["int", "Class1", "int[]"]
"#;

#[test]
fn test_args_summary() {
    let out = summaries(ARGS);
    assert_eq!(out[0]["name"], "Class");
    assert_eq!(out[0]["package"], "args");
    assert_eq!(out[0]["extends"], Value::Null);
    assert_eq!(
        out[0]["methods"][0],
        json!({
            "name": "simple2",
            "return_type": "void",
            "arg_types": ["com.example.Class1", "com.example.Class2"],
            "modifiers": "public",
            "throws": []
        })
    );
    assert_eq!(
        out[0]["methods"][1]["arg_types"],
        json!(["com.example.Class1.Class11.Class111"])
    );
    assert_eq!(out[1]["methods"][0]["arg_types"], json!(["com.example.Class1[][]"]));
    assert_eq!(
        out[2]["methods"][0]["arg_types"],
        json!(["int", "com.example.Class1", "int[]"])
    );
    assert_eq!(
        out[2]["constructors"],
        json!([{ "arg_types": [], "modifiers": "public", "throws": [] }])
    );
}

const OVERLOAD: &str = r#"
module = "overload"

[imports]
Class1 = "com.example.Class1"
Class2 = "com.example.Class2"

[[class]]
name = "C"

[[class.method]]
name = "method1"
returns = "int"

[[class.method]]
name = "method1"
returns = "Class1"
args = ["Class2"]

[[class.method]]
name = "method2"

[[class.method]]
name = "method2"
returns = "boolean"
args = ["float"]
modifiers = "protected"

[[class.method]]
name = "method2"
returns = "char"
args = ["Class2.Class21[]"]
throws = ["Class1"]
"#;

#[test]
fn test_overload_summary_keeps_declaration_order() {
    let out = summaries(OVERLOAD);
    let methods = out[0]["methods"].as_array().unwrap();
    let shape: Vec<(String, String)> = methods
        .iter()
        .map(|m| {
            (
                m["name"].as_str().unwrap().to_string(),
                m["return_type"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            ("method1".into(), "int".into()),
            ("method1".into(), "com.example.Class1".into()),
            ("method2".into(), "void".into()),
            ("method2".into(), "boolean".into()),
            ("method2".into(), "char".into()),
        ]
    );
    assert_eq!(methods[3]["modifiers"], "protected");
    assert_eq!(methods[4]["throws"], json!(["com.example.Class1"]));
    assert_eq!(methods[4]["arg_types"], json!(["com.example.Class2.Class21[]"]));
}

const HEADER: &str = r#"
module = "header"

[imports]
ClassA = "com.example.ClassA"
IntA = "com.example.IntA"
IntB = "com.example.IntB"

[[class]]
name = "CaIaIb"
extends = "ClassA"
implements = ["IntA", "IntB"]

[[class]]
name = "IbIa"
implements = ["IntB", "IntA"]
package = ""
modifiers = "public final"

[[class]]
name = "Override"

[[class.method]]
name = "toString"
returns = "String"
override = true
"#;

#[test]
fn test_header_summary() {
    let source = HEADER.replace(
        "[imports]\n",
        "[imports]\nString = \"java.lang.String\"\n",
    );
    let out = summaries(&source);
    assert_eq!(out[0]["extends"], "com.example.ClassA");
    assert_eq!(out[0]["implements"], json!(["com.example.IntA", "com.example.IntB"]));
    assert_eq!(out[1]["implements"], json!(["com.example.IntB", "com.example.IntA"]));
    assert_eq!(out[1]["package"], "");
    assert_eq!(out[1]["modifiers"], "public final");
    assert_eq!(out[2]["methods"][0]["modifiers"], "@Override public");
}

#[test]
fn test_one_failure_does_not_hide_others() {
    let decl = ModuleDecl::from_str(
        r#"
module = "m"
[[class]]
name = "Good"
[[class]]
name = "Bad"
implements = ["Nope"]
[[class]]
name = "AlsoGood"
"#,
    )
    .unwrap();
    let cat = decl.catalogue();
    let results = decl.build(&cat);
    let ok: Vec<bool> = results.iter().map(|(_, r)| r.is_ok()).collect();
    assert_eq!(ok, vec![true, false, true]);
}

#[test]
fn test_error_messages_name_class_and_member() {
    let cat = TypeCatalogue::new(ImportTable::new().with("String", "java.lang.String"));
    let mut b = ClassSpecBuilder::new(&cat, "m", "Adder").unwrap();
    b.method("add", MethodDecl::new("int").arg("int")).unwrap();
    let err = b.method("add", MethodDecl::new("long").arg("int")).unwrap_err();
    assert!(matches!(err, DeclError::AmbiguousOverload { .. }));
    let msg = err.to_string();
    assert!(msg.contains("Adder"), "{msg}");
    assert!(msg.contains("add(int)"), "{msg}");
    assert_eq!(err.class(), "Adder");

    let err = b
        .method("sub", MethodDecl::new("int").arg("Strin"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Adder: sub(Strin): Unknown type: Strin");
}
