//! JSON class summaries
//!
//! One record per class with constructors and methods flattened to one entry
//! per overload; types are written in source form (`java.lang.String[]`).

use crate::class_spec::ClassSpec;
use crate::overload::Overload;
use serde::Serialize;

/// Summary of one declared class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    /// Simple name
    pub name: String,
    /// Base class, `null` when not declared
    pub extends: Option<String>,
    /// Interfaces in order
    pub implements: Vec<String>,
    /// Package
    pub package: String,
    /// Class modifiers
    pub modifiers: String,
    /// Constructor overloads
    pub constructors: Vec<ConstructorSummary>,
    /// Method overloads in declaration order
    pub methods: Vec<MethodSummary>,
}

/// One constructor overload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorSummary {
    /// Parameter types
    pub arg_types: Vec<String>,
    /// Modifiers as rendered in source
    pub modifiers: String,
    /// Thrown types
    pub throws: Vec<String>,
}

/// One method overload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    /// Method name
    pub name: String,
    /// Return type
    pub return_type: String,
    /// Parameter types
    pub arg_types: Vec<String>,
    /// Modifiers as rendered in source
    pub modifiers: String,
    /// Thrown types
    pub throws: Vec<String>,
}

fn arg_types(overload: &Overload) -> Vec<String> {
    overload
        .signature()
        .params()
        .iter()
        .map(|p| p.source_name())
        .collect()
}

fn throws(overload: &Overload) -> Vec<String> {
    overload.throws().iter().map(|t| t.source_name()).collect()
}

impl From<&ClassSpec> for ClassSummary {
    fn from(spec: &ClassSpec) -> Self {
        let constructors = spec
            .constructors()
            .overloads()
            .iter()
            .map(|o| ConstructorSummary {
                arg_types: arg_types(o),
                modifiers: o.source_modifiers(),
                throws: throws(o),
            })
            .collect();

        let methods = spec
            .methods()
            .iter()
            .flat_map(|group| {
                group.overloads().iter().map(move |o| MethodSummary {
                    name: group.name().to_string(),
                    return_type: o.signature().ret().source_name(),
                    arg_types: arg_types(o),
                    modifiers: o.source_modifiers(),
                    throws: throws(o),
                })
            })
            .collect();

        Self {
            name: spec.name().to_string(),
            extends: spec.extends().map(|c| c.source_name()),
            implements: spec.implements().iter().map(|c| c.source_name()).collect(),
            package: spec.package().to_string(),
            modifiers: spec.modifiers().to_string(),
            constructors,
            methods,
        }
    }
}

/// Render summaries of several classes as a pretty-printed JSON array
pub fn to_json(specs: &[ClassSpec]) -> Result<String, serde_json::Error> {
    let summaries: Vec<ClassSummary> = specs.iter().map(ClassSummary::from).collect();
    serde_json::to_string_pretty(&summaries)
}
