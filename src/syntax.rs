//! Synthesized module syntax.
//!
//! Barrels and rewritten imports only ever contain three kinds of statement,
//! so they are modelled as a closed enum and printed directly instead of
//! going through a general purpose code generator.

use std::cmp::Ordering;
use std::fmt::{self, Write};

/// `assert { type: "json" }`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssertClause {
    pub kind: String,
}

impl AssertClause {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl fmt::Display for AssertClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " assert {{ type: \"{}\" }}", self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportSpecifier {
    /// Name in the origin module when it differs from `name` (`default`).
    pub property_name: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpecifier {
    pub is_type_only: bool,
    pub property_name: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDeclaration {
    pub specifiers: Vec<ExportSpecifier>,
    pub module_specifier: String,
    pub assert_clause: Option<AssertClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub default_binding: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub module_specifier: String,
    pub assert_clause: Option<AssertClause>,
}

impl ImportDeclaration {
    pub fn is_side_effect(&self) -> bool {
        self.default_binding.is_none() && self.named.is_empty()
    }
}

/// `const ns = { a: nsa, b: nsb };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceObject {
    pub name: String,
    /// (property, local binding) pairs.
    pub properties: Vec<(String, String)>,
}

/// Object standing in for a CommonJS `require` of a barrel. Each property
/// is a getter requiring its origin module on first access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireObject {
    pub properties: Vec<RequireProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireProperty {
    pub name: String,
    pub module_specifier: String,
    /// Export read off the required module, `None` for the module itself.
    pub export_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Import(ImportDeclaration),
    Export(ExportDeclaration),
    NamespaceObject(NamespaceObject),
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORDERING
// ═══════════════════════════════════════════════════════════════════════════════

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_import_specifiers(a: &ImportSpecifier, b: &ImportSpecifier) -> Ordering {
    a.is_type_only
        .cmp(&b.is_type_only)
        .then_with(|| {
            compare_identifiers(
                a.property_name.as_deref().unwrap_or(&a.name),
                b.property_name.as_deref().unwrap_or(&b.name),
            )
        })
        .then_with(|| compare_identifiers(&a.name, &b.name))
}

fn compare_export_specifiers(a: &ExportSpecifier, b: &ExportSpecifier) -> Ordering {
    compare_identifiers(
        a.property_name.as_deref().unwrap_or(&a.name),
        b.property_name.as_deref().unwrap_or(&b.name),
    )
    .then_with(|| compare_identifiers(&a.name, &b.name))
}

// ═══════════════════════════════════════════════════════════════════════════════
// COALESCING
// ═══════════════════════════════════════════════════════════════════════════════

/// Merges export declarations sharing a module specifier into one, with
/// sorted specifiers. Output is ordered by module specifier.
pub fn coalesce_exports(exports: Vec<ExportDeclaration>) -> Vec<ExportDeclaration> {
    let mut merged: Vec<ExportDeclaration> = Vec::new();

    for export in exports {
        match merged
            .iter_mut()
            .find(|m| m.module_specifier == export.module_specifier)
        {
            Some(existing) => {
                existing.specifiers.extend(export.specifiers);
                if existing.assert_clause.is_none() {
                    existing.assert_clause = export.assert_clause;
                }
            }
            None => merged.push(export),
        }
    }

    for export in &mut merged {
        export.specifiers.sort_by(compare_export_specifiers);
        export.specifiers.dedup();
    }
    merged.sort_by(|a, b| a.module_specifier.cmp(&b.module_specifier));
    merged
}

/// Merges import declarations sharing a module specifier into the fewest
/// declarations: the first default binding is combined with every named
/// binding, further default bindings get their own declaration, and a
/// side-effect import survives only when nothing else imports the module.
/// Output is ordered by module specifier.
pub fn coalesce_imports(imports: Vec<ImportDeclaration>) -> Vec<ImportDeclaration> {
    let mut groups: Vec<(String, Vec<ImportDeclaration>)> = Vec::new();
    for import in imports {
        match groups.iter_mut().find(|(spec, _)| *spec == import.module_specifier) {
            Some((_, group)) => group.push(import),
            None => groups.push((import.module_specifier.clone(), vec![import])),
        }
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = Vec::new();
    for (module_specifier, group) in groups {
        let assert_clause = group.iter().find_map(|i| i.assert_clause.clone());

        let mut defaults: Vec<String> = Vec::new();
        let mut named: Vec<ImportSpecifier> = Vec::new();
        for import in &group {
            if let Some(default) = &import.default_binding {
                if !defaults.contains(default) {
                    defaults.push(default.clone());
                }
            }
            named.extend(import.named.iter().cloned());
        }
        named.sort_by(compare_import_specifiers);
        named.dedup();

        if defaults.is_empty() && named.is_empty() {
            result.push(ImportDeclaration {
                default_binding: None,
                named,
                module_specifier,
                assert_clause,
            });
            continue;
        }

        let mut defaults = defaults.into_iter();
        result.push(ImportDeclaration {
            default_binding: defaults.next(),
            named,
            module_specifier: module_specifier.clone(),
            assert_clause: assert_clause.clone(),
        });
        for default in defaults {
            result.push(ImportDeclaration {
                default_binding: Some(default),
                named: Vec::new(),
                module_specifier: module_specifier.clone(),
                assert_clause: assert_clause.clone(),
            });
        }
    }
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRINTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Text of a module with no statements. Hosts reject a zero-length module
/// where a module is required.
pub const EMPTY_MODULE: &str = "export {};";

fn write_quoted(out: &mut String, value: &str, quote: char) {
    out.push(quote);
    for c in value.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
}

impl ExportDeclaration {
    pub fn print(&self, quote: char) -> String {
        let mut out = String::from("export { ");
        let specifiers: Vec<String> = self
            .specifiers
            .iter()
            .map(|s| match &s.property_name {
                Some(property) => format!("{} as {}", property, s.name),
                None => s.name.clone(),
            })
            .collect();
        out.push_str(&specifiers.join(", "));
        out.push_str(" } from ");
        write_quoted(&mut out, &self.module_specifier, quote);
        if let Some(clause) = &self.assert_clause {
            let _ = write!(out, "{}", clause);
        }
        out.push(';');
        out
    }
}

impl ImportDeclaration {
    pub fn print(&self, quote: char) -> String {
        let mut out = String::from("import ");
        if !self.is_side_effect() {
            let mut clause = Vec::new();
            if let Some(default) = &self.default_binding {
                clause.push(default.clone());
            }
            if !self.named.is_empty() {
                let named: Vec<String> = self
                    .named
                    .iter()
                    .map(|s| {
                        let prefix = if s.is_type_only { "type " } else { "" };
                        match &s.property_name {
                            Some(property) if *property != s.name => {
                                format!("{}{} as {}", prefix, property, s.name)
                            }
                            _ => format!("{}{}", prefix, s.name),
                        }
                    })
                    .collect();
                clause.push(format!("{{ {} }}", named.join(", ")));
            }
            out.push_str(&clause.join(", "));
            out.push_str(" from ");
        }
        write_quoted(&mut out, &self.module_specifier, quote);
        if let Some(clause) = &self.assert_clause {
            let _ = write!(out, "{}", clause);
        }
        out.push(';');
        out
    }
}

impl NamespaceObject {
    pub fn print(&self) -> String {
        if self.properties.is_empty() {
            return format!("const {} = {{}};", self.name);
        }
        let properties: Vec<String> = self
            .properties
            .iter()
            .map(|(key, value)| format!("    {}: {}", key, value))
            .collect();
        format!("const {} = {{\n{}\n}};", self.name, properties.join(",\n"))
    }
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false)
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl RequireObject {
    /// `{ __esModule: true, get a() { return require("./a").a; } }`
    pub fn print(&self, quote: char) -> String {
        let mut out = String::from("{ __esModule: true");
        for property in &self.properties {
            out.push_str(", get ");
            if is_identifier_name(&property.name) {
                out.push_str(&property.name);
            } else {
                write_quoted(&mut out, &property.name, quote);
            }
            out.push_str("() { return require(");
            write_quoted(&mut out, &property.module_specifier, quote);
            out.push(')');
            match &property.export_name {
                Some(export) if is_identifier_name(export) => {
                    out.push('.');
                    out.push_str(export);
                }
                Some(export) => {
                    out.push('[');
                    write_quoted(&mut out, export, quote);
                    out.push(']');
                }
                None => {}
            }
            out.push_str("; }");
        }
        out.push_str(" }");
        out
    }
}

impl Statement {
    pub fn print(&self, quote: char) -> String {
        match self {
            Statement::Import(import) => import.print(quote),
            Statement::Export(export) => export.print(quote),
            Statement::NamespaceObject(object) => object.print(),
        }
    }
}

/// Prints statements one per line, or [`EMPTY_MODULE`] when there are none.
pub fn print_module(statements: &[Statement]) -> String {
    if statements.is_empty() {
        return EMPTY_MODULE.to_string();
    }
    let mut out = String::new();
    for statement in statements {
        out.push_str(&statement.print('"'));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(default: Option<&str>, named: &[&str], module: &str) -> ImportDeclaration {
        ImportDeclaration {
            default_binding: default.map(str::to_string),
            named: named
                .iter()
                .map(|name| ImportSpecifier {
                    is_type_only: false,
                    property_name: None,
                    name: name.to_string(),
                })
                .collect(),
            module_specifier: module.to_string(),
            assert_clause: None,
        }
    }

    #[test]
    fn test_extra_default_bindings_get_own_declaration() {
        let merged = coalesce_imports(vec![
            import(Some("A"), &[], "./b"),
            import(None, &["zeta"], "./b"),
            import(Some("B"), &["Alpha"], "./b"),
            import(None, &["x"], "./a"),
        ]);

        let printed: Vec<String> = merged.iter().map(|i| i.print('\'')).collect();
        assert_eq!(
            printed,
            vec![
                "import { x } from './a';",
                "import A, { Alpha, zeta } from './b';",
                "import B from './b';",
            ]
        );
    }

    #[test]
    fn test_side_effect_import_dropped_when_module_is_bound() {
        let merged = coalesce_imports(vec![
            import(None, &[], "./a"),
            import(None, &["x"], "./a"),
            import(None, &[], "./c"),
        ]);

        let printed: Vec<String> = merged.iter().map(|i| i.print('"')).collect();
        assert_eq!(printed, vec!["import { x } from \"./a\";", "import \"./c\";"]);
    }

    #[test]
    fn test_require_object_getters() {
        let object = RequireObject {
            properties: vec![
                RequireProperty {
                    name: "value".to_string(),
                    module_specifier: "./a".to_string(),
                    export_name: Some("value".to_string()),
                },
                RequireProperty {
                    name: "dataJson".to_string(),
                    module_specifier: "./data.json".to_string(),
                    export_name: None,
                },
                RequireProperty {
                    name: "my-key".to_string(),
                    module_specifier: "./b".to_string(),
                    export_name: Some("my-key".to_string()),
                },
            ],
        };

        assert_eq!(
            object.print('\''),
            "{ __esModule: true, get value() { return require('./a').value; }, \
             get dataJson() { return require('./data.json'); }, \
             get 'my-key'() { return require('./b')['my-key']; } }"
        );
    }

    #[test]
    fn test_empty_namespace_object() {
        let object = NamespaceObject {
            name: "ns".to_string(),
            properties: Vec::new(),
        };
        assert_eq!(object.print(), "const ns = {};");
        assert_eq!(print_module(&[]), EMPTY_MODULE);
    }
}
