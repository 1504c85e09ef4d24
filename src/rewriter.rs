//! Import Rewriter
//!
//! Replaces imports of a barrel with direct imports of the files the barrel
//! re-exports. Works on source text: oxc locates the import declarations and
//! the replacement text is spliced in by span, leaving every other byte of
//! the module untouched.

use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    self, Argument, CallExpression, Expression, ImportDeclarationSpecifier, ModuleExportName,
    Program, Statement as AstStatement,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;

use crate::barrel::ExportedEntities;
use crate::error::{BarrelError, Result};
use crate::exports::EntityWithIdentifier;
use crate::options::CompilerOptions;
use crate::specifier::{barrel_base_specifier, origin_specifier};
use crate::syntax::{
    coalesce_imports, ImportDeclaration, ImportSpecifier, NamespaceObject, RequireObject,
    RequireProperty,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenModule {
    pub code: String,
    pub has_rewritten_imports: bool,
}

/// Rewrites every import of `code` whose specifier `resolve_barrel` maps to
/// a manifest.
///
/// Named imports become direct imports of the origin files, coalesced per
/// module. `import * as ns` imports every entry under a `ns`-prefixed alias
/// and a `const ns = { ... }` object of the value exports is placed after
/// the last import. Bindings the manifest does not know are dropped.
///
/// A `require("<barrel>")` call is replaced by an object of getters, one per
/// value export, each requiring its origin module. Type-only entities are
/// left out entirely when `file_name` is not a TypeScript file.
pub fn rewrite_imports<'r, R>(
    file_name: &Path,
    code: &str,
    options: &CompilerOptions,
    resolve_barrel: R,
) -> Result<RewrittenModule>
where
    R: Fn(&str) -> Option<&'r ExportedEntities>,
{
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file_name)
        .unwrap_or_else(|_| SourceType::default().with_typescript(true))
        .with_module(true);
    let ret = Parser::new(&allocator, code, source_type).parse();

    if ret.panicked {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unrecoverable syntax error".to_string());
        return Err(BarrelError::Parse {
            file: file_name.display().to_string(),
            message,
        });
    }

    let mut rewriter = ImportRewriteVisitor {
        file_name,
        code,
        options,
        resolve_barrel,
        strip_types: !source_type.is_typescript(),
        replacements: Vec::new(),
        namespaces: IndexMap::new(),
        error: None,
    };
    rewriter.visit_program(&ret.program);

    if let Some(error) = rewriter.error {
        return Err(error);
    }

    if rewriter.replacements.is_empty() {
        return Ok(RewrittenModule {
            code: code.to_string(),
            has_rewritten_imports: false,
        });
    }

    let mut replacements = rewriter.replacements;
    if !rewriter.namespaces.is_empty() {
        let position = last_import_end(&ret.program);
        let objects: Vec<String> = rewriter
            .namespaces
            .values()
            .map(|object| format!("\n{}", object.print()))
            .collect();
        replacements.push((position, position, objects.concat()));
    }

    replacements.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = code.to_string();
    for (start, end, replacement) in replacements {
        result.replace_range((start as usize)..(end as usize), &replacement);
    }

    Ok(RewrittenModule {
        code: result,
        has_rewritten_imports: true,
    })
}

fn last_import_end(program: &Program) -> u32 {
    program
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            AstStatement::ImportDeclaration(decl) => Some(decl.span.end),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

fn imported_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

struct ImportRewriteVisitor<'s, R> {
    file_name: &'s Path,
    code: &'s str,
    options: &'s CompilerOptions,
    resolve_barrel: R,
    /// JavaScript output cannot carry type-only imports.
    strip_types: bool,
    replacements: Vec<(u32, u32, String)>,
    namespaces: IndexMap<String, NamespaceObject>,
    error: Option<BarrelError>,
}

impl<'s, 'r, R> ImportRewriteVisitor<'s, R>
where
    R: Fn(&str) -> Option<&'r ExportedEntities>,
{
    /// Direct import of `entity` bound to `local`.
    fn direct_import(
        &self,
        base: &str,
        entity: &EntityWithIdentifier,
        local: String,
        is_type_only: bool,
    ) -> ImportDeclaration {
        let (module_specifier, assert_clause) = origin_specifier(base, &entity.entity, self.options);

        let (default_binding, named) = if entity.entity.is_default_export && !is_type_only {
            (Some(local), Vec::new())
        } else {
            let property_name = if entity.entity.is_default_export {
                Some("default".to_string())
            } else {
                Some(entity.identifier.clone()).filter(|name| *name != local)
            };
            let specifier = ImportSpecifier {
                is_type_only,
                property_name,
                name: local,
            };
            (None, vec![specifier])
        };

        ImportDeclaration {
            default_binding,
            named,
            module_specifier,
            assert_clause,
        }
    }

    fn expand_named(
        &self,
        decl: &ast::ImportDeclaration,
        specifiers: &[ImportDeclarationSpecifier],
        base: &str,
        entities: &ExportedEntities,
    ) -> Vec<ImportDeclaration> {
        let mut imports = Vec::new();
        for specifier in specifiers {
            match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    let Some(entity) = entities.get(&imported_name(&s.imported)) else {
                        continue;
                    };
                    let is_type_only = decl.import_kind.is_type() || s.import_kind.is_type();
                    if self.strip_types && (is_type_only || entity.entity.is_type_export) {
                        continue;
                    }
                    imports.push(self.direct_import(base, entity, s.local.name.to_string(), is_type_only));
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    tracing::debug!(
                        file = %self.file_name.display(),
                        binding = %s.local.name,
                        "dropping default import of a barrel"
                    );
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => {}
            }
        }
        imports
    }

    fn expand_namespace(
        &mut self,
        decl: &ast::ImportDeclaration,
        namespace: &str,
        base: &str,
        entities: &ExportedEntities,
    ) -> Vec<ImportDeclaration> {
        let mut imports = Vec::new();
        let mut properties = Vec::new();

        for (identifier, entity) in entities {
            let local = format!("{}{}", namespace, identifier);
            let is_type_only = decl.import_kind.is_type() || entity.entity.is_type_export;
            if !entity.entity.is_type_export {
                properties.push((identifier.clone(), local.clone()));
            }
            if self.strip_types && is_type_only {
                continue;
            }
            imports.push(self.direct_import(base, entity, local, is_type_only));
        }

        if !decl.import_kind.is_type() {
            self.namespaces.insert(
                namespace.to_string(),
                NamespaceObject {
                    name: namespace.to_string(),
                    properties,
                },
            );
        }
        imports
    }

    fn expand_side_effect(&self, base: &str, entities: &ExportedEntities) -> Vec<ImportDeclaration> {
        entities
            .values()
            .filter(|entity| !entity.entity.is_type_export)
            .map(|entity| {
                let (module_specifier, assert_clause) =
                    origin_specifier(base, &entity.entity, self.options);
                ImportDeclaration {
                    default_binding: None,
                    named: Vec::new(),
                    module_specifier,
                    assert_clause,
                }
            })
            .collect()
    }

    /// Quote character opening the string literal at `offset`.
    fn quote_at(&self, offset: u32) -> Result<char> {
        self.code
            .get(offset as usize..)
            .and_then(|rest| rest.chars().next())
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| BarrelError::InvalidModuleSpecifier {
                file: self.file_name.display().to_string(),
                offset,
            })
    }

    fn rewrite_require(&mut self, call: &CallExpression) -> Result<()> {
        let Expression::Identifier(callee) = &call.callee else {
            return Ok(());
        };
        if callee.name.as_str() != "require" {
            return Ok(());
        }
        let [Argument::StringLiteral(source)] = &call.arguments[..] else {
            return Ok(());
        };
        let specifier = source.value.to_string();
        let Some(entities) = (self.resolve_barrel)(&specifier) else {
            return Ok(());
        };

        let quote = self.quote_at(source.span.start)?;
        let base = barrel_base_specifier(&specifier);
        let properties = entities
            .iter()
            .filter(|(_, entity)| !entity.entity.is_type_export)
            .map(|(identifier, entity)| {
                let (module_specifier, _) = origin_specifier(&base, &entity.entity, self.options);
                let export_name = if entity.is_external() {
                    None
                } else if entity.entity.is_default_export {
                    Some("default".to_string())
                } else {
                    Some(entity.identifier.clone())
                };
                RequireProperty {
                    name: identifier.clone(),
                    module_specifier,
                    export_name,
                }
            })
            .collect();

        tracing::debug!(
            file = %self.file_name.display(),
            specifier = %specifier,
            "rewrote barrel require"
        );
        self.replacements.push((
            call.span.start,
            call.span.end,
            RequireObject { properties }.print(quote),
        ));
        Ok(())
    }

    fn rewrite_declaration(&mut self, decl: &ast::ImportDeclaration) -> Result<()> {
        let specifier = decl.source.value.to_string();
        let Some(entities) = (self.resolve_barrel)(&specifier) else {
            return Ok(());
        };

        let quote = self.quote_at(decl.source.span.start)?;

        let base = barrel_base_specifier(&specifier);
        let imports = match &decl.specifiers {
            None => self.expand_side_effect(&base, entities),
            Some(specifiers) => {
                let namespace = specifiers.iter().find_map(|s| match s {
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns) => {
                        Some(ns.local.name.to_string())
                    }
                    _ => None,
                });
                match namespace {
                    Some(namespace) => self.expand_namespace(decl, &namespace, &base, entities),
                    None => self.expand_named(decl, specifiers, &base, entities),
                }
            }
        };

        let text: Vec<String> = coalesce_imports(imports)
            .iter()
            .map(|import| import.print(quote))
            .collect();

        tracing::debug!(
            file = %self.file_name.display(),
            specifier = %specifier,
            imports = text.len(),
            "rewrote barrel import"
        );
        self.replacements
            .push((decl.span.start, decl.span.end, text.join("\n")));
        Ok(())
    }
}

impl<'a, 's, 'r, R> Visit<'a> for ImportRewriteVisitor<'s, R>
where
    R: Fn(&str) -> Option<&'r ExportedEntities>,
{
    fn visit_import_declaration(&mut self, decl: &ast::ImportDeclaration<'a>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.rewrite_declaration(decl) {
            self.error = Some(error);
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.rewrite_require(call) {
            self.error = Some(error);
            return;
        }
        walk::walk_call_expression(self, call);
    }
}
