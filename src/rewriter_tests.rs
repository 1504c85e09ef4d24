//! Import rewriting against calculated manifests.

#[cfg(test)]
mod tests {
    use crate::barrel::{calculate_barrel, ExportedEntities};
    use crate::fs::MemoryFileSystem;
    use crate::options::{CompilerOptions, ModuleKind, ModuleResolutionKind};
    use crate::rewriter::rewrite_imports;
    use std::path::Path;

    fn manifest(files: &[(&str, &str)], options: &CompilerOptions) -> ExportedEntities {
        let fs = MemoryFileSystem::with_files(files.iter().copied());
        calculate_barrel(Path::new("/p/src/components"), options, &fs).barrel_entities
    }

    fn components(options: &CompilerOptions) -> ExportedEntities {
        manifest(
            &[
                ("/p/src/components/a.ts", "export const value = 1;\nexport const other = 2;"),
                ("/p/src/components/b.ts", "export default function Thing() {}"),
                ("/p/src/components/c.ts", "export interface Shape { size: number }"),
            ],
            options,
        )
    }

    fn rewrite(code: &str, specifier: &str, entities: &ExportedEntities, options: &CompilerOptions) -> String {
        let resolve = |s: &str| (s == specifier).then_some(entities);
        rewrite_imports(Path::new("/p/src/main.ts"), code, options, resolve)
            .expect("rewrite")
            .code
    }

    #[test]
    fn test_named_imports_become_direct_imports() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import { value, Thing } from './components';\nconsole.log(value, Thing);\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(
            result,
            "import { value } from './components/a';\nimport Thing from './components/b';\nconsole.log(value, Thing);\n"
        );
        assert!(!result.contains("'./components'"));
    }

    #[test]
    fn test_imports_from_one_file_are_coalesced() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import { value, other } from \"./components\";\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(result, "import { other, value } from \"./components/a\";\n");
    }

    #[test]
    fn test_aliases_are_kept_and_unknown_bindings_dropped() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import { value as v, missing, Thing as Widget } from './components';\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(
            result,
            "import { value as v } from './components/a';\nimport Widget from './components/b';\n"
        );
    }

    #[test]
    fn test_type_only_named_import() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import type { Shape } from './components';\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(result, "import { type Shape } from './components/c';\n");
    }

    #[test]
    fn test_namespace_import_injects_value_object() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import * as ns from './components';\nns.value;\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(
            result,
            "import { other as nsother, value as nsvalue } from './components/a';\n\
             import nsThing from './components/b';\n\
             import { type Shape as nsShape } from './components/c';\n\
             const ns = {\n    value: nsvalue,\n    other: nsother,\n    Thing: nsThing\n};\n\
             ns.value;\n"
        );
    }

    #[test]
    fn test_namespace_object_follows_last_import() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import * as ns from './components';\nimport React from 'react';\n\nrender(ns, React);\n";

        let result = rewrite(code, "./components", &entities, &options);

        let react = result.find("import React from 'react';").expect("react import");
        let object = result.find("const ns = {").expect("namespace object");
        let usage = result.find("render(ns, React);").expect("usage");
        assert!(react < object && object < usage);
        assert_eq!(result.matches("const ns =").count(), 1);
    }

    #[test]
    fn test_unrelated_imports_pass_through() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import React from 'react';\nimport { helper } from './utils';\n";

        let rewritten = rewrite_imports(Path::new("/p/src/main.ts"), code, &options, |s: &str| {
            (s == "./components").then_some(&entities)
        })
        .expect("rewrite");

        assert_eq!(rewritten.code, code);
        assert!(!rewritten.has_rewritten_imports);
    }

    #[test]
    fn test_node_next_specifiers_carry_output_extension() {
        let options = CompilerOptions {
            module: ModuleKind::NodeNext,
            module_resolution: ModuleResolutionKind::NodeNext,
            ..CompilerOptions::default()
        };
        let entities = components(&options);
        let code = "import { value, Thing } from './components/index.js';\n";

        let result = rewrite(code, "./components/index.js", &entities, &options);

        assert_eq!(
            result,
            "import { value } from './components/a.js';\nimport Thing from './components/b.js';\n"
        );
    }

    #[test]
    fn test_json_imports_carry_assert_clause() {
        let options = CompilerOptions {
            module: ModuleKind::ESNext,
            resolve_json_module: true,
            ..CompilerOptions::default()
        };
        let entities = manifest(&[("/p/src/components/data.json", "{}")], &options);
        let code = "import { dataJson } from './components';\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(
            result,
            "import dataJson from './components/data.json' assert { type: \"json\" };\n"
        );
    }

    #[test]
    fn test_side_effect_import_touches_every_origin() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import './components';\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert_eq!(result, "import './components/a';\nimport './components/b';\n");
    }

    #[test]
    fn test_parent_folder_specifier() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import { value } from '..';\n";

        let result = rewrite(code, "..", &entities, &options);

        assert_eq!(result, "import { value } from '../a';\n");
    }

    fn rewrite_javascript(code: &str, entities: &ExportedEntities, options: &CompilerOptions) -> String {
        let resolve = |s: &str| (s == "./components").then_some(entities);
        rewrite_imports(Path::new("/p/dist/main.js"), code, options, resolve)
            .expect("rewrite")
            .code
    }

    #[test]
    fn test_javascript_output_drops_type_entities() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import { value, Shape } from './components';\nimport * as ns from './components';\n";

        let result = rewrite_javascript(code, &entities, &options);

        assert!(!result.contains("Shape"));
        assert!(!result.contains("type "));
        assert!(result.starts_with("import { value } from './components/a';\n"));
        assert!(result.contains("import { other as nsother, value as nsvalue } from './components/a';"));
        assert!(result.contains("import nsThing from './components/b';"));
    }

    #[test]
    fn test_typescript_namespace_keeps_type_imports() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "import * as ns from './components';\n";

        let result = rewrite(code, "./components", &entities, &options);

        assert!(result.contains("import { type Shape as nsShape } from './components/c';"));
    }

    #[test]
    fn test_require_becomes_lazy_object() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "const components_1 = require(\"./components\");\nconsole.log(components_1.value);\n";

        let result = rewrite_javascript(code, &entities, &options);

        assert_eq!(
            result,
            "const components_1 = { __esModule: true, \
             get value() { return require(\"./components/a\").value; }, \
             get other() { return require(\"./components/a\").other; }, \
             get Thing() { return require(\"./components/b\").default; } };\n\
             console.log(components_1.value);\n"
        );
    }

    #[test]
    fn test_nested_require_is_rewritten() {
        let options = CompilerOptions::default();
        let entities = components(&options);
        let code = "const c = __importStar(require('./components'));\nconst other = require('./other');\n";

        let result = rewrite_javascript(code, &entities, &options);

        assert!(result.starts_with(
            "const c = __importStar({ __esModule: true, get value() { return require('./components/a').value; }"
        ));
        assert!(result.ends_with("const other = require('./other');\n"));
    }

    #[test]
    fn test_require_of_external_file_returns_module() {
        let options = CompilerOptions {
            resolve_json_module: true,
            ..CompilerOptions::default()
        };
        let entities = manifest(&[("/p/src/components/data.json", "{}")], &options);
        let code = "const data = require('./components').dataJson;\n";

        let result = rewrite_javascript(code, &entities, &options);

        assert_eq!(
            result,
            "const data = { __esModule: true, get dataJson() { return require('./components/data.json'); } }.dataJson;\n"
        );
    }
}
