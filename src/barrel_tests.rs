//! Barrel synthesis: printing, ordering, manifests and warnings.

#[cfg(test)]
mod tests {
    use crate::barrel::{calculate_barrel, identifier_for_external_file};
    use crate::diagnostic::{DUPLICATE_IDENTIFIER_CODE, MISSING_IDENTIFIER_CODE};
    use crate::error::Result;
    use crate::fs::{FileSystem, MemoryFileSystem};
    use crate::options::{CompilerOptions, JsxEmit, ModuleKind, ModuleResolutionKind};
    use std::path::{Path, PathBuf};

    const COMPONENTS: &str = "/project/src/components";

    fn components() -> MemoryFileSystem {
        MemoryFileSystem::with_files([
            ("/project/src/components/a.ts", "export const value = 1;"),
            ("/project/src/components/b.ts", "export default function Thing() {}"),
        ])
    }

    #[test]
    fn test_components_example() {
        let fs = components();
        let barrel = calculate_barrel(Path::new(COMPONENTS), &CompilerOptions::default(), &fs);

        assert_eq!(
            barrel.text,
            "export { value } from \"./a\";\nexport { default as Thing } from \"./b\";\n"
        );

        let keys: Vec<&String> = barrel.barrel_entities.keys().collect();
        assert_eq!(keys, vec!["value", "Thing"]);

        let value = &barrel.barrel_entities["value"].entity;
        assert_eq!(value.file_name, "a");
        assert!(!value.is_default_export);

        let thing = &barrel.barrel_entities["Thing"].entity;
        assert_eq!(thing.file_name, "b");
        assert!(thing.is_default_export);

        assert_eq!(
            barrel.included_files,
            vec![
                PathBuf::from("/project/src/components/a.ts"),
                PathBuf::from("/project/src/components/b.ts"),
            ]
        );
        assert!(barrel.diagnostics.is_empty());
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let fs = components();
        let options = CompilerOptions::default();

        let first = calculate_barrel(Path::new(COMPONENTS), &options, &fs);
        let second = calculate_barrel(Path::new(COMPONENTS), &options, &fs);

        assert_eq!(first.text, second.text);
        assert_eq!(first.statements, second.statements);
        assert_eq!(first.barrel_entities, second.barrel_entities);
    }

    #[test]
    fn test_ordering_ignores_insertion_order() {
        let forward = MemoryFileSystem::with_files([
            ("/p/c/alpha.ts", "export const a = 1;"),
            ("/p/c/beta.ts", "export const b = 1;"),
            ("/p/c/gamma.ts", "export const g = 1;"),
        ]);
        let backward = MemoryFileSystem::with_files([
            ("/p/c/gamma.ts", "export const g = 1;"),
            ("/p/c/beta.ts", "export const b = 1;"),
            ("/p/c/alpha.ts", "export const a = 1;"),
        ]);
        let options = CompilerOptions::default();

        let left = calculate_barrel(Path::new("/p/c"), &options, &forward);
        let right = calculate_barrel(Path::new("/p/c"), &options, &backward);

        assert_eq!(left.text, right.text);
        assert!(left.text.starts_with("export { a } from \"./alpha\";"));
    }

    #[test]
    fn test_exports_of_one_file_are_coalesced() {
        let fs = MemoryFileSystem::with_files([(
            "/p/c/b.ts",
            "export const zeta = 1;\nexport default function Thing() {}\nexport const alpha = 2;",
        )]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(
            barrel.text,
            "export { alpha, default as Thing, zeta } from \"./b\";\n"
        );
        assert_eq!(barrel.statements.len(), 1);
    }

    #[test]
    fn test_node_next_resolution_uses_output_extensions() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const a = 1;"),
            ("/p/c/b.mts", "export const b = 1;"),
            ("/p/c/view.tsx", "export const View = () => null;"),
        ]);
        let options = CompilerOptions {
            module: ModuleKind::NodeNext,
            module_resolution: ModuleResolutionKind::NodeNext,
            jsx: JsxEmit::Preserve,
            ..CompilerOptions::default()
        };
        let barrel = calculate_barrel(Path::new("/p/c"), &options, &fs);

        assert_eq!(
            barrel.text,
            "export { a } from \"./a.js\";\nexport { b } from \"./b.mjs\";\nexport { View } from \"./view.jsx\";\n"
        );
    }

    #[test]
    fn test_json_files_get_identifier_and_assert_clause() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const a = 1;"),
            ("/p/c/data-file.json", "{ \"x\": 1 }"),
        ]);
        let options = CompilerOptions {
            module: ModuleKind::ESNext,
            resolve_json_module: true,
            ..CompilerOptions::default()
        };
        let barrel = calculate_barrel(Path::new("/p/c"), &options, &fs);

        assert_eq!(
            barrel.text,
            "export { a } from \"./a\";\nexport { default as dataFileJson } from \"./data-file.json\" assert { type: \"json\" };\n"
        );

        let entity = &barrel.barrel_entities["dataFileJson"];
        assert_eq!(entity.entity.file_name, "data-file.json");
        assert!(entity.entity.is_default_export);
        assert!(!entity.entity.is_type_export);
        assert!(entity.is_external());
    }

    #[test]
    fn test_json_files_are_skipped_without_json_resolution() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const a = 1;"),
            ("/p/c/data.json", "{}"),
        ]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.included_files, vec![PathBuf::from("/p/c/a.ts")]);
        assert!(!barrel.barrel_entities.contains_key("dataJson"));
    }

    #[test]
    fn test_anonymous_default_is_excluded_with_one_warning() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const a = 1;"),
            ("/p/c/anon.ts", "export default class {}"),
        ]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.text, "export { a } from \"./a\";\n");
        assert_eq!(barrel.barrel_entities.len(), 1);

        let warnings = &barrel.diagnostics[&PathBuf::from("/p/c/anon.ts")];
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, MISSING_IDENTIFIER_CODE);
        assert_eq!(warnings[0].length, "export default class {}".len() as u32);
    }

    #[test]
    fn test_folder_without_exports_prints_empty_module() {
        let fs = MemoryFileSystem::with_files([("/p/c/anon.ts", "export default () => 1;")]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.text, "export {};");
        assert!(barrel.statements.is_empty());
        assert_eq!(barrel.included_files.len(), 1);
    }

    #[test]
    fn test_colliding_identifiers_keep_the_last_file() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const shared = 1;"),
            ("/p/c/b.ts", "export const shared = 2;"),
        ]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.text, "export { shared } from \"./b\";\n");
        assert_eq!(barrel.barrel_entities["shared"].entity.file_name, "b");

        let warnings = &barrel.diagnostics[&PathBuf::from("/p/c/b.ts")];
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, DUPLICATE_IDENTIFIER_CODE);
        assert!(!barrel.diagnostics.contains_key(&PathBuf::from("/p/c/a.ts")));
    }

    #[test]
    fn test_listing_skips_index_nested_and_foreign_files() {
        let fs = MemoryFileSystem::with_files([
            ("/p/c/a.ts", "export const a = 1;"),
            ("/p/c/index.ts", "export * from './a';"),
            ("/p/c/nested/deep.ts", "export const deep = 1;"),
            ("/p/c/readme.md", "# readme"),
            ("/p/c/legacy.js", "export const legacy = 1;"),
        ]);
        let barrel = calculate_barrel(Path::new("/p/c"), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.included_files, vec![PathBuf::from("/p/c/a.ts")]);

        let with_js = CompilerOptions {
            allow_js: true,
            ..CompilerOptions::default()
        };
        let barrel = calculate_barrel(Path::new("/p/c"), &with_js, &fs);
        assert_eq!(
            barrel.included_files,
            vec![PathBuf::from("/p/c/a.ts"), PathBuf::from("/p/c/legacy.js")]
        );
        assert_eq!(
            barrel.text,
            "export { a } from \"./a\";\nexport { legacy } from \"./legacy\";\n"
        );
    }

    #[test]
    fn test_external_file_identifiers() {
        assert_eq!(identifier_for_external_file("Y-forwards.json"), "YForwardsJson");
        assert_eq!(identifier_for_external_file("z-forwards.json"), "zForwardsJson");
        assert_eq!(identifier_for_external_file("myData.json"), "myDataJson");
        assert_eq!(identifier_for_external_file("logo_dark.svg"), "logoDarkSvg");
        assert_eq!(identifier_for_external_file("6-forwards.json"), "_6ForwardsJson");
        assert_eq!(identifier_for_external_file("icons.v2.json"), "iconsV2Json");
    }

    /// Lists every file but fails to read one of them.
    struct UnreadableFile {
        inner: MemoryFileSystem,
        unreadable: PathBuf,
    }

    impl FileSystem for UnreadableFile {
        fn file_exists(&self, path: &Path) -> bool {
            self.inner.file_exists(path)
        }

        fn read_file(&self, path: &Path) -> Option<String> {
            if path == self.unreadable {
                return None;
            }
            self.inner.read_file(path)
        }

        fn directory_exists(&self, path: &Path) -> bool {
            self.inner.directory_exists(path)
        }

        fn read_directory(&self, dir: &Path) -> Vec<PathBuf> {
            self.inner.read_directory(dir)
        }

        fn write_file(&self, path: &Path, text: &str) -> Result<()> {
            self.inner.write_file(path, text)
        }
    }

    #[test]
    fn test_unreadable_file_is_listed_without_exports() {
        let fs = UnreadableFile {
            inner: components(),
            unreadable: PathBuf::from("/project/src/components/b.ts"),
        };

        let barrel = calculate_barrel(Path::new(COMPONENTS), &CompilerOptions::default(), &fs);

        assert_eq!(barrel.text, "export { value } from \"./a\";\n");
        assert!(!barrel.barrel_entities.contains_key("Thing"));
        assert!(barrel
            .included_files
            .contains(&PathBuf::from("/project/src/components/b.ts")));
    }
}
