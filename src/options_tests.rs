//! Project configuration parsing and the on-disk file system.

#[cfg(test)]
mod tests {
    use crate::barrel::calculate_barrel;
    use crate::error::BarrelError;
    use crate::fs::{FileSystem, NodeFileSystem};
    use crate::options::{
        CompilerOptions, JsxEmit, ModuleKind, ModuleResolutionKind, PluginConfig, ProjectConfig,
    };
    use std::fs;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_parse_reads_options_and_plugin_entry() {
        let text = r#"{
            "compilerOptions": {
                "module": "NodeNext",
                "moduleResolution": "nodenext",
                "resolveJsonModule": true,
                "strict": true,
                "plugins": [
                    { "name": "some-other-plugin" },
                    { "transform": "virtual-barrel", "shouldTransformImports": false }
                ]
            },
            "include": ["src/**/*", "lib"]
        }"#;

        let config = ProjectConfig::parse(text, PathBuf::from("/p")).expect("config");

        assert_eq!(config.compiler_options.module, ModuleKind::NodeNext);
        assert_eq!(
            config.compiler_options.module_resolution,
            ModuleResolutionKind::NodeNext
        );
        assert!(config.compiler_options.resolve_json_module);
        assert!(!config.compiler_options.allow_js);
        assert!(!config.plugin.should_transform_imports);
        assert_eq!(
            config.project_dirs,
            vec![PathBuf::from("/p/src"), PathBuf::from("/p/lib")]
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = ProjectConfig::parse("{}", PathBuf::from("/p")).expect("config");

        assert_eq!(config.compiler_options, CompilerOptions::default());
        assert_eq!(config.plugin, PluginConfig::default());
        assert!(config.plugin.should_transform_imports);
        assert_eq!(config.project_dirs, vec![PathBuf::from("/p")]);
    }

    #[test]
    fn test_unknown_option_value_is_rejected() {
        let error = ProjectConfig::parse(
            r#"{ "compilerOptions": { "module": "amd2" } }"#,
            PathBuf::from("/p"),
        )
        .unwrap_err();
        assert!(matches!(error, BarrelError::Json(_)));

        let direct = "react-native-web".parse::<JsxEmit>().unwrap_err();
        assert!(direct.to_string().contains("jsx"));
    }

    #[test]
    fn test_enum_values_are_case_insensitive() {
        assert_eq!("ESNext".parse::<ModuleKind>().ok(), Some(ModuleKind::ESNext));
        assert_eq!("es6".parse::<ModuleKind>().ok(), Some(ModuleKind::ES2015));
        assert_eq!(
            "Node".parse::<ModuleResolutionKind>().ok(),
            Some(ModuleResolutionKind::Node10)
        );
        assert_eq!("react-jsx".parse::<JsxEmit>().ok(), Some(JsxEmit::ReactJsx));
    }

    #[test]
    fn test_option_predicates() {
        let commonjs = CompilerOptions::default();
        assert!(!commonjs.is_es_module());
        assert!(!commonjs.is_node_modern_resolution());
        assert!(!commonjs.supports_import_attributes());

        let es2020 = CompilerOptions {
            module: ModuleKind::ES2020,
            module_resolution: ModuleResolutionKind::Bundler,
            ..CompilerOptions::default()
        };
        assert!(es2020.is_es_module());
        assert!(!es2020.is_node_modern_resolution());
        assert!(!es2020.supports_import_attributes());

        let node16 = CompilerOptions {
            module: ModuleKind::Node16,
            module_resolution: ModuleResolutionKind::Node16,
            ..CompilerOptions::default()
        };
        assert!(node16.is_node_modern_resolution());
        assert!(!node16.supports_import_attributes());
        assert!(!node16.emits_loader_dependencies());

        let esnext = CompilerOptions {
            module: ModuleKind::ESNext,
            ..CompilerOptions::default()
        };
        assert!(esnext.supports_import_attributes());

        let amd = CompilerOptions {
            module: ModuleKind::AMD,
            ..CompilerOptions::default()
        };
        assert!(amd.emits_loader_dependencies());
        assert!(!commonjs.emits_loader_dependencies());
    }

    #[test]
    fn test_load_uses_config_folder_as_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tsconfig.json");
        fs::write(&path, r#"{ "compilerOptions": { "allowJs": true } }"#).expect("write");

        let config = ProjectConfig::load(&path).expect("config");

        assert_eq!(config.root_dir, dir.path());
        assert!(config.compiler_options.allow_js);
        assert_eq!(config.project_dirs, vec![dir.path().to_path_buf()]);

        assert!(matches!(
            ProjectConfig::load(&dir.path().join("missing.json")),
            Err(BarrelError::Io(_))
        ));
    }

    #[test]
    fn test_disk_listing_is_sorted_and_files_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fs_impl = NodeFileSystem;
        fs_impl
            .write_file(&dir.path().join("b.ts"), "export const b = 1;")
            .expect("write");
        fs_impl
            .write_file(&dir.path().join("a.ts"), "export const a = 1;")
            .expect("write");
        fs_impl
            .write_file(&dir.path().join("nested/c.ts"), "export const c = 1;")
            .expect("write");

        let listing = fs_impl.read_directory(dir.path());

        assert_eq!(
            listing,
            vec![dir.path().join("a.ts"), dir.path().join("b.ts")]
        );
        assert!(fs_impl.directory_exists(&dir.path().join("nested")));
        assert!(fs_impl.file_exists(&dir.path().join("nested/c.ts")));
        assert!(!fs_impl.file_exists(Path::new("/definitely/not/here.ts")));
    }

    #[test]
    fn test_barrel_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("button.tsx"), "export function Button() {}").expect("write");
        fs::write(dir.path().join("theme.ts"), "export type Theme = 'light';").expect("write");

        let calculation = calculate_barrel(dir.path(), &CompilerOptions::default(), &NodeFileSystem);

        assert_eq!(
            calculation.text,
            "export { Button } from \"./button\";\nexport { Theme } from \"./theme\";\n"
        );
        assert_eq!(calculation.included_files.len(), 2);
    }
}
