//! `mod.rs` files tying generated modules together.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::codegen::GENERATED_HEADER;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModDecl {
    name: String,
    test_only: bool,
    /// Backed by a directory with its own `mod.rs` rather than a file
    dir: bool,
}

/// Child modules of every generated module directory.
#[derive(Debug, Default)]
pub struct ModuleTree {
    modules: BTreeMap<String, Vec<ModDecl>>,
}

impl ModuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the file module `child` inside `module_path`, and
    /// `module_path` itself inside its ancestors.
    ///
    /// Fails with the clashing module path when a name is used both for a
    /// file module and for a module directory.
    pub fn add(&mut self, module_path: &str, child: &str, test_only: bool) -> Result<(), String> {
        self.declare(module_path, child, test_only, false)?;

        let segments: Vec<&str> = module_path.split("::").collect();
        for depth in 1..segments.len() {
            let parent = segments[..depth].join("::");
            self.declare(&parent, segments[depth], test_only, true)?;
        }
        Ok(())
    }

    fn declare(&mut self, module_path: &str, child: &str, test_only: bool, dir: bool) -> Result<(), String> {
        let children = self.modules.entry(module_path.to_string()).or_default();
        match children.iter_mut().find(|decl| decl.name == child) {
            Some(decl) if decl.dir != dir => return Err(format!("{}::{}", module_path, child)),
            // A module needed outside tests stays unconditional
            Some(decl) => decl.test_only &= test_only,
            None => children.push(ModDecl {
                name: child.to_string(),
                test_only,
                dir,
            }),
        }
        Ok(())
    }

    /// Module paths in sorted order.
    pub fn module_paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Generate the `mod.rs` of one module.
    pub fn generate<W: Write>(&self, writer: &mut W, module_path: &str) -> io::Result<()> {
        writeln!(writer, "{}", GENERATED_HEADER)?;
        writeln!(writer)?;
        for decl in self.modules.get(module_path).into_iter().flatten() {
            if decl.test_only {
                writeln!(writer, "#[cfg(test)]")?;
                writeln!(writer, "mod {};", decl.name)?;
            } else {
                writeln!(writer, "pub mod {};", decl.name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tree: &ModuleTree, module_path: &str) -> String {
        let mut out = Vec::new();
        tree.generate(&mut out, module_path).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_nested_test_module() {
        let mut tree = ModuleTree::new();
        tree.add("dao", "building", false).unwrap();
        tree.add("dao", "building_dao", false).unwrap();
        tree.add("dao::test", "building_dao_test", true).unwrap();

        assert_eq!(tree.module_paths().collect::<Vec<_>>(), vec!["dao", "dao::test"]);

        let dao = render(&tree, "dao");
        assert!(dao.ends_with("pub mod building;\npub mod building_dao;\n#[cfg(test)]\nmod test;\n"));

        let test = render(&tree, "dao::test");
        assert!(test.ends_with("#[cfg(test)]\nmod building_dao_test;\n"));
    }

    #[test]
    fn test_shared_ancestor_stays_public() {
        let mut tree = ModuleTree::new();
        tree.add("gen::test", "a_test", true).unwrap();
        tree.add("gen::model", "a", false).unwrap();

        let root = render(&tree, "gen");
        assert!(root.contains("#[cfg(test)]\nmod test;\n"));
        assert!(root.contains("pub mod model;\n"));
    }

    #[test]
    fn test_duplicate_declaration_ignored() {
        let mut tree = ModuleTree::new();
        tree.add("dao", "schema", false).unwrap();
        tree.add("dao", "schema", false).unwrap();
        assert_eq!(render(&tree, "dao").matches("pub mod schema;").count(), 1);
    }

    #[test]
    fn test_file_and_directory_with_same_name() {
        let mut tree = ModuleTree::new();
        tree.add("dao", "test", false).unwrap();
        assert_eq!(tree.add("dao::test", "test_dao_test", true), Err("dao::test".to_string()));

        let mut tree = ModuleTree::new();
        tree.add("gen::model", "a", false).unwrap();
        assert_eq!(tree.add("gen", "model", false), Err("gen::model".to_string()));
    }
}
