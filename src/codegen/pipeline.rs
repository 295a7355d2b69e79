//! Code generation pipeline and extension hooks.
//!
//! [`CodegenPipeline`] renders every artifact for a schema, merges KEEP
//! regions with files already on disk and writes only what changed.
//! [`CodegenCallbacks`] lets callers run extra steps between phases.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codegen::dao_master_rs::generate_dao_master;
use crate::codegen::dao_rs::generate_dao;
use crate::codegen::dao_test_rs::generate_dao_test;
use crate::codegen::entity_rs::generate_entity;
use crate::codegen::mod_rs::ModuleTree;
use crate::codegen::names::EntityNames;
use crate::codegen::schema_rs::generate_schema;
use crate::codegen::utils::module_dir;
use crate::codegen::{fs_utils, keep_sections};
use crate::error::{Error, Result};
use crate::schema::Schema;

/// Callback trait for extra generation steps
///
/// # Example
///
/// ```ignore
/// struct Formatter;
///
/// impl CodegenCallbacks for Formatter {
///     fn finalize(&self, report: &GenerationReport) {
///         run_rustfmt(&report.written);
///     }
/// }
/// ```
pub trait CodegenCallbacks {
    /// Called after entity modules are written
    fn after_entities(&self, schema: &Schema, output_dir: &Path) {
        let _ = (schema, output_dir);
    }

    /// Called after DAOs, the Diesel schema and the DAO master are written
    fn after_daos(&self, schema: &Schema, output_dir: &Path) {
        let _ = (schema, output_dir);
    }

    /// Called once every file, including tests and `mod.rs` files, is written
    fn finalize(&self, report: &GenerationReport) {
        let _ = report;
    }
}

/// No-op implementation of CodegenCallbacks
pub struct NoOpCallbacks;

impl CodegenCallbacks for NoOpCallbacks {}

/// Files touched by one generator run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Files created or rewritten
    pub written: Vec<PathBuf>,
    /// Files whose content was already up to date
    pub unchanged: Vec<PathBuf>,
}

impl GenerationReport {
    /// Every generated file, in generation order within each group.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.written.iter().chain(self.unchanged.iter())
    }

    pub fn len(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration for the complete codegen pipeline
pub struct CodegenPipeline<'a> {
    schema: &'a Schema,
    output_dir: &'a Path,
    generate_tests: bool,
    callbacks: Option<&'a dyn CodegenCallbacks>,
}

impl<'a> CodegenPipeline<'a> {
    pub fn new(schema: &'a Schema, output_dir: &'a Path) -> Self {
        Self {
            schema,
            output_dir,
            generate_tests: true,
            callbacks: None,
        }
    }

    /// Generate DAO tests when the schema names a test module (default: true)
    pub fn with_tests(mut self, enabled: bool) -> Self {
        self.generate_tests = enabled;
        self
    }

    pub fn with_callbacks(mut self, callbacks: &'a dyn CodegenCallbacks) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Run the complete codegen pipeline
    pub fn run(&self) -> Result<GenerationReport> {
        let schema = self.schema;
        let modules = &schema.modules;
        let mut run = Run::new(self.output_dir, schema.keep_sections);

        info!(
            entities = schema.entities.len(),
            version = schema.version,
            output = %self.output_dir.display(),
            "Generating DAO code"
        );

        // Phase 1: entities
        for entity in schema.entities() {
            let names = EntityNames::of(schema, entity);
            let mut buf = Vec::new();
            generate_entity(&mut buf, schema, entity).map_err(|e| Error::io(self.output_dir, e))?;
            run.emit(&modules.default_module, &names.module, false, buf, true)?;
        }
        info!("Generated {} entity modules", schema.entities.len());
        if let Some(callbacks) = self.callbacks {
            callbacks.after_entities(schema, self.output_dir);
        }

        // Phase 2: DAOs, Diesel schema, DAO master
        for entity in schema.entities() {
            let names = EntityNames::of(schema, entity);
            let mut buf = Vec::new();
            generate_dao(&mut buf, schema, entity).map_err(|e| Error::io(self.output_dir, e))?;
            run.emit(&modules.dao_module, &names.dao_module, false, buf, false)?;
        }

        let mut buf = Vec::new();
        generate_schema(&mut buf, schema).map_err(|e| Error::io(self.output_dir, e))?;
        run.emit(&modules.dao_module, "schema", false, buf, false)?;

        let mut buf = Vec::new();
        generate_dao_master(&mut buf, schema).map_err(|e| Error::io(self.output_dir, e))?;
        run.emit(&modules.dao_module, "dao_master", false, buf, false)?;
        info!("Generated {} DAOs", schema.entities.len());
        if let Some(callbacks) = self.callbacks {
            callbacks.after_daos(schema, self.output_dir);
        }

        // Phase 3: tests
        if let (true, Some(test_module)) = (self.generate_tests, modules.test_module.as_deref()) {
            for entity in schema.entities() {
                let names = EntityNames::of(schema, entity);
                let mut buf = Vec::new();
                generate_dao_test(&mut buf, schema, entity).map_err(|e| Error::io(self.output_dir, e))?;
                run.emit(test_module, &names.test_module, true, buf, false)?;
            }
            info!("Generated {} DAO tests", schema.entities.len());
        }

        // Phase 4: mod.rs files
        run.write_module_files()?;

        let report = run.report;
        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            "Code generation complete"
        );
        if let Some(callbacks) = self.callbacks {
            callbacks.finalize(&report);
        }

        Ok(report)
    }
}

/// State of one pipeline run.
struct Run<'a> {
    output_dir: &'a Path,
    keep_sections: bool,
    tree: ModuleTree,
    paths: HashSet<PathBuf>,
    report: GenerationReport,
}

impl<'a> Run<'a> {
    fn new(output_dir: &'a Path, keep_sections: bool) -> Self {
        Self {
            output_dir,
            keep_sections,
            tree: ModuleTree::new(),
            paths: HashSet::new(),
            report: GenerationReport::default(),
        }
    }

    /// Write one generated module file and register it in the module tree.
    fn emit(
        &mut self,
        module_path: &str,
        file_stem: &str,
        test_only: bool,
        content: Vec<u8>,
        keep: bool,
    ) -> Result<()> {
        self.tree
            .add(module_path, file_stem, test_only)
            .map_err(|module| Error::OutputCollision(self.output_dir.join(module_dir(&module))))?;
        let path = self
            .output_dir
            .join(module_dir(module_path))
            .join(format!("{}.rs", file_stem));
        self.write(path, content, keep && self.keep_sections)
    }

    fn write(&mut self, path: PathBuf, content: Vec<u8>, keep: bool) -> Result<()> {
        if !self.paths.insert(path.clone()) {
            return Err(Error::OutputCollision(path));
        }

        let mut content = String::from_utf8(content)
            .map_err(|e| Error::io(&path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        if keep {
            if let Some(existing) = fs_utils::read_existing(&path).map_err(|e| Error::io(&path, e))? {
                content = keep_sections::merge(&content, &existing);
            }
        }

        if fs_utils::write_if_changed(&path, &content).map_err(|e| Error::io(&path, e))? {
            debug!(path = %path.display(), "Wrote");
            self.report.written.push(path);
        } else {
            debug!(path = %path.display(), "Unchanged");
            self.report.unchanged.push(path);
        }
        Ok(())
    }

    fn write_module_files(&mut self) -> Result<()> {
        let module_paths: Vec<String> = self.tree.module_paths().map(str::to_string).collect();
        for module_path in module_paths {
            let mut buf = Vec::new();
            self.tree
                .generate(&mut buf, &module_path)
                .map_err(|e| Error::io(self.output_dir, e))?;
            let path = self.output_dir.join(module_dir(&module_path)).join("mod.rs");
            self.write(path, buf, false)?;
        }
        Ok(())
    }
}
