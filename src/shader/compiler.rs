//! Prelude-prefixed WGSL compilation.
//!
//! Every program is `prelude + fragment`, with `#include "path"` lines
//! expanded against the asset root, then parsed and validated by naga. The
//! validated source is what the GPU later receives, so two compiles of the
//! same inputs produce byte-identical programs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use regex::Regex;

use crate::error::{Error, Result};

/// Source file holding the shared vertex entry point, relative to the asset root.
pub const VERTEX_SOURCE: &str = "Shaders/Draw2D.wgsl";

/// Vertex entry point every card layer draws with.
pub const VERTEX_ENTRY_POINT: &str = "vs_card";

static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*#include[ \t]+"([^"]+)"[ \t]*(?:\r?\n|$)"#)
        .expect("include regex is valid")
});

/// Pipeline stage of a compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// A validated program: preprocessed source plus the naga IR used for reflection.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    entry_point: String,
    stage: Stage,
    source: Arc<str>,
    module: Arc<naga::Module>,
    info: Arc<ModuleInfo>,
    entry_index: usize,
}

impl CompiledProgram {
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Preprocessed WGSL source, as handed to the device.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled output as bytes.
    pub fn bytecode(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry_info(&self) -> &naga::valid::FunctionInfo {
        self.info.get_entry_point(self.entry_index)
    }

    /// Create the GPU shader module for this program.
    pub fn create_shader_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.entry_point),
            source: wgpu::ShaderSource::Wgsl(self.source.to_string().into()),
        })
    }
}

impl PartialEq for CompiledProgram {
    fn eq(&self, other: &Self) -> bool {
        self.stage == other.stage
            && self.entry_point == other.entry_point
            && self.source == other.source
    }
}

/// Compiles the shared vertex program once and pixel programs on demand.
#[derive(Debug)]
pub struct ShaderCompiler {
    asset_root: PathBuf,
    prelude: String,
    vertex: CompiledProgram,
}

impl ShaderCompiler {
    /// Build a compiler and compile the vertex program from [`VERTEX_SOURCE`].
    ///
    /// Vertex failure is fatal: no layer can draw without it.
    pub fn new(asset_root: impl Into<PathBuf>, prelude: impl Into<String>) -> Result<Self> {
        let asset_root = asset_root.into();
        let mut prelude = prelude.into();
        if !prelude.ends_with('\n') {
            prelude.push('\n');
        }
        let vertex_fragment = crate::assets::slurp_text_file(asset_root.join(VERTEX_SOURCE))?;
        let vertex = compile_program(
            &asset_root,
            &prelude,
            &vertex_fragment,
            VERTEX_ENTRY_POINT,
            Stage::Vertex,
        )?;
        tracing::info!("Compiled vertex program `{}`", VERTEX_ENTRY_POINT);
        Ok(Self { asset_root, prelude, vertex })
    }

    /// Compile a pixel program from `fragment` with the given entry point.
    ///
    /// Failures are logged with the diagnostic and returned as
    /// [`Error::ShaderCompile`] or [`Error::MissingInclude`]; there is no
    /// partially usable result.
    pub fn compile(&self, fragment: &str, entry_point: &str) -> Result<CompiledProgram> {
        let program = compile_program(
            &self.asset_root,
            &self.prelude,
            fragment,
            entry_point,
            Stage::Fragment,
        )?;
        tracing::info!("Compiled pixel program `{}`", entry_point);
        Ok(program)
    }

    pub fn vertex_program(&self) -> &CompiledProgram {
        &self.vertex
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }
}

fn compile_program(
    asset_root: &Path,
    prelude: &str,
    fragment: &str,
    entry_point: &str,
    stage: Stage,
) -> Result<CompiledProgram> {
    let result = preprocess(asset_root, prelude, fragment)
        .and_then(|source| validate(source, entry_point, stage));
    if let Err(err) = &result {
        tracing::error!("Shader compilation failure: {err}");
    }
    result
}

/// Concatenate prelude and fragment, then expand includes.
pub fn preprocess(asset_root: &Path, prelude: &str, fragment: &str) -> Result<String> {
    let mut source = String::with_capacity(prelude.len() + fragment.len());
    source.push_str(prelude);
    source.push_str(fragment);
    let mut active = HashSet::new();
    expand_includes(asset_root, &source, &mut active)
}

fn expand_includes(
    asset_root: &Path,
    source: &str,
    active: &mut HashSet<PathBuf>,
) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for caps in INCLUDE_DIRECTIVE.captures_iter(source) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        last = whole.end();

        let path = asset_root.join(target.as_str());
        if !path.is_file() {
            return Err(Error::MissingInclude(path));
        }
        if !active.insert(path.clone()) {
            return Err(Error::ShaderCompile {
                entry_point: String::new(),
                message: format!("recursive include of {}", path.display()),
            });
        }
        let text = crate::assets::slurp_text_file(&path)?;
        let expanded = expand_includes(asset_root, &text, active)?;
        active.remove(&path);

        out.push_str(&expanded);
        if !expanded.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&source[last..]);
    Ok(out)
}

fn validate(source: String, entry_point: &str, stage: Stage) -> Result<CompiledProgram> {
    let fail = |message: String| Error::ShaderCompile {
        entry_point: entry_point.to_string(),
        message,
    };

    let module =
        naga::front::wgsl::parse_str(&source).map_err(|e| fail(e.emit_to_string(&source)))?;
    let info = Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(&source)))?;

    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.name == entry_point && ep.stage == stage.naga())
        .ok_or_else(|| fail(format!("no {stage:?} entry point named `{entry_point}`")))?;

    Ok(CompiledProgram {
        entry_point: entry_point.to_string(),
        stage,
        source: source.into(),
        module: Arc::new(module),
        info: Arc::new(info),
        entry_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRELUDE: &str = "struct Shared { value: f32 }";

    const FRAGMENT: &str = r#"
@fragment
fn fs_red() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}

@fragment
fn fs_shared() -> @location(0) vec4<f32> {
    let s = Shared(0.5);
    return vec4<f32>(s.value);
}
"#;

    #[test]
    fn preprocess_appends_prelude_then_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let out = preprocess(dir.path(), "// prelude\n", "// fragment\n").unwrap();
        assert_eq!(out, "// prelude\n// fragment\n");
    }

    #[test]
    fn preprocess_expands_nested_includes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Shaders/Include")).unwrap();
        std::fs::write(
            dir.path().join("Shaders/Include/a.wgsl"),
            "const A: f32 = 1.0;\n#include \"Shaders/Include/b.wgsl\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("Shaders/Include/b.wgsl"), "const B: f32 = 2.0;").unwrap();

        let fragment = "#include \"Shaders/Include/a.wgsl\"\nconst C: f32 = 3.0;\n";
        let out = preprocess(dir.path(), "", fragment).unwrap();
        assert_eq!(out, "const A: f32 = 1.0;\nconst B: f32 = 2.0;\nconst C: f32 = 3.0;\n");
    }

    #[test]
    fn missing_include_fails_whole_compile() {
        let dir = tempfile::tempdir().unwrap();
        let err = preprocess(dir.path(), "", "#include \"nope.wgsl\"\n").unwrap_err();
        assert!(matches!(err, Error::MissingInclude(p) if p.ends_with("nope.wgsl")));
    }

    #[test]
    fn recursive_include_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loop.wgsl"), "#include \"loop.wgsl\"\n").unwrap();
        assert!(preprocess(dir.path(), "", "#include \"loop.wgsl\"\n").is_err());
    }

    #[test]
    fn validate_finds_requested_entry_point() {
        let source = format!("{PRELUDE}\n{FRAGMENT}");
        let program = validate(source, "fs_shared", Stage::Fragment).unwrap();
        assert_eq!(program.entry_point(), "fs_shared");
        assert_eq!(program.stage(), Stage::Fragment);
        assert!(program.source().starts_with(PRELUDE));
    }

    #[test]
    fn validate_reports_unknown_entry_point() {
        let source = format!("{PRELUDE}\n{FRAGMENT}");
        let err = validate(source, "fs_missing", Stage::Fragment).unwrap_err();
        assert!(matches!(
            err,
            Error::ShaderCompile { entry_point, .. } if entry_point == "fs_missing"
        ));
    }

    #[test]
    fn validate_reports_entry_point_of_wrong_stage() {
        let source = format!("{PRELUDE}\n{FRAGMENT}");
        assert!(validate(source, "fs_red", Stage::Vertex).is_err());
    }

    #[test]
    fn validate_reports_syntax_errors_with_diagnostic() {
        let err = validate("fn broken( {".to_string(), "fs_red", Stage::Fragment).unwrap_err();
        match err {
            Error::ShaderCompile { message, .. } => assert!(!message.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
