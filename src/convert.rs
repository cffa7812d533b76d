//! Conversion runs: options, per-file results and the orchestrator.
//!
//! A run has two phases. The prerequisite phase resolves the input, creates
//! the output root, discovers declaration files and builds the symbol table;
//! any failure there is a [`ConvertError`] and aborts the run. The per-file
//! phase converts each discovered source in order; a failure there becomes
//! an unsuccessful [`TransformationResult`] and the run moves on.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::annotate::Annotator;
use crate::discover;
use crate::error::{ConvertError, FileError};
use crate::parser::declarations::DeclarationExtractor;
use crate::parser::source::parse_source;
use crate::parser::DialectRegistry;
use crate::symbols::SymbolTable;
use crate::syntax::emit::emit;

/// Output directory used when no explicit output root is given.
pub const DEFAULT_OUTPUT_DIR: &str = "ts-output";

/// Emit a progress message at `info` when verbose, `debug` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

/// One conversion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// File or directory to convert.
    pub input: PathBuf,
    /// Root for generated output. Defaults to a `ts-output` directory inside
    /// the input directory (or next to the input file).
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Accepted for compatibility; existing outputs are always replaced.
    #[serde(default)]
    pub overwrite: bool,
    /// Accepted for compatibility; does not change annotation.
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Extra exclusion globs, merged with the defaults.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// When false, each source is deleted after its output is written.
    #[serde(default = "default_true")]
    pub keep_original: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

impl ConversionOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            overwrite: false,
            strict: true,
            ignore: Vec::new(),
            keep_original: true,
            verbose: false,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_keep_original(mut self, keep_original: bool) -> Self {
        self.keep_original = keep_original;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Outcome for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationResult {
    pub original_path: PathBuf,
    /// Where the output was written. `None` when the file failed.
    pub new_path: Option<PathBuf>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformationResult {
    pub fn converted(original_path: PathBuf, new_path: PathBuf) -> Self {
        Self {
            original_path,
            new_path: Some(new_path),
            success: true,
            error: None,
        }
    }

    pub fn failed(original_path: PathBuf, error: impl ToString) -> Self {
        Self {
            original_path,
            new_path: None,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Runs one conversion request.
pub struct Converter {
    options: ConversionOptions,
    registry: DialectRegistry,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            registry: DialectRegistry::new(),
        }
    }

    /// Use `registry` for both discovery and grammar selection.
    pub fn with_registry(options: ConversionOptions, registry: DialectRegistry) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert every discovered source, in discovery order.
    pub async fn run(&self) -> Result<Vec<TransformationResult>, ConvertError> {
        let verbose = self.options.verbose;
        let input = self.options.input.clone();

        let metadata = fs::metadata(&input).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConvertError::InputNotFound(input.clone()),
            _ => ConvertError::io(&input, e),
        })?;
        let is_dir = metadata.is_dir();

        // Sources mirror their path relative to this root.
        let input_root = if is_dir {
            input.clone()
        } else {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };
        let output_root = self
            .options
            .output
            .clone()
            .unwrap_or_else(|| input_root.join(DEFAULT_OUTPUT_DIR));

        fs::create_dir_all(&output_root)
            .await
            .map_err(|e| ConvertError::io(&output_root, e))?;

        progress!(verbose, root = %input_root.display(), "finding declaration files");
        let declarations = self.discover_declarations(&input_root, &output_root).await?;
        progress!(verbose, count = declarations.len(), "found declaration files");

        let symbols = self.extract(declarations).await?;
        progress!(verbose, count = symbols.len(), "extracted declarations");

        let sources = if is_dir {
            self.discover_sources(&input_root, &output_root).await?
        } else {
            vec![input.clone()]
        };
        progress!(verbose, count = sources.len(), "found source files");

        let annotator = Annotator::new(&symbols);
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            progress!(verbose, file = %source.display(), "converting");
            let result = match self.convert_file(&source, &input_root, &output_root, &annotator).await {
                Ok(new_path) => TransformationResult::converted(source, new_path),
                Err(err) => {
                    warn!(file = %source.display(), error = %err, "conversion failed");
                    TransformationResult::failed(source, err)
                }
            };
            results.push(result);
        }

        Ok(results)
    }

    async fn discover_declarations(
        &self,
        root: &Path,
        output_root: &Path,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        let root = root.to_path_buf();
        let skip = output_root.to_path_buf();
        spawn_walk(root.clone(), move || discover::declaration_files(&root, Some(&skip))).await
    }

    async fn discover_sources(
        &self,
        root: &Path,
        output_root: &Path,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        let root = root.to_path_buf();
        let skip = output_root.to_path_buf();
        let ignore = self.options.ignore.clone();
        let registry = self.registry.clone();
        spawn_walk(root.clone(), move || {
            discover::source_files(&root, &ignore, Some(&skip), &registry)
        })
        .await
    }

    async fn extract(&self, paths: Vec<PathBuf>) -> Result<SymbolTable, ConvertError> {
        let root = self.options.input.clone();
        tokio::task::spawn_blocking(move || DeclarationExtractor::new().extract_paths(&paths))
            .await
            .map_err(|e| ConvertError::Discovery {
                root,
                message: e.to_string(),
            })?
    }

    /// Read, annotate, emit and write one source. Returns the output path.
    async fn convert_file(
        &self,
        path: &Path,
        input_root: &Path,
        output_root: &Path,
        annotator: &Annotator<'_>,
    ) -> Result<PathBuf, FileError> {
        let source = fs::read_to_string(path)
            .await
            .map_err(FileError::io("read source"))?;

        let dialect = self.registry.dialect_or_default(path);
        let mut tree = parse_source(source, dialect.grammar)?;
        annotator.annotate(&mut tree);
        let output = emit(&tree)?;

        let target = output_path(path, input_root, output_root, dialect.output_extension);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(FileError::io("create output directory"))?;
        }
        fs::write(&target, output)
            .await
            .map_err(FileError::io("write output"))?;

        if !self.options.keep_original {
            fs::remove_file(path)
                .await
                .map_err(FileError::io("remove original"))?;
            debug!(file = %path.display(), "removed original");
        }

        Ok(target)
    }
}

/// Run a blocking directory walk off the async runtime.
async fn spawn_walk<F>(root: PathBuf, walk: F) -> Result<Vec<PathBuf>, ConvertError>
where
    F: FnOnce() -> Result<Vec<PathBuf>, ConvertError> + Send + 'static,
{
    tokio::task::spawn_blocking(walk)
        .await
        .map_err(|e| ConvertError::Discovery {
            root,
            message: e.to_string(),
        })?
}

/// Mirror `path` under `output_root` relative to `input_root`, swapping the extension.
pub fn output_path(path: &Path, input_root: &Path, output_root: &Path, extension: &str) -> PathBuf {
    let relative = path
        .strip_prefix(input_root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| path.file_name().map(PathBuf::from))
        .unwrap_or_default();
    output_root.join(relative).with_extension(extension)
}

/// Convert with the given options.
pub async fn convert(options: ConversionOptions) -> Result<Vec<TransformationResult>, ConvertError> {
    Converter::new(options).run().await
}
