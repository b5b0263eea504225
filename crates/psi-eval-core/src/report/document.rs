// crates/psi-eval-core/src/report/document.rs
// ============================================================================
// Module: Report Document
// Description: Document boilerplate, source output, and typesetting.
// Purpose: Turn ordered table blocks into the final report files.
// Dependencies: crate::interfaces, crate::report, crate::runtime::process, tracing
// ============================================================================

//! ## Overview
//! [`LatexDocument`] wraps rendered table blocks in a fixed preamble and
//! postamble. [`ReportRenderer`] writes the source into the output directory
//! and, when given a [`Typesetter`], produces the final document and moves it
//! to its configured name. [`ProcessTypesetter`] is the process-backed
//! typesetter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::error;
use tracing::info;

use crate::error::HarnessError;
use crate::interfaces::Typesetter;
use crate::report::latex::render_block;
use crate::report::table::TableBlock;
use crate::report::table::TableError;
use crate::runtime::process::CommandSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Packages loaded by the document preamble.
const PACKAGES: [&str; 13] = [
    "[utf8]{inputenc}",
    "{graphicx}",
    "{textcomp}",
    "{soul}",
    "{amssymb}",
    "{amsthm}",
    "{mathrsfs}",
    "{mathtools}",
    "{multicol}",
    "{multirow}",
    "{tabularx}",
    "{arydshln}",
    "[top=1cm, bottom=1cm, left=1cm, right=1cm]{geometry}",
];

/// Macros used by table headers and captions.
const MACROS: &str = "\\newcommand{\\receiver}{$\\mathcal{R}$}
\\newcommand{\\sender}{$\\mathcal{S}$}
\\newcommand{\\senc}[1]{\\overline{#1}}
\\newcommand{\\renc}[1]{\\widehat{#1}}
\\newcolumntype{C}[1]{>{\\centering\\arraybackslash}p{#1}}
";

// ============================================================================
// SECTION: Document
// ============================================================================

/// Fixed document boilerplate around the report tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexDocument {
    /// Document title.
    pub title: String,
    /// Table counter value before the first table, so numbering starts after it.
    pub table_counter_start: u32,
}

impl Default for LatexDocument {
    fn default() -> Self {
        Self {
            title: "Artifact Evaluation".to_string(),
            table_counter_start: 1,
        }
    }
}

impl LatexDocument {
    /// Returns the preamble up to and including the title block.
    #[must_use]
    pub fn preamble(&self) -> String {
        let mut out = String::from("\\documentclass{article}\n\n");
        for package in PACKAGES {
            out.push_str("\\usepackage");
            out.push_str(package);
            out.push('\n');
        }
        out.push_str(MACROS);
        out.push_str("\n\\pagestyle{plain}\n\n\\begin{document}\n\n");
        out.push_str(&format!("\\title{{{}}}\n\n\\author{{}}\n\\date{{}}\n\\maketitle\n\n", self.title));
        out.push_str(&format!("\\setcounter{{table}}{{{}}}\n", self.table_counter_start));
        out
    }

    /// Returns the postamble.
    #[must_use]
    pub const fn postamble(&self) -> &'static str {
        "\\end{document}\n"
    }

    /// Renders the full document around `blocks`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when a block fails validation.
    pub fn render(&self, blocks: &[TableBlock]) -> Result<String, TableError> {
        let mut out = self.preamble();
        for block in blocks {
            out.push('\n');
            out.push_str(&render_block(block)?);
        }
        out.push('\n');
        out.push_str(self.postamble());
        Ok(out)
    }
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Files produced by a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutput {
    /// Written document source.
    pub source: PathBuf,
    /// Final typeset document, when typesetting ran.
    pub document: Option<PathBuf>,
}

/// Writes the report source and drives the typesetter.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    /// Directory receiving all outputs.
    output_dir: PathBuf,
    /// Source file name.
    source_name: String,
    /// Final document file name.
    document_name: String,
    /// Boilerplate.
    document: LatexDocument,
}

impl ReportRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new(
        output_dir: impl Into<PathBuf>,
        source_name: impl Into<String>,
        document_name: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            source_name: source_name.into(),
            document_name: document_name.into(),
            document: LatexDocument::default(),
        }
    }

    /// Writes the document source only.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Report`] for invalid blocks and
    /// [`HarnessError::Output`] when the file cannot be written.
    pub fn write_source(&self, blocks: &[TableBlock]) -> Result<PathBuf, HarnessError> {
        let text = self.document.render(blocks)?;
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            HarnessError::Output(format!("cannot create {}: {err}", self.output_dir.display()))
        })?;
        let path = self.output_dir.join(&self.source_name);
        fs::write(&path, text).map_err(|err| {
            HarnessError::Output(format!("cannot write {}: {err}", path.display()))
        })?;
        info!(path = %path.display(), tables = blocks.len(), "wrote report source");
        Ok(path)
    }

    /// Writes the source, typesets it and renames the result.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::write_source`], the typesetter, or the
    /// final rename.
    pub fn render(
        &self,
        blocks: &[TableBlock],
        typesetter: &mut dyn Typesetter,
    ) -> Result<ReportOutput, HarnessError> {
        let source = self.write_source(blocks)?;
        let produced = typesetter.typeset(&source)?;
        let document = self.output_dir.join(&self.document_name);
        if produced != document {
            fs::rename(&produced, &document).map_err(|err| {
                HarnessError::Output(format!(
                    "cannot move {} to {}: {err}",
                    produced.display(),
                    document.display()
                ))
            })?;
        }
        info!(path = %document.display(), "report ready");
        Ok(ReportOutput {
            source,
            document: Some(document),
        })
    }
}

// ============================================================================
// SECTION: Process Typesetter
// ============================================================================

/// Typesetter that runs an external program next to the source file.
#[derive(Debug, Clone)]
pub struct ProcessTypesetter {
    /// Program and leading arguments; the source file name is appended.
    command: CommandSpec,
}

impl ProcessTypesetter {
    /// Creates a process-backed typesetter.
    #[must_use]
    pub const fn new(command: CommandSpec) -> Self {
        Self {
            command,
        }
    }
}

impl Typesetter for ProcessTypesetter {
    fn typeset(&mut self, source: &Path) -> Result<PathBuf, HarnessError> {
        let dir = source.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| HarnessError::Output(format!("{} has no file name", source.display())))?;
        let args = [file_name];
        let command = self.command.render(&args);
        info!(%command, "typesetting report");
        self.command.run_in(dir, &args).map_err(|failure| {
            error!(%command, status = %failure.status, stderr = %failure.stderr, "typesetting failed");
            HarnessError::RenderFailure {
                command: command.clone(),
                status: failure.status,
                stderr: failure.stderr,
            }
        })?;
        let produced = source.with_extension("pdf");
        if !produced.is_file() {
            return Err(HarnessError::RenderFailure {
                command,
                status: "exited with code 0".to_string(),
                stderr: format!("expected output {} was not produced", produced.display()),
            });
        }
        Ok(produced)
    }
}
