use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the uncovered function paths as a pretty-printed JSON array
///
/// Non-ASCII text is written as-is, not as `\u` escapes.
pub struct JsonReporter {
    output_path: PathBuf,
    indent: usize,
}

impl JsonReporter {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            indent: 4,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn write(&self, paths: &[String]) -> Result<()> {
        let file = File::create(&self.output_path)
            .into_diagnostic()
            .wrap_err_with(|| self.failure_message())?;

        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, paths)
            .and_then(|_| writer.flush().into_diagnostic())
            .wrap_err_with(|| self.failure_message())
    }

    /// Serialize into any writer
    pub fn write_to<W: Write>(&self, writer: W, paths: &[String]) -> Result<()> {
        let indent = " ".repeat(self.indent);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = Serializer::with_formatter(writer, formatter);
        paths.serialize(&mut serializer).into_diagnostic()
    }

    fn failure_message(&self) -> String {
        format!("Failed to write report: {}", self.output_path.display())
    }
}
