use std::path::{Path, PathBuf};

/// Inputs converted when neither the command line nor a config file names any.
pub const DEFAULT_INPUTS: &[&str] = &[
    "COMP-T2_lexical_analysis.pdf",
    "COMP-T3_parsing.pdf",
    "COMP-T4_bottomup_parsing.pdf",
];

/// One input-document-to-output-text conversion task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl ConversionJob {
    /// Job writing its text file next to the input.
    pub fn for_input(input: impl Into<PathBuf>) -> Self {
        let input_path = input.into();
        let output_path = derive_output_path(&input_path);
        Self {
            input_path,
            output_path,
        }
    }

    /// Job writing its text file into `dir` under the derived file name.
    pub fn for_input_in(input: impl Into<PathBuf>, dir: &Path) -> Self {
        let input_path = input.into();
        let derived = derive_output_path(&input_path);
        let output_path = match derived.file_name() {
            Some(name) => dir.join(name),
            None => derived,
        };
        Self {
            input_path,
            output_path,
        }
    }
}

/// Derive the text output path for `input`.
///
/// A trailing `.pdf` (any ASCII case) becomes `.txt`. Anything else gets
/// `.txt` appended, so the output never aliases the input.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let is_pdf = input
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        input.with_extension("txt")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".txt");
        PathBuf::from(name)
    }
}
