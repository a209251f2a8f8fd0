//! Classification of the `input` parameter.
//!
//! No filesystem access happens here; expanding lists, patterns and suffixes into file
//! names is left to the task.

/// What the `input` string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    Empty,
    /// `@file`: a text file listing one input per line.
    AtFile(String),
    /// Comma-separated file names.
    List(Vec<String>),
    /// Wildcard pattern such as `j8c0*_flt.fits`.
    Pattern(String),
    /// Bare suffix such as `flt`, selecting `*_flt.fits` in the working directory.
    Suffix(String),
    File(String),
}

impl InputSpec {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return InputSpec::Empty;
        }
        if let Some(list) = input.strip_prefix('@') {
            return InputSpec::AtFile(list.trim().to_string());
        }
        if input.contains(',') {
            return InputSpec::List(
                input
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        if input.contains(['*', '?', '[']) {
            return InputSpec::Pattern(input.to_string());
        }
        if !input.contains(['.', '/', '\\']) {
            return InputSpec::Suffix(input.to_string());
        }
        InputSpec::File(input.to_string())
    }
}
