//! Parse pass configuration.

/// Options controlling a parse pass.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Abort on the first command error instead of collecting it
    pub strict: bool,

    /// Fold `setAttr` continuations into the preceding record on the same attribute
    pub merge_continuations: bool,

    /// Retain `//` and `/* */` comments in the command list
    pub keep_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            merge_continuations: true,
            keep_comments: true,
        }
    }
}

impl ParseOptions {
    /// Options that fail the pass on the first malformed command.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}
