use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that stop a document from being turned into a tree.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// markdown-rs rejected the input.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
}

/// Non-fatal problems found while transforming or rendering a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A diagram block had no source text and was kept as plain code.
    EmptyDiagram {
        /// Where the block starts, when known.
        location: Option<SourceLocation>,
    },
    /// A component tag has no registered renderer.
    UnknownComponent {
        /// Tag name as written.
        name: String,
        /// Where the tag starts, when known.
        location: Option<SourceLocation>,
    },
    /// A known component received props it could not use.
    InvalidBlock {
        /// Tag name as written.
        component: String,
        /// What was wrong.
        message: String,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::EmptyDiagram { location: Some(at) } => {
                write!(f, "{at}: diagram block is empty; rendered as code")
            }
            ParseWarning::EmptyDiagram { location: None } => {
                write!(f, "diagram block is empty; rendered as code")
            }
            ParseWarning::UnknownComponent {
                name,
                location: Some(at),
            } => write!(f, "{at}: unknown component <{name}>"),
            ParseWarning::UnknownComponent {
                name,
                location: None,
            } => write!(f, "unknown component <{name}>"),
            ParseWarning::InvalidBlock { component, message } => {
                write!(f, "<{component}>: {message}")
            }
        }
    }
}

/// Collection of non-fatal warnings gathered for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Appends every warning from `other`.
    pub fn extend(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
    }
}
