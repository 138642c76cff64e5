use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Languages the playground can execute.
///
/// The mapping from file name to language is deliberately lenient: `.js`
/// selects JavaScript and everything else, including a missing extension,
/// falls back to Python. Execution and file validation use the strict
/// mapping instead, which only recognizes `.py` and `.js`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileLanguage {
    Python,
    JavaScript,
}

impl FileLanguage {
    /// Lenient file name to language mapping used for display and for the
    /// completion provider's language hint.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".js") {
            FileLanguage::JavaScript
        } else {
            FileLanguage::Python
        }
    }

    /// Strict mapping: only recognized extensions produce a language.
    /// Anything else is not executable.
    pub fn from_extension_strict(name: &str) -> Option<Self> {
        if name.ends_with(".py") {
            Some(FileLanguage::Python)
        } else if name.ends_with(".js") {
            Some(FileLanguage::JavaScript)
        } else {
            None
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FileLanguage::Python => "Python",
            FileLanguage::JavaScript => "JavaScript",
        }
    }

    /// Identifier used on the wire and in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileLanguage::Python => "python",
            FileLanguage::JavaScript => "javascript",
        }
    }
}

/// Returns true when the name carries an extension the workspace accepts.
pub fn has_recognized_extension(name: &str) -> bool {
    FileLanguage::from_extension_strict(name).is_some()
}

/// A single open file in the workspace.
///
/// The file store owns the content exclusively; other components read it
/// but never mutate it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaygroundFile {
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaygroundFile {
    pub fn new(name: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            name,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn language(&self) -> FileLanguage {
        FileLanguage::from_file_name(&self.name)
    }

    pub fn update_content(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}
