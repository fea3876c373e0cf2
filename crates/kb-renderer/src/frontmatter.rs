//! YAML frontmatter.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Error parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Metadata block at the top of a document, delimited by `---` lines.
///
/// Keys keep their document order.
///
/// # Examples
///
/// ```
/// use kb_renderer::Frontmatter;
///
/// let text = "---\ntitle: Setup\nstatus: draft\ntags: [ops, linux]\n---\n# Setup\n";
/// let (meta, body) = Frontmatter::split(text).unwrap();
/// assert_eq!(meta.title(), Some("Setup"));
/// assert_eq!(meta.status(), Some("draft"));
/// assert_eq!(meta.tags(), ["ops", "linux"]);
/// assert_eq!(body, "# Setup\n");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Frontmatter {
    fields: Mapping,
}

impl Frontmatter {
    /// Split `text` into frontmatter and body.
    ///
    /// Without an opening `---` first line, or without a closing `---` line,
    /// the frontmatter is empty and the whole text is the body.
    ///
    /// # Errors
    ///
    /// Returns [`FrontmatterError::Yaml`] if the delimited block is not a YAML
    /// mapping.
    pub fn split(text: &str) -> Result<(Self, &str), FrontmatterError> {
        let mut lines = text.split_inclusive('\n');
        match lines.next() {
            Some(first) if first.trim() == DELIMITER => {
                let yaml_start = first.len();
                let mut offset = yaml_start;
                for line in lines {
                    if line.trim() == DELIMITER {
                        let meta = Self::parse(&text[yaml_start..offset])?;
                        return Ok((meta, &text[offset + line.len()..]));
                    }
                    offset += line.len();
                }
                Ok((Self::default(), text))
            }
            _ => Ok((Self::default(), text)),
        }
    }

    fn parse(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let fields: Option<Mapping> = serde_yaml::from_str(yaml)?;
        Ok(Self {
            fields: fields.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields, in document order.
    #[must_use]
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Document status (`draft`, `published`, ...).
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    /// Tags, from a YAML list or a single string.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        match self.get("tags") {
            Some(Value::Sequence(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(tag)) => vec![tag.as_str()],
            _ => Vec::new(),
        }
    }
}
