//! Document references
//!
//! A [`DocumentRef`] is what the report listing hands the harvest: the
//! document family plus whichever identifiers the stub carried. It is
//! immutable for the life of a run.

use super::ids::{DisplayId, DocumentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two harvested document families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentFamily {
    /// Billing and coding article
    #[serde(rename = "Article")]
    Article,
    /// Local coverage determination
    #[serde(rename = "LCD", alias = "Determination")]
    Determination,
}

impl DocumentFamily {
    /// All families, in harvest order
    pub const ALL: [DocumentFamily; 2] = [DocumentFamily::Article, DocumentFamily::Determination];

    /// Label used in output tables
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFamily::Article => "Article",
            DocumentFamily::Determination => "LCD",
        }
    }

    /// Display-id prefix letter for this family
    pub fn display_prefix(&self) -> char {
        match self {
            DocumentFamily::Article => 'A',
            DocumentFamily::Determination => 'L',
        }
    }

    /// Infer the family from a display id prefix (`A...` / `L...`)
    pub fn from_display_id(display_id: &DisplayId) -> Option<Self> {
        match display_id.prefix()? {
            'A' => Some(DocumentFamily::Article),
            'L' => Some(DocumentFamily::Determination),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "article" => Ok(DocumentFamily::Article),
            "lcd" | "determination" => Ok(DocumentFamily::Determination),
            other => Err(format!(
                "Unknown document family '{other}'. Must be one of: Article, LCD"
            )),
        }
    }
}

/// Reference to one harvestable document
///
/// Invariant: at least one of `numeric_id` / `display_id` is present. The
/// only constructor, [`DocumentRef::new`], enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    family: DocumentFamily,
    numeric_id: Option<DocumentId>,
    display_id: Option<DisplayId>,
    version: Option<String>,
    title: Option<String>,
}

impl DocumentRef {
    /// Create a document reference from raw identifier strings
    ///
    /// Blank strings count as absent. Fails when neither id is usable.
    pub fn new(
        family: DocumentFamily,
        numeric_id: Option<&str>,
        display_id: Option<&str>,
    ) -> Result<Self, String> {
        let numeric_id = numeric_id.and_then(|s| DocumentId::new(s).ok());
        let display_id = display_id.and_then(|s| DisplayId::new(s).ok());

        if numeric_id.is_none() && display_id.is_none() {
            return Err(format!(
                "{family} document needs a numeric id or a display id"
            ));
        }

        Ok(Self {
            family,
            numeric_id,
            display_id,
            version: None,
            title: None,
        })
    }

    /// Build a reference from one identifier typed by an operator
    ///
    /// A letter-prefixed id is a display id and names its own family unless
    /// `family` is given; a bare number is a numeric id of `family`
    /// (Article when absent).
    pub fn from_identifier(id: &str, family: Option<DocumentFamily>) -> Result<Self, String> {
        let id = id.trim();
        if id.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let display = DisplayId::new(id)?;
            let family = family
                .or_else(|| DocumentFamily::from_display_id(&display))
                .ok_or_else(|| format!("Cannot infer the document family of '{id}'"))?;
            Self::new(family, None, Some(id))
        } else {
            Self::new(family.unwrap_or(DocumentFamily::Article), Some(id), None)
        }
    }

    /// Set the document version (blank values are ignored)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into().trim().to_string();
        if !version.is_empty() {
            self.version = Some(version);
        }
        self
    }

    /// Set the document title (blank values are ignored)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into().trim().to_string();
        if !title.is_empty() {
            self.title = Some(title);
        }
        self
    }

    pub fn family(&self) -> DocumentFamily {
        self.family
    }

    pub fn numeric_id(&self) -> Option<&DocumentId> {
        self.numeric_id.as_ref()
    }

    pub fn display_id(&self) -> Option<&DisplayId> {
        self.display_id.as_ref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Numeric id, or the digits of a prefixed display id when the stub had
    /// no numeric id
    pub fn effective_numeric_id(&self) -> Option<&str> {
        self.numeric_id
            .as_ref()
            .map(DocumentId::as_str)
            .or_else(|| self.display_id.as_ref().and_then(DisplayId::numeric_part))
    }

    /// Identifier written to output tables: the numeric id, falling back to
    /// the display id
    pub fn output_id(&self) -> &str {
        match (&self.numeric_id, &self.display_id) {
            (Some(id), _) => id.as_str(),
            (None, Some(display)) => display.as_str(),
            // unreachable by construction, but keep the table well-formed
            (None, None) => "",
        }
    }

    /// Canonical key used for hash partitioning: family plus display id,
    /// else numeric id
    pub fn canonical_key(&self) -> String {
        let id = self
            .display_id
            .as_ref()
            .map(DisplayId::as_str)
            .or_else(|| self.numeric_id.as_ref().map(DocumentId::as_str))
            .unwrap_or_default();
        format!("{}:{}", self.family.as_str(), id)
    }

    /// Every identifier this document can be selected by
    ///
    /// Used to intersect an allow-list against the discovered documents.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(3);
        if let Some(id) = &self.numeric_id {
            ids.push(id.as_str());
        }
        if let Some(display) = &self.display_id {
            ids.push(display.as_str());
        }
        if let Some(derived) = self.effective_numeric_id() {
            if !ids.contains(&derived) {
                ids.push(derived);
            }
        }
        ids
    }

    /// Short human label for logs
    pub fn label(&self) -> String {
        format!(
            "{} id={} display={}",
            self.family,
            self.numeric_id.as_ref().map(DocumentId::as_str).unwrap_or("-"),
            self.display_id.as_ref().map(DisplayId::as_str).unwrap_or("-"),
        )
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
