//! Output formats accepted by the engine's `process` action

use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// Portable Document Format
    Pdf,
    /// Rich Text Format
    Rtf,
    /// Legacy Excel workbook
    Xls,
    /// Excel workbook
    Xlsx,
    /// Word document
    Docx,
    /// OpenDocument text
    Odt,
    /// OpenDocument spreadsheet
    Ods,
    /// PowerPoint presentation
    Pptx,
    /// Comma separated values
    Csv,
    /// HTML page
    Html,
    /// XHTML page
    Xhtml,
    /// Jasper XML export
    Xml,
    /// Serialized Jasper print object
    Jrprint,
}

impl FormatTag {
    /// Every format the engine supports, in the engine's documented order
    pub const ALL: [FormatTag; 13] = [
        FormatTag::Pdf,
        FormatTag::Rtf,
        FormatTag::Xls,
        FormatTag::Xlsx,
        FormatTag::Docx,
        FormatTag::Odt,
        FormatTag::Ods,
        FormatTag::Pptx,
        FormatTag::Csv,
        FormatTag::Html,
        FormatTag::Xhtml,
        FormatTag::Xml,
        FormatTag::Jrprint,
    ];

    /// The tag as the engine spells it on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Pdf => "pdf",
            FormatTag::Rtf => "rtf",
            FormatTag::Xls => "xls",
            FormatTag::Xlsx => "xlsx",
            FormatTag::Docx => "docx",
            FormatTag::Odt => "odt",
            FormatTag::Ods => "ods",
            FormatTag::Pptx => "pptx",
            FormatTag::Csv => "csv",
            FormatTag::Html => "html",
            FormatTag::Xhtml => "xhtml",
            FormatTag::Xml => "xml",
            FormatTag::Jrprint => "jrprint",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FormatTag::ALL
            .iter()
            .find(|tag| tag.as_str() == s)
            .copied()
            .ok_or_else(|| Error::invalid_format(s))
    }
}

/// Check requested formats against the supported list.
///
/// Fails on the first unsupported entry, even when valid formats are also present.
/// An empty request is rejected as well; duplicates collapse, first occurrence wins.
pub fn validate_formats<I, S>(formats: I) -> Result<IndexSet<FormatTag>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut validated = IndexSet::new();
    for format in formats {
        validated.insert(format.as_ref().parse::<FormatTag>()?);
    }
    if validated.is_empty() {
        return Err(Error::invalid_format(""));
    }
    Ok(validated)
}
