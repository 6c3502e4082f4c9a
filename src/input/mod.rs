//! Tabular input: format detection, the four parsers and the parse cache.

mod cache;
mod columns;
pub mod delimited;
pub mod json;

pub use cache::ParseCache;

use std::{
    fmt,
    fs,
    io::{self, Read},
    path::Path,
    str::FromStr,
};

use tracing::debug;

use crate::core::{data::DataStore, error::ParseError};

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Json,
    NdJson,
    Csv,
    Tsv,
}

impl InputFormat {
    pub const ALL: [Self; 4] = [Self::Json, Self::NdJson, Self::Csv, Self::Tsv];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::NdJson => "ndjson",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Format implied by a file extension, if any.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "ndjson" | "jsonl" => Some(Self::NdJson),
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Guess from the content: `[` opens JSON, `{` opens NDJSON, a tab in
    /// the header line means TSV, anything else is CSV.
    #[must_use]
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().bytes().next() {
            Some(b'[') => Self::Json,
            Some(b'{') => Self::NdJson,
            _ if text.lines().next().is_some_and(|l| l.contains('\t')) => Self::Tsv,
            _ => Self::Csv,
        }
    }

    /// Extension first, content second.
    #[must_use]
    pub fn detect(path: Option<&Path>, text: &str) -> Self {
        path.and_then(Self::from_extension)
            .unwrap_or_else(|| Self::sniff(text))
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "jsonl" => Ok(Self::NdJson),
            _ => Self::ALL.into_iter().find(|f| f.key() == s).ok_or_else(|| {
                format!("unknown input format `{s}` (expected json, ndjson, csv or tsv)")
            }),
        }
    }
}

/// Parse `text` as `format`.  A leading byte-order mark is ignored.
pub fn parse(text: &str, format: InputFormat) -> Result<DataStore, ParseError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let ds = match format {
        InputFormat::Json => json::parse_array(text)?,
        InputFormat::NdJson => json::parse_lines(text)?,
        InputFormat::Csv => delimited::parse(text, b',')?,
        InputFormat::Tsv => delimited::parse(text, b'\t')?,
    };
    debug!(
        %format,
        rows = ds.row_count(),
        columns = ds.column_count(),
        "parsed input"
    );
    Ok(ds)
}

/// Read and parse one file; `format` overrides detection.
pub fn read_path(path: &Path, format: Option<InputFormat>) -> Result<DataStore, ParseError> {
    let text = fs::read_to_string(path)?;
    parse(&text, format.unwrap_or_else(|| InputFormat::detect(Some(path), &text)))
}

/// Read and parse everything from `src` (usually stdin).
pub fn read_stream<R: Read>(mut src: R, format: Option<InputFormat>) -> Result<DataStore, ParseError> {
    let mut text = String::new();
    src.read_to_string(&mut text)?;
    parse(&text, format.unwrap_or_else(|| InputFormat::sniff(&text)))
}

/// Convenience for `read_stream(io::stdin(), format)`.
pub fn read_stdin(format: Option<InputFormat>) -> Result<DataStore, ParseError> {
    read_stream(io::stdin().lock(), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("data.json", Some(InputFormat::Json))]
    #[case("data.JSONL", Some(InputFormat::NdJson))]
    #[case("data.ndjson", Some(InputFormat::NdJson))]
    #[case("a/b.tsv", Some(InputFormat::Tsv))]
    #[case("x.csv", Some(InputFormat::Csv))]
    #[case("x.txt", None)]
    #[case("noext", None)]
    fn extensions(#[case] path: &str, #[case] want: Option<InputFormat>) {
        assert_eq!(InputFormat::from_extension(Path::new(path)), want);
    }

    #[rstest]
    #[case("  [{\"a\":1}]", InputFormat::Json)]
    #[case("{\"a\":1}\n{\"a\":2}", InputFormat::NdJson)]
    #[case("a\tb\n1\t2", InputFormat::Tsv)]
    #[case("a,b\n1,2", InputFormat::Csv)]
    fn sniffing(#[case] text: &str, #[case] want: InputFormat) {
        assert_eq!(InputFormat::sniff(text), want);
    }

    #[test]
    fn extension_beats_content() {
        let text = "a\tb\n1\t2";
        assert_eq!(InputFormat::detect(Some(Path::new("f.csv")), text), InputFormat::Csv);
        assert_eq!(InputFormat::detect(None, text), InputFormat::Tsv);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("NDJSON".parse::<InputFormat>(), Ok(InputFormat::NdJson));
        assert_eq!("jsonl".parse::<InputFormat>(), Ok(InputFormat::NdJson));
        assert!("xml".parse::<InputFormat>().is_err());
    }

    #[test]
    fn bom_and_blank_input() {
        let ds = parse("\u{FEFF}a,b\n1,2\n", InputFormat::Csv).unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["a", "b"]);
        assert!(matches!(parse(" \n", InputFormat::Json), Err(ParseError::Empty)));
    }

    #[test]
    fn streams_are_sniffed() {
        let ds = read_stream("[{\"v\": 1.5}]".as_bytes(), None).unwrap();
        assert_eq!(ds.row_count(), 1);
    }
}
