use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Frontmatter mapping. Keys keep their source order.
pub type Frontmatter = Map<String, JsonValue>;

const FENCE: &str = "---";

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter mapping.
    pub value: Frontmatter,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            value: Frontmatter::new(),
            body_start: 0,
        }
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
    /// The mapping could not be written back as YAML.
    #[error("Frontmatter serialization error: {0}")]
    Serialize(String),
}

/// A raw document split into its metadata block and Markdown body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceDocument {
    /// Parsed frontmatter.
    pub frontmatter: Frontmatter,
    /// Markdown/MDX body, byte-for-byte as it appeared after the closing fence.
    pub body: String,
}

impl SourceDocument {
    /// Splits raw file contents into frontmatter and body.
    pub fn parse(raw: &str) -> Result<Self, FrontmatterError> {
        let (frontmatter, body) = split(raw)?;
        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Reassembles the document into raw file contents.
    pub fn to_raw(&self) -> Result<String, FrontmatterError> {
        join(&self.body, &self.frontmatter)
    }

    /// Returns the `title` field when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.get("title").and_then(JsonValue::as_str)
    }
}

/// Splits a raw document into its frontmatter mapping and body.
///
/// Documents without a leading `---` block yield an empty mapping and the whole
/// input as body. A malformed block is an error; callers must not guess.
pub fn split(raw: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let extraction = extract_frontmatter(raw)?;
    Ok((extraction.value, &raw[extraction.body_start..]))
}

/// Joins a body and frontmatter mapping into a raw document.
///
/// The delimiter block is always emitted, even for an empty mapping, so that
/// `split(join(body, fm))` returns `body` unchanged.
pub fn join(body: &str, frontmatter: &Frontmatter) -> Result<String, FrontmatterError> {
    let yaml = if frontmatter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(frontmatter)
            .map_err(|err| FrontmatterError::Serialize(err.to_string()))?
    };

    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.is_empty() && !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

/// Extracts YAML frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => {
            let value = parse_yaml_block(&block)?;
            Ok(FrontmatterExtraction { value, body_start })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn parse_yaml_block(block: &str) -> Result<Frontmatter, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(Frontmatter::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn find_yaml_block(input: &str) -> Result<Option<(String, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        match next_line(without_bom, cursor) {
            Some((line, next_cursor)) => {
                if line.trim().is_empty() {
                    cursor = next_cursor;
                    continue;
                }

                if !is_yaml_fence(line) {
                    return Ok(None);
                }

                let block_start = next_cursor;
                let mut scan_cursor = next_cursor;

                loop {
                    match next_line(without_bom, scan_cursor) {
                        Some((block_line, next_line_cursor)) => {
                            if is_yaml_fence(block_line) {
                                let raw_block = &without_bom[block_start..scan_cursor];
                                let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                                let body_index = bom_len + next_line_cursor;
                                return Ok(Some((trimmed.to_string(), body_index)));
                            }
                            scan_cursor = next_line_cursor;
                        }
                        None => return Err(FrontmatterError::Unterminated),
                    }
                }
            }
            None => return Ok(None),
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        let line = &input[start..line_end];
        Some((line, line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == FENCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn extract(input: &str) -> FrontmatterExtraction {
        extract_frontmatter(input).expect("frontmatter extraction should succeed")
    }

    #[test]
    fn returns_empty_when_no_frontmatter() {
        let (fm, body) = split("# Title\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\nBody");
    }

    #[test]
    fn parses_basic_yaml() {
        let input = "---\ntitle: Example\ntags:\n  - rust\n  - docs\n---\n# Content";
        let result = extract(input);
        assert_eq!(result.body_start, input.find("# Content").unwrap());
        assert_eq!(result.value["title"], json!("Example"));
        assert_eq!(result.value["tags"], json!(["rust", "docs"]));
    }

    #[test]
    fn scalar_kinds_survive() {
        let input = "---\ncount: 3\ndraft: false\nupdated: 2024-05-01\nempty: null\n---\nbody";
        let (fm, body) = split(input).unwrap();
        assert_eq!(fm["count"], json!(3));
        assert_eq!(fm["draft"], json!(false));
        assert_eq!(fm["updated"], json!("2024-05-01"));
        assert_eq!(fm["empty"], JsonValue::Null);
        assert_eq!(body, "body");
    }

    #[test]
    fn handles_empty_block() {
        let input = "---\n---\n# Body";
        let result = extract(input);
        assert!(result.value.is_empty());
        assert_eq!(result.body_start, input.find("# Body").unwrap());
    }

    #[test]
    fn preserves_bom_and_whitespace() {
        let input = "\u{feff}\n   \n---\nfoo: bar\n---\nBody";
        let result = extract(input);
        assert_eq!(result.value["foo"], json!("bar"));
        assert_eq!(result.body_start, input.find("Body").unwrap());
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let input = "---\ninvalid: [unterminated\n---\n";
        let err = extract_frontmatter(input).unwrap_err();
        assert!(matches!(err, FrontmatterError::Parse(_)), "{err:?}");
    }

    #[test]
    fn errors_on_unterminated_block() {
        let err = split("---\ntitle: test").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }

    #[test]
    fn errors_on_sequence_root() {
        let err = split("---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontmatterError::InvalidRootType));
    }

    #[test]
    fn join_writes_delimited_block() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), json!("Hello"));
        let raw = join("# Body", &fm).unwrap();
        insta::assert_snapshot!(raw, @r"
        ---
        title: Hello
        ---
        # Body
        ");
    }

    #[test]
    fn join_keeps_block_for_empty_mapping() {
        let raw = join("\n\ntext", &Frontmatter::new()).unwrap();
        assert_eq!(raw, "---\n---\n\n\ntext");
        let (fm, body) = split(&raw).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "\n\ntext");
    }

    #[test]
    fn source_document_round_trip() {
        let raw = "---\ntitle: Guide\norder: 2\n---\n\n# Guide\n";
        let doc = SourceDocument::parse(raw).unwrap();
        assert_eq!(doc.title(), Some("Guide"));
        let again = SourceDocument::parse(&doc.to_raw().unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    fn scalar() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            "[a-zA-Z0-9 ,.:'-]{0,24}".prop_map(JsonValue::from),
            any::<i32>().prop_map(JsonValue::from),
            any::<bool>().prop_map(JsonValue::from),
            Just(JsonValue::Null),
            proptest::collection::vec("[a-z0-9 ]{0,12}", 0..4).prop_map(JsonValue::from),
        ]
    }

    proptest! {
        #[test]
        fn split_inverts_join(
            entries in proptest::collection::vec(("[a-z][a-z0-9_]{0,10}", scalar()), 0..6),
            body in "[^-][\\s\\S]{0,200}|",
        ) {
            let frontmatter: Frontmatter = entries.into_iter().collect();
            let raw = join(&body, &frontmatter).unwrap();
            let (parsed, parsed_body) = split(&raw).unwrap();
            prop_assert_eq!(parsed, frontmatter);
            prop_assert_eq!(parsed_body, body.as_str());
        }
    }
}
