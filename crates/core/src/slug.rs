use std::collections::HashMap;

/// Id used when a heading's cleaned title produces no slug characters.
pub const FALLBACK_ID: &str = "section";

/// Derives the anchor id for a heading title.
///
/// 1. Lowercase
/// 2. Replace each run of whitespace with a single hyphen
/// 3. Drop every character outside `[a-z0-9-]`
/// 4. Fall back to `section` when nothing is left
///
/// ```
/// use docsmith_core::slug::anchor_id;
///
/// assert_eq!(anchor_id("Hello World"), "hello-world");
/// assert_eq!(anchor_id("¿¡!?"), "section");
/// ```
pub fn anchor_id(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }

    if slug.is_empty() {
        slug.push_str(FALLBACK_ID);
    }
    slug
}

/// Anchor id generator shared by the live TOC and the render-time slug stage.
///
/// Without de-duplication every title maps straight through [`anchor_id`], so
/// repeated headings share an id. With de-duplication the second and later
/// occurrences get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
    dedupe: bool,
}

impl Slugger {
    /// Creates a slugger that never rewrites repeated ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slugger that suffixes repeated ids.
    pub fn deduplicating() -> Self {
        Self {
            counts: HashMap::new(),
            dedupe: true,
        }
    }

    /// Creates a slugger with the given de-duplication mode.
    pub fn with_dedupe(dedupe: bool) -> Self {
        Self {
            counts: HashMap::new(),
            dedupe,
        }
    }

    /// Generates the next id for the given heading title.
    pub fn next_id(&mut self, title: &str) -> String {
        let mut id = anchor_id(title);
        if !self.dedupe {
            return id;
        }

        let entry = self.counts.entry(id.clone()).or_insert(0);
        if *entry > 0 {
            id.push_str(&format!("-{}", *entry));
        }
        *entry += 1;
        id
    }
}
