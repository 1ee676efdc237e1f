//! Typed forms of the custom block components.

use crate::transform::{DIAGRAM_COMPONENT, DIAGRAM_SOURCE_PROP};
use crate::tree::{Component, PropValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a component's props could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    /// `variant` is not one of the known alert variants.
    #[error("unknown alert variant `{0}`")]
    UnknownVariant(String),
    /// The card list could not be parsed.
    #[error("invalid card list: {0}")]
    InvalidCards(String),
    /// A required prop is missing.
    #[error("missing `{0}` prop")]
    MissingProp(&'static str),
}

/// Alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    /// Neutral information.
    #[default]
    Info,
    /// Something to be careful about.
    Warning,
    /// Something that must not be missed.
    Important,
}

impl AlertVariant {
    /// Parses a `variant` prop. `default` and `destructive` are accepted as
    /// aliases for `info` and `important`.
    pub fn parse(value: &str) -> Result<Self, BlockError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "info" | "note" | "default" => Ok(AlertVariant::Info),
            "warning" | "caution" => Ok(AlertVariant::Warning),
            "important" | "destructive" | "danger" => Ok(AlertVariant::Important),
            _ => Err(BlockError::UnknownVariant(value.to_string())),
        }
    }

    /// Lowercase name used in class names.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertVariant::Info => "info",
            AlertVariant::Warning => "warning",
            AlertVariant::Important => "important",
        }
    }
}

/// One navigation card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card heading.
    pub title: String,
    /// Secondary line.
    #[serde(default)]
    pub description: String,
    /// Link target.
    #[serde(alias = "href")]
    pub url: String,
    /// Icon key (`BookOpen`, `PanelsTopLeft`, `Shapes`).
    #[serde(default)]
    pub icon: Option<String>,
}

impl Card {
    /// Reads a card from `<Card title=".." url=".." />` props.
    pub fn from_component(component: &Component) -> Result<Self, BlockError> {
        let title = component
            .string_prop("title")
            .ok_or(BlockError::MissingProp("title"))?;
        let url = component
            .string_prop("url")
            .or_else(|| component.string_prop("href"))
            .ok_or(BlockError::MissingProp("url"))?;
        Ok(Card {
            title,
            description: component.string_prop("description").unwrap_or_default(),
            url,
            icon: component.string_prop("icon"),
        })
    }
}

/// An `<Alert>` callout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertBlock {
    /// Severity.
    pub variant: AlertVariant,
    /// Optional heading from the `title` prop.
    pub title: Option<String>,
}

impl AlertBlock {
    /// Reads an `<Alert>`. An unknown variant is reported and treated as info.
    pub fn from_component(component: &Component) -> (Self, Option<BlockError>) {
        let (variant, error) = match component.string_prop("variant") {
            None => (AlertVariant::Info, None),
            Some(value) => match AlertVariant::parse(&value) {
                Ok(v) => (v, None),
                Err(err) => (AlertVariant::Info, Some(err)),
            },
        };
        let title = component.string_prop("title");
        (AlertBlock { variant, title }, error)
    }
}

/// A `<Cards>` grid of link cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardGrid {
    /// Cards in display order.
    pub cards: Vec<Card>,
}

impl CardGrid {
    /// Reads the `content` prop and any `<Card>` children.
    ///
    /// Cards that cannot be read are skipped and their errors returned.
    pub fn from_component(component: &Component) -> (Self, Vec<BlockError>) {
        let mut cards = Vec::new();
        let mut errors = Vec::new();

        if let Some(prop) = component.prop("content").or_else(|| component.prop("cards")) {
            match parse_cards(prop) {
                Ok(parsed) => cards.extend(parsed),
                Err(err) => errors.push(err),
            }
        }
        for child in component.children.iter().filter_map(|c| c.as_component()) {
            if child.name != CARD_COMPONENT {
                continue;
            }
            match Card::from_component(child) {
                Ok(card) => cards.push(card),
                Err(err) => errors.push(err),
            }
        }
        (CardGrid { cards }, errors)
    }
}

/// An `<ImageFrame>`: an image in a bordered frame with an optional caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FramedImage {
    /// Image URL; when absent the children are framed instead.
    pub src: Option<String>,
    /// Alt text.
    pub alt: String,
    /// Caption below the frame.
    pub caption: Option<String>,
}

impl FramedImage {
    /// Reads `src`, `alt` and `caption` (or `title`).
    pub fn from_component(component: &Component) -> Self {
        FramedImage {
            src: component.string_prop("src"),
            alt: component.string_prop("alt").unwrap_or_default(),
            caption: component
                .string_prop("caption")
                .or_else(|| component.string_prop("title")),
        }
    }
}

/// A diagram drawn from source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagram {
    /// Diagram source.
    pub source: String,
}

impl Diagram {
    /// Reads the `chart` prop.
    pub fn from_component(component: &Component) -> Result<Self, BlockError> {
        component
            .string_prop(DIAGRAM_SOURCE_PROP)
            .map(|source| Diagram { source })
            .ok_or(BlockError::MissingProp(DIAGRAM_SOURCE_PROP))
    }
}

/// Tag name of a single card inside `<Cards>`.
pub const CARD_COMPONENT: &str = "Card";

/// A custom block after its props have been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CustomBlock {
    /// A callout box.
    Alert(AlertBlock),
    /// A grid of link cards.
    CardGrid(CardGrid),
    /// A framed image.
    FramedImage(FramedImage),
    /// A diagram.
    Diagram(Diagram),
}

impl CustomBlock {
    /// Reads a known block component strictly: any prop problem is an error.
    ///
    /// Returns `None` for tags that are not custom blocks.
    pub fn from_component(component: &Component) -> Option<Result<Self, BlockError>> {
        let block = match component.name.as_str() {
            "Alert" => match AlertBlock::from_component(component) {
                (alert, None) => Ok(CustomBlock::Alert(alert)),
                (_, Some(err)) => Err(err),
            },
            "Cards" => {
                let (grid, mut errors) = CardGrid::from_component(component);
                if errors.is_empty() {
                    Ok(CustomBlock::CardGrid(grid))
                } else {
                    Err(errors.remove(0))
                }
            }
            "ImageFrame" | "Frame" => Ok(CustomBlock::FramedImage(FramedImage::from_component(
                component,
            ))),
            DIAGRAM_COMPONENT => Diagram::from_component(component).map(CustomBlock::Diagram),
            _ => return None,
        };
        Some(block)
    }
}

/// Parses a card list written as JSON or as a JavaScript array literal
/// (`[{ title: 'Intro', url: "/docs" },]`).
pub fn parse_cards(prop: &PropValue) -> Result<Vec<Card>, BlockError> {
    let source = match prop {
        PropValue::Literal { value } => value.clone(),
        PropValue::Expression { value } => normalize_object_literal(value),
    };
    serde_json::from_str(&source).map_err(|err| BlockError::InvalidCards(err.to_string()))
}

/// Rewrites a JavaScript object/array literal into JSON: quotes bare keys,
/// converts single-quoted and template strings, drops trailing commas and
/// line comments.
pub fn normalize_object_literal(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' | '`' => {
                let (value, next) = read_string(&chars, i);
                out.push_str(&serde_json::Value::String(value).to_string());
                i = next;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ',' => {
                let next = skip_trivia(&chars, i + 1);
                if !matches!(chars.get(next), Some('}' | ']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if chars.get(skip_whitespace(&chars, i)) == Some(&':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Skips whitespace and `//` comments.
fn skip_trivia(chars: &[char], mut i: usize) -> usize {
    loop {
        i = skip_whitespace(chars, i);
        if chars.get(i) == Some(&'/') && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else {
            return i;
        }
    }
}

/// Reads a quoted string starting at `start`; returns its value and the
/// index after the closing quote.
fn read_string(chars: &[char], start: usize) -> (String, usize) {
    let quote = chars[start];
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' && i + 1 < chars.len() {
            value.push(match chars[i + 1] {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            });
            i += 2;
            continue;
        }
        if ch == quote {
            return (value, i + 1);
        }
        value.push(ch);
        i += 1;
    }
    (value, i)
}
