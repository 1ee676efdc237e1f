//! Fenced code block tracking for line-oriented scanners.
//!
//! The heading extractor walks raw text line by line; anything inside a
//! ```` ``` ```` or `~~~` fence is code and must not be read as a heading.

/// An open fence: marker character and opening run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    length: usize,
}

/// Tracks whether successive lines sit inside a fenced code block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Creates a tracker positioned outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a fence is open.
    pub fn is_inside(&self) -> bool {
        self.open.is_some()
    }

    /// Feeds one line (without its newline) and reports whether it belongs to
    /// a code fence, including the opening and closing delimiter lines.
    pub fn observe(&mut self, line: &str) -> bool {
        let (columns, offset) = leading_whitespace(line);
        let rest = &line[offset..];

        match self.open {
            None => {
                // 4+ columns of indentation is an indented code block, not a fence.
                if columns > 3 {
                    return false;
                }
                match fence_run(rest) {
                    Some((marker, length)) if opener_info_is_valid(marker, &rest[length..]) => {
                        self.open = Some(OpenFence { marker, length });
                        true
                    }
                    _ => false,
                }
            }
            Some(open) => {
                if columns <= 3
                    && let Some((marker, length)) = fence_run(rest)
                    && marker == open.marker
                    && length >= open.length
                    && rest[length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
        }
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Tabs advance to the next multiple of four columns.
fn leading_whitespace(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

fn fence_run(text: &str) -> Option<(char, usize)> {
    let first = text.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let length = text.chars().take_while(|c| *c == first).count();
    (length >= 3).then_some((first, length))
}

/// Backtick fences may not carry a backtick in their info string.
fn opener_info_is_valid(marker: char, info: &str) -> bool {
    marker != '`' || !info.contains('`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(lines: &[&str]) -> Vec<bool> {
        let mut tracker = FenceTracker::new();
        lines.iter().map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        assert_eq!(
            trace(&["text", "```js", "# not a heading", "```", "# heading"]),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn tilde_fence_ignores_backtick_closer() {
        let mut tracker = FenceTracker::new();
        tracker.observe("~~~ts");
        assert!(tracker.observe("```"));
        assert!(tracker.is_inside());
        tracker.observe("~~~");
        assert!(!tracker.is_inside());
    }

    #[test]
    fn deeply_indented_fence_not_opened() {
        assert_eq!(trace(&["    ```js", "\t```js"]), vec![false, false]);
    }

    #[test]
    fn three_space_indent_opens_fence() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.observe("   ```js"));
        assert!(tracker.is_inside());
    }

    #[test]
    fn requires_three_markers() {
        assert_eq!(trace(&["``", "~~"]), vec![false, false]);
    }

    #[test]
    fn closer_with_info_string_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.observe("```");
        tracker.observe("```js");
        assert!(tracker.is_inside());
    }

    #[test]
    fn longer_outer_fence_contains_shorter_one() {
        let mut tracker = FenceTracker::new();
        tracker.observe("````markdown");
        tracker.observe("```js");
        tracker.observe("```");
        assert!(tracker.is_inside());
        tracker.observe("`````");
        assert!(!tracker.is_inside());
    }

    #[test]
    fn inline_backticks_in_info_do_not_open() {
        assert_eq!(trace(&["``` a`b", "# heading"]), vec![false, false]);
    }
}
