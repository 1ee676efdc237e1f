//! Inline SVG icons for cards.

const SVG_OPEN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true" class="card__icon">"#;

/// Returns the SVG markup for an icon key, or `None` for unknown keys.
pub fn icon_svg(key: &str) -> Option<String> {
    let body = match key {
        "BookOpen" => {
            r#"<path d="M2 3h6a4 4 0 0 1 4 4v14a3 3 0 0 0-3-3H2z"/><path d="M22 3h-6a4 4 0 0 0-4 4v14a3 3 0 0 1 3-3h7z"/>"#
        }
        "PanelsTopLeft" => {
            r#"<rect width="18" height="18" x="3" y="3" rx="2"/><path d="M3 9h18"/><path d="M9 21V9"/>"#
        }
        "Shapes" => {
            r#"<path d="M8.3 10a.7.7 0 0 1-.626-1.079L11.4 3a.7.7 0 0 1 1.198-.043L16.3 8.9a.7.7 0 0 1-.572 1.1Z"/><rect x="3" y="14" width="7" height="7" rx="1"/><circle cx="17.5" cy="17.5" r="3.5"/>"#
        }
        _ => return None,
    };
    Some(format!("{SVG_OPEN}{body}</svg>"))
}
