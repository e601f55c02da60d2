//! Formatting helpers shared by every view of a recipe

use crate::model::Recipe;
use scraper::Html;

/// Plain text of an HTML fragment such as a recipe summary
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect::<String>()
}

/// Cut `text` to `length` characters, marking the cut with `...`
pub fn truncate_text(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(length).collect();
    truncated.push_str("...");
    truncated
}

/// Human readable duration: `45 mins`, `1h 30m`, `2h`
pub fn format_time(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} mins", minutes);
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}h {}m", hours, remaining)
    } else {
        format!("{}h", hours)
    }
}

/// Stock photo used when a recipe comes without an image
pub fn placeholder_image(width: u32, height: u32) -> String {
    format!(
        "https://images.pexels.com/photos/1640777/pexels-photo-1640777.jpeg?auto=compress&cs=tinysrgb&w={}&h={}",
        width, height
    )
}

/// The image to show for a recipe: its own image, else the placeholder
pub fn display_image(recipe: &Recipe, width: u32, height: u32) -> String {
    if recipe.image.trim().is_empty() {
        placeholder_image(width, height)
    } else {
        recipe.image.clone()
    }
}
