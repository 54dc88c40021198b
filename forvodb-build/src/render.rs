//! Pronunciation snippet rendering
//!
//! Produces the HTML stored per word: one clickable icon per recording,
//! best-voted first. Output is byte-deterministic for a given input
//! order; there is no map iteration anywhere in the rendering path.

use crate::icons::IconResolver;
use forvodb_common::records::AudioClip;
use std::cmp::Reverse;
use tracing::debug;

/// Shared stylesheet, appended once per snippet when at least one
/// recording rendered.
const STYLE_BLOCK: &str = r#"
<style>
.audio-pronunciations {
    display: flex;
    flex-wrap: wrap;
    gap: 5px;
    align-items: center;
}
.pronunciation-item {
    display: inline-flex;
    align-items: center;
    gap: 2px;
}
.pronunciation-item a {
    text-decoration: none;
    border: none;
    display: inline-block;
}
.pronunciation-icon:hover {
    opacity: 0.7;
    transform: scale(1.1);
    transition: all 0.2s ease;
}
.vote-count {
    font-size: 0.8em;
    color: #666;
    margin-left: 2px;
}
</style>"#;

pub struct SnippetRenderer<'a> {
    icons: &'a IconResolver,
}

impl<'a> SnippetRenderer<'a> {
    pub fn new(icons: &'a IconResolver) -> Self {
        Self { icons }
    }

    /// Render the snippet for one word's recordings.
    ///
    /// Recordings sort by votes descending; the sort is stable, so equal
    /// vote counts keep their arrival order. Recordings without a
    /// resolvable icon are excluded from the markup (they still count
    /// toward the word's stored audio_count).
    pub fn render(&self, clips: &[AudioClip]) -> String {
        let mut ordered: Vec<&AudioClip> = clips.iter().collect();
        ordered.sort_by_key(|clip| Reverse(clip.votes));

        let mut html = String::from(r#"<div class="audio-pronunciations">"#);
        let mut rendered = 0usize;

        for clip in ordered {
            let Some(icon_path) = self.icons.resolve(&clip.gender, &clip.country) else {
                debug!(
                    "No icon found for {} ({}, {})",
                    clip.username, clip.gender, clip.country
                );
                continue;
            };

            let mut title = format!("{} ({})", clip.username, clip.country);
            if clip.votes > 0 {
                title.push_str(&format!(" - {} votes", clip.votes));
            }

            let badge = if clip.votes > 0 {
                format!(
                    "\n    <span class=\"vote-count\">({})</span>",
                    clip.votes
                )
            } else {
                String::new()
            };

            html.push_str(&format!(
                r#"
<div class="pronunciation-item">
    <a href="sound://{file}" title="{title}">
        <img src="{icon}" alt="{user}" class="pronunciation-icon" style="width: 24px; height: 24px; margin: 2px; border: none;">
    </a>{badge}
</div>"#,
                file = clip.file_path,
                title = title,
                icon = icon_path,
                user = clip.username,
                badge = badge,
            ));
            rendered += 1;
        }

        if rendered > 0 {
            html.push_str(STYLE_BLOCK);
        }
        html.push_str("</div>");
        html
    }
}
