//! Composite icon generation
//!
//! Third preparation step: merge each downloaded flag with a recolored
//! gender glyph into the standalone icon files the snippet renderer
//! links to. The glyph sits in the lower-right corner at a quarter of
//! the flag's smaller viewBox dimension.

use forvodb_common::country::load_country_mappings;
use forvodb_common::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const VENUS_COLOR: &str = "#FF69B4";
pub const MARS_COLOR: &str = "#1E90FF";

/// Corner inset of the gender glyph, in viewBox units.
const GLYPH_OFFSET: f64 = 5.0;
/// The gender glyphs are drawn on a 512-unit canvas.
const GLYPH_CANVAS: f64 = 512.0;

const SHAPE_TAGS: [&str; 7] = [
    "path", "circle", "rect", "ellipse", "polygon", "polyline", "line",
];
const CONTAINER_TAGS: [&str; 6] = [
    "defs",
    "mask",
    "clipPath",
    "pattern",
    "linearGradient",
    "radialGradient",
];

/// The slice of the origin stats file this step reads.
#[derive(Debug, Deserialize)]
pub struct OriginCombinations {
    #[serde(default)]
    pub unique_combinations: Vec<(String, String)>,
}

/// Root dimensions and inner markup of one SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    pub width: String,
    pub height: String,
    pub view_box: String,
    pub inner: String,
}

/// Extract the root svg element's dimensions and inner markup.
pub fn parse_svg(contents: &str) -> Result<SvgDocument> {
    let mut reader = Reader::from_str(contents);
    loop {
        match reader
            .read_event()
            .map_err(|e| Error::InvalidInput(format!("SVG parse error: {}", e)))?
        {
            Event::Start(e) if e.local_name().as_ref() == b"svg" => {
                let (width, height, view_box) = dimensions(&e)?;
                let span = reader
                    .read_to_end(e.name())
                    .map_err(|err| Error::InvalidInput(format!("SVG parse error: {}", err)))?;
                let inner = contents[span].to_string();
                return Ok(SvgDocument {
                    width,
                    height,
                    view_box,
                    inner,
                });
            }
            Event::Empty(e) if e.local_name().as_ref() == b"svg" => {
                let (width, height, view_box) = dimensions(&e)?;
                return Ok(SvgDocument {
                    width,
                    height,
                    view_box,
                    inner: String::new(),
                });
            }
            Event::Eof => {
                return Err(Error::InvalidInput("no <svg> root element".to_string()));
            }
            _ => {}
        }
    }
}

fn dimensions(e: &BytesStart) -> Result<(String, String, String)> {
    let mut width = None;
    let mut height = None;
    let mut view_box = None;

    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| Error::InvalidInput(format!("SVG attribute error: {}", err)))?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"width" => width = Some(value),
            b"height" => height = Some(value),
            b"viewBox" => view_box = Some(value),
            _ => {}
        }
    }

    let width = width.unwrap_or_else(|| "24".to_string());
    let height = height.unwrap_or_else(|| "24".to_string());
    let view_box = view_box.unwrap_or_else(|| format!("0 0 {} {}", width, height));
    Ok((width, height, view_box))
}

fn parse_view_box(view_box: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = view_box
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::InvalidInput(format!("bad viewBox '{}': {}", view_box, e)))?;
    if parts.len() != 4 {
        return Err(Error::InvalidInput(format!("bad viewBox '{}'", view_box)));
    }
    Ok((parts[0], parts[1], parts[2], parts[3]))
}

/// Rewrite fills in glyph markup: elements with an explicit fill other
/// than none/transparent take the new color, bare shape elements gain
/// one, gradient/mask containers keep theirs.
pub fn recolor(inner: &str, color: &str) -> Result<String> {
    let mut reader = Reader::from_str(inner);
    let mut out = String::with_capacity(inner.len());

    loop {
        match reader
            .read_event()
            .map_err(|e| Error::InvalidInput(format!("SVG parse error: {}", e)))?
        {
            Event::Start(e) => emit_tag(&mut out, &e, color, false)?,
            Event::Empty(e) => emit_tag(&mut out, &e, color, true)?,
            Event::End(e) => {
                out.push_str("</");
                out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
                out.push('>');
            }
            Event::Text(t) => out.push_str(&String::from_utf8_lossy(t.as_ref())),
            Event::CData(t) => {
                out.push_str("<![CDATA[");
                out.push_str(&String::from_utf8_lossy(t.as_ref()));
                out.push_str("]]>");
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

fn emit_tag(out: &mut String, e: &BytesStart, color: &str, self_closing: bool) -> Result<()> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let is_container = CONTAINER_TAGS.contains(&local.as_str());

    out.push('<');
    out.push_str(&name);

    let mut has_fill = false;
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| Error::InvalidInput(format!("SVG attribute error: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let mut value = String::from_utf8_lossy(&attr.value).into_owned();

        if key == "fill" {
            has_fill = true;
            if !is_container && value != "none" && value != "transparent" {
                value = color.to_string();
            }
        }

        out.push(' ');
        out.push_str(&key);
        out.push_str("=\"");
        out.push_str(&value);
        out.push('"');
    }

    if !has_fill && !is_container && SHAPE_TAGS.contains(&local.as_str()) {
        out.push_str(" fill=\"");
        out.push_str(color);
        out.push('"');
    }

    out.push_str(if self_closing { "/>" } else { ">" });
    Ok(())
}

/// Assemble the composite: flag markup verbatim, then the glyph in a
/// translated and scaled group at the lower-right corner.
pub fn compose_icon(flag: &SvgDocument, glyph_inner: Option<&str>) -> Result<String> {
    let (vb_x, vb_y, vb_w, vb_h) = parse_view_box(&flag.view_box)?;
    let icon_size = vb_w.min(vb_h) / 4.0;

    let mut svg = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}">{}"#,
        flag.width, flag.height, flag.view_box, flag.inner
    );

    if let Some(glyph) = glyph_inner {
        let x = vb_x + vb_w - icon_size - GLYPH_OFFSET;
        let y = vb_y + vb_h - icon_size - GLYPH_OFFSET;
        let scale = icon_size / GLYPH_CANVAS;
        svg.push_str(&format!(
            r#"<g transform="translate({}, {}) scale({})">{}</g>"#,
            x, y, scale, glyph
        ));
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Output filename for one (gender, iso) combination. The gender label
/// is used verbatim (lowercased, spaces to underscores); the no-gender
/// variant keeps a leading underscore so it stays distinct from the
/// bare flag file.
pub fn icon_filename(gender: &str, iso_code: &str) -> String {
    let gender_safe = gender.to_lowercase().replace(' ', "_");
    if gender_safe.is_empty() {
        format!("_{}.svg", iso_code)
    } else {
        format!("{}_{}.svg", gender_safe, iso_code)
    }
}

/// Pick the glyph for a gender label. "female" must be tested before
/// "male" because it contains it; labels matching neither get no glyph.
fn glyph_for<'a>(gender: &str, venus: &'a str, mars: &'a str) -> Option<&'a str> {
    let gender_lower = gender.to_lowercase();
    if gender_lower.contains("female") {
        Some(venus)
    } else if gender_lower.contains("male") {
        Some(mars)
    } else {
        None
    }
}

/// Run the icons step end to end; returns (created, total combinations).
pub fn run(
    origins_file: &Path,
    mappings_file: &Path,
    flags_dir: &Path,
    venus: &Path,
    mars: &Path,
    output: &Path,
) -> Result<(usize, usize)> {
    fs::create_dir_all(output)?;

    let venus_doc = parse_svg(&fs::read_to_string(venus)?)?;
    let mars_doc = parse_svg(&fs::read_to_string(mars)?)?;
    let venus_glyph = recolor(&venus_doc.inner, VENUS_COLOR)?;
    let mars_glyph = recolor(&mars_doc.inner, MARS_COLOR)?;

    let mappings = load_country_mappings(mappings_file);
    let stats: OriginCombinations = serde_json::from_str(&fs::read_to_string(origins_file)?)?;

    let total = stats.unique_combinations.len();
    let mut created = 0usize;

    for (gender, country) in &stats.unique_combinations {
        let Some(mapping) = mappings.get(&country.to_lowercase()) else {
            warn!("Country not mapped: {} - skipping", country);
            continue;
        };
        let (Some(iso_code), Some(flag_file)) =
            (mapping.iso_code.as_deref(), mapping.flag_file.as_deref())
        else {
            warn!("No flag file for: {} - skipping", country);
            continue;
        };

        let flag_path = flags_dir.join(flag_file);
        if !flag_path.exists() {
            warn!("Flag file missing: {} - skipping", flag_path.display());
            continue;
        }

        let filename = icon_filename(gender, iso_code);
        let glyph = glyph_for(gender, &venus_glyph, &mars_glyph);

        let composite = match fs::read_to_string(&flag_path)
            .map_err(Error::from)
            .and_then(|contents| parse_svg(&contents))
            .and_then(|flag| compose_icon(&flag, glyph))
        {
            Ok(svg) => svg,
            Err(e) => {
                warn!("Error creating {}: {}", filename, e);
                continue;
            }
        };

        if let Err(e) = fs::write(output.join(&filename), composite) {
            warn!("Error creating {}: {}", filename, e);
            continue;
        }
        created += 1;
        info!("Created: {}", filename);
    }

    info!("Successfully created {} out of {} icons", created, total);
    Ok((created, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512"><circle cx="256" cy="256" r="256" fill="#d80027"/></svg>"##;
    const GLYPH: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512"><path d="M0 0h10"/></svg>"#;

    #[test]
    fn test_parse_svg_extracts_root_and_inner() {
        let doc = parse_svg(FLAG).unwrap();
        assert_eq!(doc.width, "512");
        assert_eq!(doc.height, "512");
        assert_eq!(doc.view_box, "0 0 512 512");
        assert!(doc.inner.contains("circle"));
    }

    #[test]
    fn test_parse_svg_defaults_missing_dimensions() {
        let doc = parse_svg(r#"<svg><path d="M0 0"/></svg>"#).unwrap();
        assert_eq!(doc.width, "24");
        assert_eq!(doc.height, "24");
        assert_eq!(doc.view_box, "0 0 24 24");
    }

    #[test]
    fn test_parse_svg_rejects_non_svg() {
        assert!(parse_svg("<html></html>").is_err());
    }

    #[test]
    fn test_recolor_adds_fill_to_bare_shapes() {
        let doc = parse_svg(GLYPH).unwrap();
        let recolored = recolor(&doc.inner, VENUS_COLOR).unwrap();
        assert!(recolored.contains(r##"fill="#FF69B4""##));
    }

    #[test]
    fn test_recolor_overrides_explicit_fill_but_keeps_none() {
        let inner = r##"<path d="M0 0" fill="#000000"/><path d="M1 1" fill="none"/>"##;
        let recolored = recolor(inner, MARS_COLOR).unwrap();
        assert!(recolored.contains(r##"fill="#1E90FF""##));
        assert!(recolored.contains(r#"fill="none""#));
        assert!(!recolored.contains("#000000"));
    }

    #[test]
    fn test_recolor_leaves_gradient_containers_alone() {
        let inner = r##"<linearGradient fill="#123456"></linearGradient>"##;
        let recolored = recolor(inner, MARS_COLOR).unwrap();
        assert!(recolored.contains("#123456"));
    }

    #[test]
    fn test_compose_places_scaled_glyph() {
        let flag = parse_svg(FLAG).unwrap();
        let svg = compose_icon(&flag, Some(r#"<path d="M0 0h10"/>"#)).unwrap();

        // icon_size = 512/4 = 128; x = y = 512 - 128 - 5 = 379; scale = 0.25
        assert!(svg.contains("translate(379, 379) scale(0.25)"));
        assert!(svg.contains("circle"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_compose_without_glyph_keeps_flag_only() {
        let flag = parse_svg(FLAG).unwrap();
        let svg = compose_icon(&flag, None).unwrap();
        assert!(!svg.contains("<g transform"));
    }

    #[test]
    fn test_icon_filename_rules() {
        assert_eq!(icon_filename("Male", "JP"), "male_JP.svg");
        assert_eq!(icon_filename("", "JP"), "_JP.svg");
        assert_eq!(icon_filename("other gender", "FR"), "other_gender_FR.svg");
    }

    #[test]
    fn test_glyph_selection_checks_female_first() {
        assert_eq!(glyph_for("female", "v", "m"), Some("v"));
        assert_eq!(glyph_for("Female voice", "v", "m"), Some("v"));
        assert_eq!(glyph_for("male", "v", "m"), Some("m"));
        assert_eq!(glyph_for("robot", "v", "m"), None);
    }
}
