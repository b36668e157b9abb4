use regex::Regex;

/// Placeholder name to text, in the order they are substituted
pub type TemplateFields = Vec<(String, String)>;

/// Departure line placeholders are this prefix and a two-digit index
pub const DEPARTURE_SLOT: &str = "DEPARTURE_";

const LINE_HEIGHT: &str = "1.2em";

pub fn departure_slot(index: usize) -> String {
    format!("{}{:02}", DEPARTURE_SLOT, index)
}

/// Fills the board template.
///
/// Multi-line values placed as the content of a `<text>` element become one
/// `<tspan>` per line at the element's `x`. Departure slots left without a
/// value are blanked.
pub struct TemplateFiller {
    re_slot: Regex,
    re_x: Regex,
}

impl Default for TemplateFiller {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateFiller {
    pub fn new() -> Self {
        let re_slot = Regex::new(&format!(r"{}\d+", DEPARTURE_SLOT)).unwrap();
        let re_x = Regex::new(r#"\bx\s*=\s*"([^"]*)""#).unwrap();
        Self { re_slot, re_x }
    }

    /// Replaces the first occurrence of each placeholder with its escaped value
    pub fn fill(&self, template: &str, fields: &[(String, String)]) -> String {
        let svg = fields.iter().fold(template.to_string(), |svg, (key, value)| {
            log::debug!("Replaces \"{}\" with \"{:?}\"", key, value);
            self.fill_placeholder(&svg, key, value)
        });
        self.re_slot.replace_all(&svg, "").into_owned()
    }

    fn fill_placeholder(&self, svg: &str, key: &str, value: &str) -> String {
        let Some(start) = svg.find(key) else {
            return svg.to_string();
        };
        let before = &svg[..start];
        let after = &svg[start + key.len()..];

        let text = match value.contains('\n') {
            true => self
                .text_x(before)
                .map(|x| tspans(value, x))
                .unwrap_or_else(|| escape_xml(value)),
            false => escape_xml(value),
        };
        format!("{}{}{}", before, text, after)
    }

    /// `x` of the `<text>` element whose content starts where `before` ends
    fn text_x<'a>(&self, before: &'a str) -> Option<&'a str> {
        let open = before.rfind("<text")?;
        let tag = &before[open..];
        let close = tag.find('>')?;
        if !tag[close + 1..].trim().is_empty() {
            return None;
        }
        self.re_x
            .captures(&tag[..close])
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

fn tspans(value: &str, x: &str) -> String {
    value
        .lines()
        .enumerate()
        .map(|(i, line)| match i {
            0 => format!(r#"<tspan x="{}">{}</tspan>"#, x, escape_xml(line)),
            _ => format!(
                r#"<tspan x="{}" dy="{}">{}</tspan>"#,
                x,
                LINE_HEIGHT,
                escape_xml(line)
            ),
        })
        .collect()
}

pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
