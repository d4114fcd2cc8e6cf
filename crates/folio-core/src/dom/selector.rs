/// Compound selector: optional tag plus any number of `#id`, `.class`,
/// `[attr]` and `[attr=value]` parts. Combinators are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

const PART_START: [char; 3] = ['#', '.', '['];

impl Selector {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }

        let mut selector = Selector::default();
        let tag_end = input.find(PART_START).unwrap_or(input.len());
        let tag = &input[..tag_end];
        if !tag.is_empty() && tag != "*" {
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &input[tag_end..];
        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body.find(PART_START).unwrap_or(body.len());
                    let name = &body[..end];
                    if name.is_empty() {
                        return None;
                    }
                    if first == '#' {
                        selector.id = Some(name.to_string());
                    } else {
                        selector.classes.push(name.to_string());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = rest[1..close].trim();
                    let (name, value) = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim(),
                            Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
                        ),
                        None => (inner, None),
                    };
                    if name.is_empty() {
                        return None;
                    }
                    selector.attributes.push((name.to_string(), value));
                    rest = &rest[close + 1..];
                }
                _ => return None,
            }
        }

        Some(selector)
    }

    /// Match against an element's tag, class list and attribute lookup
    pub fn matches<'a>(
        &self,
        tag: &str,
        classes: &[String],
        attribute: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        if let Some(ref want) = self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(ref want) = self.id {
            if attribute("id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, value)| match (attribute(name), value) {
            (Some(_), None) => true,
            (Some(actual), Some(want)) => actual == want,
            (None, _) => false,
        })
    }
}
