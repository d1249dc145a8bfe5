//! Pure selector generators, in priority order.

use crate::capture::CapturedElement;

/// One named locator strategy.
pub type Generator = (&'static str, fn(&CapturedElement) -> Vec<String>);

/// Attribute-based strategies, most stable first.
pub const GENERATORS: [Generator; 6] = [
    ("id", by_id),
    ("name", by_name),
    ("placeholder", by_placeholder),
    ("data", by_data_attribute),
    ("aria-label", by_aria_label),
    ("class", by_classes),
];

const MAX_CLASSES: usize = 4;

/// Every attribute-based candidate for `element`, in priority order.
pub fn candidates(element: &CapturedElement) -> Vec<String> {
    GENERATORS
        .iter()
        .flat_map(|(_, generate)| generate(element))
        .collect()
}

fn by_id(el: &CapturedElement) -> Vec<String> {
    present(el.id.as_deref())
        .map(id_selector)
        .into_iter()
        .collect()
}

fn by_name(el: &CapturedElement) -> Vec<String> {
    attribute(el, "name", el.name.as_deref())
}

fn by_placeholder(el: &CapturedElement) -> Vec<String> {
    attribute(el, "placeholder", el.placeholder.as_deref())
}

fn by_data_attribute(el: &CapturedElement) -> Vec<String> {
    [("data-testid", el.test_id.as_deref()), ("data-id", el.data_id.as_deref())]
        .into_iter()
        .filter_map(|(attr, value)| present(value).map(|v| format!("[{}=\"{}\"]", attr, quote(v))))
        .collect()
}

fn by_aria_label(el: &CapturedElement) -> Vec<String> {
    attribute(el, "aria-label", el.aria_label.as_deref())
}

/// Single classes, then pairs, then the first three together.
fn by_classes(el: &CapturedElement) -> Vec<String> {
    let classes: Vec<&str> = el
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| is_ident(c))
        .take(MAX_CLASSES)
        .collect();

    let mut out: Vec<String> = classes
        .iter()
        .map(|c| format!("{}.{}", el.tag, c))
        .collect();
    for (i, a) in classes.iter().enumerate() {
        for b in &classes[i + 1..] {
            out.push(format!("{}.{}.{}", el.tag, a, b));
        }
    }
    if classes.len() >= 3 {
        out.push(format!("{}.{}", el.tag, classes[..3].join(".")));
    }
    out
}

/// `nth-child` path from the nearest ancestor with an id, or from the root.
pub fn structural_path(el: &CapturedElement) -> Option<String> {
    let (last, rest) = el.path.split_last()?;
    let mut parts: Vec<String> = Vec::with_capacity(el.path.len());

    match present(last.id.as_deref()) {
        Some(id) if !rest.is_empty() => parts.push(id_selector(id)),
        _ if last.tag == "html" => parts.push("html".to_string()),
        _ => parts.push(format!("{}:nth-child({})", last.tag, last.nth)),
    }
    for step in rest.iter().rev() {
        parts.push(format!("{}:nth-child({})", step.tag, step.nth));
    }
    Some(parts.join(" > "))
}

fn attribute(el: &CapturedElement, attr: &str, value: Option<&str>) -> Vec<String> {
    present(value)
        .map(|v| format!("{}[{}=\"{}\"]", el.tag, attr, quote(v)))
        .into_iter()
        .collect()
}

fn id_selector(id: &str) -> String {
    if is_ident(id) {
        format!("#{}", id)
    } else {
        format!("[id=\"{}\"]", quote(id))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A CSS identifier usable without escaping.
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some('-') => {
            if !chars.clone().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
                return false;
            }
        }
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PathStep;

    fn step(tag: &str, id: Option<&str>, nth: u32) -> PathStep {
        PathStep {
            tag: tag.into(),
            id: id.map(str::to_string),
            nth,
        }
    }

    #[test]
    fn test_priority_order() {
        let el = CapturedElement {
            tag: "input".into(),
            id: Some("email".into()),
            name: Some("email".into()),
            placeholder: Some("Email".into()),
            test_id: Some("login-email".into()),
            aria_label: Some("Email address".into()),
            classes: vec!["field".into()],
            ..Default::default()
        };
        assert_eq!(
            candidates(&el),
            vec![
                "#email",
                "input[name=\"email\"]",
                "input[placeholder=\"Email\"]",
                "[data-testid=\"login-email\"]",
                "input[aria-label=\"Email address\"]",
                "input.field",
            ]
        );
    }

    #[test]
    fn test_generator_names_are_ordered() {
        let names: Vec<&str> = GENERATORS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["id", "name", "placeholder", "data", "aria-label", "class"]);
    }

    #[test]
    fn test_unsafe_id_uses_attribute_form() {
        let el = CapturedElement {
            tag: "div".into(),
            id: Some(":r1:".into()),
            ..Default::default()
        };
        assert_eq!(candidates(&el), vec!["[id=\":r1:\"]"]);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let el = CapturedElement {
            tag: "input".into(),
            placeholder: Some("Say \"hi\"".into()),
            ..Default::default()
        };
        assert_eq!(candidates(&el), vec!["input[placeholder=\"Say \\\"hi\\\"\"]"]);
    }

    #[test]
    fn test_class_combinations() {
        let el = CapturedElement {
            tag: "a".into(),
            classes: vec!["nav".into(), "item".into(), "active".into(), "9bad".into()],
            ..Default::default()
        };
        assert_eq!(
            by_classes(&el),
            vec![
                "a.nav",
                "a.item",
                "a.active",
                "a.nav.item",
                "a.nav.active",
                "a.item.active",
                "a.nav.item.active",
            ]
        );
    }

    #[test]
    fn test_structural_path_from_anchor() {
        let el = CapturedElement {
            tag: "button".into(),
            path: vec![
                step("button", None, 2),
                step("div", None, 3),
                step("form", Some("login"), 1),
            ],
            ..Default::default()
        };
        assert_eq!(
            structural_path(&el).as_deref(),
            Some("#login > div:nth-child(3) > button:nth-child(2)")
        );
    }

    #[test]
    fn test_structural_path_from_root() {
        let el = CapturedElement {
            tag: "span".into(),
            path: vec![step("span", None, 1), step("body", None, 2), step("html", None, 1)],
            ..Default::default()
        };
        assert_eq!(
            structural_path(&el).as_deref(),
            Some("html > body:nth-child(2) > span:nth-child(1)")
        );
    }

    #[test]
    fn test_structural_path_needs_ancestry() {
        let el = CapturedElement {
            tag: "span".into(),
            ..Default::default()
        };
        assert!(structural_path(&el).is_none());
    }

    #[test]
    fn test_is_ident() {
        assert!(is_ident("submit-btn"));
        assert!(is_ident("_x"));
        assert!(is_ident("-webkit"));
        assert!(!is_ident("1col"));
        assert!(!is_ident("--"));
        assert!(!is_ident("a:b"));
    }
}
