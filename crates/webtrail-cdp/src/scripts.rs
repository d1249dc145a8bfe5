//! In-page JavaScript used by the CDP driver.
//!
//! Elements handed out by the driver are tagged with a `data-webtrail-id`
//! attribute; that id is the [`ElementHandle`] value.
//!
//! [`ElementHandle`]: webtrail_protocols::ElementHandle

use serde::Serialize;

/// Attribute carrying the driver-assigned element id.
pub const HANDLE_ATTR: &str = "data-webtrail-id";

/// Serializes an element into an `ElementSnapshot`. Declared inside each
/// script's own function scope, so repeated evaluation never redeclares it.
const DESCRIBE_FN: &str = r#"
const __wtDescribe = (el) => {
    if (!el.hasAttribute('data-webtrail-id')) {
        window.__webtrailSeq = (window.__webtrailSeq || 0) + 1;
        el.setAttribute('data-webtrail-id', 'wt' + window.__webtrailSeq);
    }
    const r = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    const visible = r.width > 0 && r.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
    const attr = (n) => el.getAttribute(n);
    const text = (el.innerText || el.textContent || '').replace(/\s+/g, ' ').trim().slice(0, 200);
    return {
        handle: el.getAttribute('data-webtrail-id'),
        tag: el.tagName.toLowerCase(),
        text,
        attributes: {
            id: el.id || null,
            name: attr('name'),
            placeholder: attr('placeholder'),
            type: attr('type'),
            ariaLabel: attr('aria-label'),
            testId: attr('data-testid'),
            dataId: attr('data-id'),
            role: attr('role'),
            classes: Array.from(el.classList || []),
        },
        rect: { x: r.x, y: r.y, width: r.width, height: r.height },
        visible,
    };
};
"#;

/// Visible elements that carry text or can be interacted with.
const SCAN_BODY: &str = r#"
(() => {
    const interactive = 'a,button,input,select,textarea,label,summary,[role],[onclick],[tabindex],[contenteditable="true"],[data-testid]';
    const out = [];
    for (const el of document.querySelectorAll('body *')) {
        if (out.length >= 3000) break;
        const ownText = Array.from(el.childNodes)
            .some((n) => n.nodeType === 3 && n.textContent.trim().length > 0);
        if (!el.matches(interactive) && !ownText) continue;
        const snap = __wtDescribe(el);
        if (snap.visible) out.push(snap);
    }
    return out;
})()
"#;

/// Returns `ms` since the last DOM mutation, installing the observer on first use.
pub const DOM_QUIET_SCRIPT: &str = r#"(() => {
    if (!window.__webtrailMutations) {
        window.__webtrailLastMutation = Date.now();
        window.__webtrailMutations = new MutationObserver(() => {
            window.__webtrailLastMutation = Date.now();
        });
        window.__webtrailMutations.observe(document.documentElement || document, {
            subtree: true, childList: true, attributes: true, characterData: true,
        });
    }
    return Date.now() - window.__webtrailLastMutation;
})()"#;

/// Serialize `arg` as a JavaScript literal.
fn literal<T: Serialize + ?Sized>(arg: &T) -> String {
    serde_json::to_string(arg).unwrap_or_else(|_| "null".to_string())
}

fn by_handle(handle: &str) -> String {
    format!(
        "document.querySelector('[{}=' + JSON.stringify({}) + ']')",
        HANDLE_ATTR,
        literal(handle)
    )
}

pub fn scan() -> String {
    format!("(() => {{ {} return {}; }})()", DESCRIBE_FN, SCAN_BODY.trim())
}

/// Matches for `selector`, or `{invalidSelector: message}` when it does not parse.
pub fn query_all(selector: &str) -> String {
    format!(
        r#"(() => {{
    {describe}
    try {{
        return Array.from(document.querySelectorAll({sel})).map(__wtDescribe);
    }} catch (e) {{
        return {{ invalidSelector: String(e && e.message || e) }};
    }}
}})()"#,
        describe = DESCRIBE_FN,
        sel = literal(selector)
    )
}

/// Viewport rect of a handle, `null` when detached or without layout.
pub fn rect(handle: &str) -> String {
    format!(
        r#"(() => {{
    const el = {el};
    if (!el || !el.isConnected) return null;
    const r = el.getBoundingClientRect();
    if (r.width <= 0 || r.height <= 0) return null;
    return {{ x: r.x, y: r.y, width: r.width, height: r.height }};
}})()"#,
        el = by_handle(handle)
    )
}

/// Focus a handle and clear its current content. Returns `false` when missing.
pub fn focus_and_clear(handle: &str) -> String {
    format!(
        r#"(() => {{
    const el = {el};
    if (!el) return false;
    el.scrollIntoView({{ block: 'center', inline: 'center' }});
    el.focus();
    if (el.isContentEditable) {{
        document.execCommand('selectAll', false, null);
        document.execCommand('delete', false, null);
        return true;
    }}
    if ('value' in el) {{
        const proto = Object.getPrototypeOf(el);
        const setter = Object.getOwnPropertyDescriptor(proto, 'value');
        if (setter && setter.set) setter.set.call(el, ''); else el.value = '';
        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    }}
    return true;
}})()"#,
        el = by_handle(handle)
    )
}

/// Fire `change` after typing so frameworks commit the value.
pub fn commit_value(handle: &str) -> String {
    format!(
        r#"(() => {{
    const el = {el};
    if (el) el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return !!el;
}})()"#,
        el = by_handle(handle)
    )
}

/// Current value (form controls) or text content of a handle.
pub fn read_value(handle: &str) -> String {
    format!(
        r#"(() => {{
    const el = {el};
    if (!el) return null;
    if ('value' in el && typeof el.value === 'string') return el.value;
    return (el.innerText || el.textContent || '').trim();
}})()"#,
        el = by_handle(handle)
    )
}

/// Expression evaluating to the element itself, for object-id lookups.
pub fn element(handle: &str) -> String {
    by_handle(handle)
}

pub fn scroll_to(x: f64, y: f64) -> String {
    format!("(() => {{ window.scrollTo({}, {}); return true; }})()", x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_all_escapes_selector() {
        let script = query_all(r#"input[name="q"]"#);
        assert!(script.contains(r#"querySelectorAll("input[name=\"q\"]")"#));
        assert!(script.contains("invalidSelector"));
    }

    #[test]
    fn test_handle_lookup_is_quoted() {
        let script = rect("wt'12");
        assert!(script.contains("data-webtrail-id"));
        assert!(script.contains(r#"JSON.stringify("wt'12")"#));
    }

    #[test]
    fn test_scan_includes_describe_helper() {
        let script = scan();
        assert!(script.contains("__wtDescribe"));
        assert!(script.contains("body *"));
    }
}
