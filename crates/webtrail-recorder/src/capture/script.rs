//! The capture script injected into every recorded page.
//!
//! The script never buffers: each interaction is serialized and pushed to the
//! controller through the `__webtrailEmit` binding, so nothing lives in page
//! globals that a navigation could wipe.

/// Name of the page binding the capture script reports through.
pub const BINDING_NAME: &str = "__webtrailEmit";

/// Capture script. Re-evaluating it on an armed document is a no-op.
pub const CAPTURE_SCRIPT: &str = r#"(() => {
  if (window.__webtrailArmed) return true;
  if (typeof window.__webtrailEmit !== 'function') return false;
  window.__webtrailArmed = true;

  const clean = (s, n) => (s || '').replace(/\s+/g, ' ').trim().slice(0, n);
  const siblingText = (el, dir) => {
    let s = el[dir];
    while (s) {
      const t = clean(s.innerText || s.textContent, 100);
      if (t) return t;
      s = s[dir];
    }
    return '';
  };
  const pathOf = (el) => {
    const steps = [];
    let node = el;
    while (node && node.nodeType === 1) {
      const parent = node.parentElement;
      const nth = parent ? Array.prototype.indexOf.call(parent.children, node) + 1 : 1;
      steps.push({ tag: node.tagName.toLowerCase(), id: node.id || null, nth });
      if (node !== el && node.id) break;
      node = parent;
    }
    return steps;
  };
  const isButtonInput = (el) =>
    el.tagName === 'INPUT' && /^(submit|button|reset)$/i.test(el.type || '');
  const describe = (el) => {
    const r = el.getBoundingClientRect();
    const parentText = el.parentElement ? clean(el.parentElement.innerText, 100) : '';
    return {
      tag: el.tagName.toLowerCase(),
      text: clean(isButtonInput(el) ? el.value : el.innerText, 200),
      id: el.id || null,
      name: el.getAttribute('name'),
      placeholder: el.getAttribute('placeholder'),
      type: el.getAttribute('type'),
      ariaLabel: el.getAttribute('aria-label'),
      testId: el.getAttribute('data-testid'),
      dataId: el.getAttribute('data-id'),
      autocomplete: el.getAttribute('autocomplete'),
      classes: Array.from(el.classList || []),
      rect: { x: r.x, y: r.y, width: r.width, height: r.height },
      parentText,
      prevText: siblingText(el, 'previousElementSibling'),
      nextText: siblingText(el, 'nextElementSibling'),
      path: pathOf(el),
    };
  };
  const viewport = () => ({
    width: window.innerWidth,
    height: window.innerHeight,
    scrollX: window.scrollX,
    scrollY: window.scrollY,
  });
  const emit = (payload) => {
    try {
      payload.ts = Date.now();
      payload.viewport = viewport();
      window.__webtrailEmit(JSON.stringify(payload));
    } catch (e) {}
  };
  const target = (e) => {
    const el = e.composedPath ? e.composedPath()[0] : e.target;
    return el && el.nodeType === 1 ? el : null;
  };

  document.addEventListener('click', (e) => {
    const el = target(e);
    if (!el) return;
    emit({ kind: 'click', x: e.clientX, y: e.clientY, element: describe(el) });
  }, true);

  document.addEventListener('input', (e) => {
    const el = target(e);
    if (!el || el.type === 'file') return;
    const value = el.isContentEditable ? el.innerText : el.value;
    emit({ kind: 'input', value: value == null ? '' : String(value), element: describe(el) });
  }, true);

  document.addEventListener('change', (e) => {
    const el = target(e);
    if (!el || el.type !== 'file') return;
    const files = Array.from(el.files || []).map((f) => f.name);
    emit({ kind: 'upload', files, element: describe(el) });
  }, true);

  window.addEventListener('scroll', () => {
    emit({ kind: 'scroll', x: window.scrollX, y: window.scrollY });
  }, { passive: true, capture: true });

  return true;
})()"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_reports_through_binding() {
        assert!(CAPTURE_SCRIPT.contains(BINDING_NAME));
        assert!(CAPTURE_SCRIPT.contains("__webtrailArmed"));
    }

    #[test]
    fn test_script_listens_for_every_kind() {
        for kind in ["'click'", "'input'", "'upload'", "'scroll'"] {
            assert!(CAPTURE_SCRIPT.contains(kind), "missing {}", kind);
        }
    }
}
