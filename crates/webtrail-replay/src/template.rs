//! Template variable checks and substitution for replay.

use webtrail_protocols::action::{MissingVariable, substitute, substitute_json};
use webtrail_protocols::{Action, Variables, Workflow};

/// Variables the workflow references that `vars` does not supply, in first-use order.
pub fn missing_variables(workflow: &Workflow, vars: &Variables) -> Vec<String> {
    workflow
        .required_variables()
        .into_iter()
        .filter(|name| !vars.contains_key(name))
        .collect()
}

/// Copy of `action` with every placeholder in `value` and `params` replaced.
pub fn apply_variables(action: &Action, vars: &Variables) -> Result<Action, MissingVariable> {
    let mut resolved = action.clone();
    if let Some(value) = &action.value {
        resolved.value = Some(substitute(value, vars)?);
    }
    if let Some(params) = &action.params {
        resolved.params = Some(substitute_json(params, vars)?);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn workflow() -> Workflow {
        let mut upload = Action::upload("Upload", None, Some("#file".into()), vec!["{{photo}}".into()]);
        upload.params = Some(json!({"files": ["{{photo}}"], "caption": "{{caption}}"}));
        Workflow::new(
            "post",
            "social",
            vec![
                Action::type_text("User", None, Some("#u".into()), "{{username}}"),
                Action::type_text("Pass", None, Some("#p".into()), "{{password}}"),
                upload,
            ],
        )
    }

    #[test]
    fn test_missing_variables_in_order() {
        let missing = missing_variables(&workflow(), &vars(&[("password", "x")]));
        assert_eq!(missing[0], "username");
        let mut rest = missing[1..].to_vec();
        rest.sort();
        assert_eq!(rest, vec!["caption", "photo"]);
    }

    #[test]
    fn test_nothing_missing() {
        let all = vars(&[("username", "a"), ("password", "b"), ("photo", "c"), ("caption", "d")]);
        assert!(missing_variables(&workflow(), &all).is_empty());
    }

    #[test]
    fn test_apply_substitutes_value_and_params() {
        let all = vars(&[("photo", "/tmp/cat.jpg"), ("caption", "hello")]);
        let action = apply_variables(&workflow().actions[2], &all).unwrap();
        assert_eq!(action.files(), vec!["/tmp/cat.jpg".to_string()]);
        assert_eq!(action.params.unwrap()["caption"], "hello");
    }

    #[test]
    fn test_apply_reports_missing() {
        let err = apply_variables(&workflow().actions[0], &Variables::new()).unwrap_err();
        assert_eq!(err, MissingVariable("username".into()));
    }

    #[test]
    fn test_original_action_is_untouched() {
        let wf = workflow();
        let _ = apply_variables(&wf.actions[1], &vars(&[("password", "s3cret")])).unwrap();
        assert_eq!(wf.actions[1].value.as_deref(), Some("{{password}}"));
    }
}
