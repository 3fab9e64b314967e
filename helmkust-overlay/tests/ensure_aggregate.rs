//! Behaviour of the aggregate-inclusion patch applied to chart overlays.

use helmkust_overlay::{Kustomization, OverlayError, ensure_aggregate_included};
use pretty_assertions::assert_eq;

#[test]
fn adds_aggregate_when_missing() {
    let (out, changed) = ensure_aggregate_included(b"resources:\n- base.yaml\n").expect("ensure");
    assert!(changed);
    let k = Kustomization::parse(&out).expect("reparse");
    assert_eq!(k.resources(), vec!["base.yaml", "all.yaml"]);
}

#[test]
fn already_present_is_unchanged() {
    let input = b"resources:\n- all.yaml\n- base.yaml\n";
    let (out, changed) = ensure_aggregate_included(input).expect("ensure");
    assert!(!changed);
    let k = Kustomization::parse(&out).expect("reparse");
    assert_eq!(k.resources(), vec!["all.yaml", "base.yaml"]);
}

#[test]
fn creates_resources_field() {
    for input in [&b"patches:\n- path: patch.yaml\n"[..], b"{}", b""] {
        let (out, changed) = ensure_aggregate_included(input).expect("ensure");
        assert!(changed);
        let k = Kustomization::parse(&out).expect("reparse");
        assert_eq!(k.resources(), vec!["all.yaml"]);
    }
}

#[test]
fn preserves_other_fields_exactly() {
    let input = br#"apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
resources:
- base.yaml
labels:
- includeSelectors: true
  pairs:
    app: myapp
    version: v1
patches:
- path: patch.yaml
"#;

    let (out, changed) = ensure_aggregate_included(input).expect("ensure");
    assert!(changed);

    let expected = r#"apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
labels:
- includeSelectors: true
  pairs:
    app: myapp
    version: v1
patches:
- path: patch.yaml
resources:
- base.yaml
- all.yaml
"#;
    assert_eq!(String::from_utf8(out).expect("utf8"), expected);
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let err = ensure_aggregate_included(b"this is not: valid: yaml: structure\n  bad indentation\n")
        .expect_err("invalid yaml");
    assert!(matches!(err, OverlayError::Parse(_)));
    assert!(err.is_parse());
}
