//! End-to-end runs through the subprocess adapter.
//!
//! `sh -c 'cat all.yaml'` stands in for the overlay build so the staging
//! layout is exercised without kustomize. The `real_kustomize_*` tests only
//! run when a `kustomize` binary is on PATH.

use helmkust_core::adapters::KustomizeCommand;
use helmkust_core::{ErrorKind, StagingOptions, run_bytes};
use pretty_assertions::assert_eq;
use serde_yaml::Value;

const MANIFESTS: &str = r#"---
apiVersion: v1
kind: Service
metadata:
  name: test-service
spec:
  ports:
    - port: 80
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: test-deployment
spec:
  replicas: 1
"#;

fn control(files: &str) -> String {
    format!(
        "---\napiVersion: helm.plugin.kustomize/v1\nkind: KustomizePluginData\nfiles:\n{files}"
    )
}

fn documents(bytes: &[u8]) -> Vec<Value> {
    helmkust_stream::decode(bytes)
        .expect("decode output")
        .into_iter()
        .map(|m| Value::Mapping(m.into_body()))
        .collect()
}

fn kustomize_available() -> bool {
    std::process::Command::new("kustomize")
        .arg("version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
#[test]
fn cat_aggregate_returns_input_manifests() {
    let builder = KustomizeCommand::new("sh", vec!["-c".into(), "cat all.yaml".into()]);
    let input = format!(
        "{MANIFESTS}{}",
        control("  kustomization.yaml: |\n    namespace: demo\n")
    );

    let outcome = run_bytes(input.as_bytes(), &StagingOptions::default(), &builder).expect("run");

    assert!(outcome.transformed);
    assert_eq!(documents(&outcome.output), documents(MANIFESTS.as_bytes()));
}

#[cfg(unix)]
#[test]
fn build_sees_patched_entry_file() {
    // Prints the entry file instead of building, so the patched resources list is observable.
    let builder = KustomizeCommand::new("sh", vec!["-c".into(), "cat kustomization.yaml".into()]);
    let input = format!(
        "{MANIFESTS}{}",
        control("  kustomization.yaml: |\n    namespace: demo\n    resources:\n      - extra.yaml\n  extra.yaml: |\n    kind: ConfigMap\n")
    );

    let outcome = run_bytes(input.as_bytes(), &StagingOptions::default(), &builder).expect("run");
    assert_eq!(
        String::from_utf8(outcome.output).expect("utf8"),
        "namespace: demo\nresources:\n- extra.yaml\n- all.yaml\n"
    );
}

#[cfg(unix)]
#[test]
fn failing_build_reports_diagnostics() {
    let builder = KustomizeCommand::new(
        "sh",
        vec!["-c".into(), "echo 'Error: accumulating resources' >&2; exit 1".into()],
    );
    let input = format!("{MANIFESTS}{}", control("  kustomization.yaml: \"{}\"\n"));

    let err = run_bytes(input.as_bytes(), &StagingOptions::default(), &builder).expect_err("fail");
    assert_eq!(err.kind(), ErrorKind::ExternalTool);
    assert!(err.to_string().contains("accumulating resources"), "{err}");
}

#[test]
fn missing_program_is_external_tool_error() {
    let builder = KustomizeCommand::new("helmkust-no-such-program", vec![]);
    let input = format!("{MANIFESTS}{}", control("  kustomization.yaml: \"{}\"\n"));

    let err = run_bytes(input.as_bytes(), &StagingOptions::default(), &builder).expect_err("spawn");
    assert_eq!(err.kind(), ErrorKind::ExternalTool);
}

#[test]
fn real_kustomize_sets_namespace() {
    if !kustomize_available() {
        eprintln!("skipping: kustomize not installed");
        return;
    }
    let input = format!(
        "{MANIFESTS}{}",
        control(
            "  kustomization.yaml: |\n    apiVersion: kustomize.config.k8s.io/v1beta1\n    kind: Kustomization\n    namespace: test-namespace\n"
        )
    );

    let outcome =
        run_bytes(input.as_bytes(), &StagingOptions::default(), &KustomizeCommand::default())
            .expect("run");

    let docs = documents(&outcome.output);
    assert_eq!(docs.len(), 2);
    for doc in &docs {
        assert_eq!(
            doc["metadata"]["namespace"],
            Value::String("test-namespace".into()),
            "{doc:?}"
        );
    }
}

#[test]
fn real_kustomize_applies_patch_file() {
    if !kustomize_available() {
        eprintln!("skipping: kustomize not installed");
        return;
    }
    let input = format!(
        "{MANIFESTS}{}",
        control(concat!(
            "  kustomization.yaml: |\n",
            "    patches:\n",
            "      - path: replicas.yaml\n",
            "  replicas.yaml: |\n",
            "    apiVersion: apps/v1\n",
            "    kind: Deployment\n",
            "    metadata:\n",
            "      name: test-deployment\n",
            "    spec:\n",
            "      replicas: 3\n",
        ))
    );

    let outcome =
        run_bytes(input.as_bytes(), &StagingOptions::default(), &KustomizeCommand::default())
            .expect("run");

    let docs = documents(&outcome.output);
    let deployment = docs
        .iter()
        .find(|d| d["kind"] == Value::String("Deployment".into()))
        .expect("deployment in output");
    assert_eq!(deployment["spec"]["replicas"], Value::Number(3_u64.into()));
}
