//! End-to-end runs of `enumsync` against a scratch copy of the fixture project.

mod common;

use common::{Project, KEY_WRAP_REL, SPEC_NAME, STATE_REL, TAG_REL};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

#[test]
fn dry_run_reports_pending_changes_and_leaves_files_alone() {
    let project = Project::new().expect("fixture project");
    let before = project.read(STATE_REL);

    let summary = project.sync(&[]);

    assert_eq!(summary["mode"], "dry_run");
    assert_eq!(summary["target_version"], "KmipSpec.V2_1");
    let state = &summary["categories"]["State"];
    assert_eq!(state["status"], "pending");
    assert_eq!(state["missing_values"], json!(["0x00000004"]));
    assert_eq!(state["extra_values"], json!(["0x00000005", "0x00000009"]));
    assert_eq!(state["needs_version_fixes"], 2);
    assert_eq!(state["identity_replacements"], 1);
    assert_eq!(summary["categories"]["KeyWrapType"]["status"], "no_changes");
    assert_eq!(
        summary["categories"]["CertificateType"]["error_kind"],
        "file_not_found"
    );
    assert!(summary["categories"].get("OpaqueDataType").is_none());

    let issues = summary["row_issues"].as_array().expect("row issues");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["kind"], "invalid_hex");

    assert_eq!(project.read(STATE_REL), before);
}

#[test]
fn write_rewrites_blocks_and_second_run_is_a_fixed_point() {
    let project = Project::new().expect("fixture project");
    let key_wrap_before = project.read(KEY_WRAP_REL);

    let summary = project.sync(&["--write"]);
    assert_eq!(summary["categories"]["State"]["status"], "updated");
    assert_eq!(summary["categories"]["KmipTag"]["status"], "updated");
    assert_eq!(summary["categories"]["KeyWrapType"]["status"], "no_changes");
    assert_eq!(project.read(KEY_WRAP_REL), key_wrap_before);

    let state = project.read(STATE_REL);
    let expected_region = concat!(
        "    public enum Standard implements Value {\n",
        "        // Values from the specification\n",
        "        PRE_ACTIVE(0x00000001, \"PreActive\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
        "        ACTIVE(0x00000002, \"Active\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
        "        COMPROMISED(0x00000004, \"Compromised\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
        "        RESERVED_1(0x00000005, \"Reserved1\", KmipSpec.UnknownVersion),\n",
        "        KEY_WRAP_TYPE(0x00000007, \"KeyWrapType\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
        "        LEGACY(0x00000009, \"Legacy\", KmipSpec.UnknownVersion, KmipSpec.V1_2);\n",
        "\n",
        "        private final int value;\n",
    );
    assert!(state.contains(expected_region), "unexpected block:\n{state}");
    assert!(state.contains("return \"{\" + description + \"}\";"));

    let tag = project.read(TAG_REL);
    assert!(tag.contains(concat!(
        "        ACTIVATION_DATE(0x420001, \"ActivationDate\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
        "        APPLICATION_DATA(0x420002, \"ApplicationData\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
        "        APPLICATION_NAMESPACE(0x420003, \"ApplicationNamespace\", KmipSpec.UnknownVersion, KmipSpec.V2_1);\n",
    )));

    // Extras are report-only, so State keeps reporting them without rewriting.
    let rerun = project.sync(&["--write"]);
    let statuses: Vec<_> = ["KeyWrapType", "KmipTag", "State"]
        .iter()
        .map(|stem| rerun["categories"][stem]["status"].clone())
        .collect();
    assert_eq!(
        statuses,
        vec![json!("no_changes"), json!("no_changes"), json!("unmodified")]
    );
    assert_eq!(
        rerun["categories"]["State"]["extra_values"],
        json!(["0x00000005", "0x00000009"])
    );
    assert_eq!(project.read(STATE_REL), state);
    assert_eq!(project.read(TAG_REL), tag);
}

#[test]
fn single_category_accepts_spec_category_names() {
    let project = Project::new().expect("fixture project");
    let summary = project.sync(&["--category", "Tag", "--write"]);

    let categories = summary["categories"].as_object().expect("categories");
    assert_eq!(categories.keys().collect::<Vec<_>>(), vec!["KmipTag"]);
    assert_eq!(categories["KmipTag"]["missing_values"], json!(["0x420003"]));
    assert!(!project.read(STATE_REL).contains("COMPROMISED"));
}

#[test]
fn resolve_lists_category_files() {
    let project = Project::new().expect("fixture project");
    let output = project.run(&["resolve", "--spec", SPEC_NAME]);
    assert!(output.status.success());

    let resolved: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(resolved["State"]["file"]
        .as_str()
        .unwrap()
        .ends_with("State.java"));
    assert_eq!(resolved["State"]["values"], 5);
    assert_eq!(resolved["KmipTag"]["categories"], json!(["Tag"]));
    assert!(resolved["CertificateType"]["file"].is_null());
}

#[test]
fn configuration_errors_exit_non_zero() {
    let project = Project::new().expect("fixture project");

    let missing_spec = project.run(&["sync", "--spec", "nope-v2.1.csv"]);
    assert!(!missing_spec.status.success());
    assert!(String::from_utf8_lossy(&missing_spec.stderr).contains("not found"));

    let unversioned = project.root().join("enumerations.csv");
    fs::copy(project.root().join(SPEC_NAME), &unversioned).unwrap();
    let no_version = project.run(&["sync", "--spec", "enumerations.csv"]);
    assert!(!no_version.status.success());

    let no_enum_dir = project.run(&["sync", "--spec", SPEC_NAME, "--enum-dir", "missing"]);
    assert!(!no_enum_dir.status.success());

    let unknown = project.run(&["sync", "--spec", SPEC_NAME, "--category", "Nope"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("no specification data"));

    let no_file = project.run(&["sync", "--spec", SPEC_NAME, "--category", "CertificateType"]);
    assert!(!no_file.status.success());
    assert_eq!(project.read(STATE_REL), Project::new().unwrap().read(STATE_REL));
}
