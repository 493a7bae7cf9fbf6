use super::*;
use crate::block::{extract_block, HeaderMarker};
use crate::diff::compute_changes;
use crate::version::TagScheme;
use pretty_assertions::assert_eq;

const STATE_JAVA: &str = include_str!(
    "../tests/data/project/src/main/java/org/purpleBean/kmip/common/enumeration/State.java"
);

fn target() -> SyncTarget {
    SyncTarget {
        target: VersionTag::Release { major: 2, minor: 1 },
        scheme: TagScheme::new("KmipSpec", "UnknownVersion"),
    }
}

fn slice(entries: &[(u32, &str)]) -> BTreeMap<u32, String> {
    entries
        .iter()
        .map(|(value, name)| (*value, name.to_string()))
        .collect()
}

fn wrap(records: &str) -> String {
    format!(
        "class X {{\n    enum Standard implements Value {{\n{records}\n        private final int value;\n    }}\n}}\n"
    )
}

fn run(text: &str, spec: &BTreeMap<u32, String>) -> (ChangeSet, Regenerated, ExtractedBlock) {
    let block = extract_block(text, &HeaderMarker::new("Standard", "Value")).unwrap();
    let changes = compute_changes(&block.constants, spec, &target());
    let regenerated = regenerate(&block, spec, &changes, &target(), 8);
    (changes, regenerated, block)
}

#[test]
fn adds_missing_constant_and_target_tag_in_value_order() {
    let text = wrap(r#"        ACTIVE(0x00000001, "Active", KmipSpec.UnknownVersion);"#);
    let spec = slice(&[(1, "Active"), (2, "Compromised")]);
    let (changes, regenerated, _) = run(&text, &spec);

    assert_eq!(changes.missing, vec![2]);
    assert_eq!(
        regenerated.region,
        concat!(
            "        ACTIVE(0x00000001, \"Active\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
            "        COMPROMISED(0x00000002, \"Compromised\", KmipSpec.UnknownVersion, KmipSpec.V2_1);\n",
        )
    );
}

#[test]
fn reserved_constant_passes_through_untouched() {
    let text = wrap(concat!(
        "        RESERVED_1(0x00000005, \"Reserved1\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
        "        ACTIVE(0x00000001, \"Active\", KmipSpec.UnknownVersion, KmipSpec.V2_1);",
    ));
    let spec = slice(&[(1, "Active")]);
    let (changes, regenerated, block) = run(&text, &spec);

    assert_eq!(changes.extra, vec![5]);
    assert!(changes.edits.is_empty());
    let reserved = regenerated
        .constants
        .iter()
        .find(|constant| constant.value == 5)
        .unwrap();
    assert_eq!(reserved, &block.constants[0]);
    assert_eq!(regenerated.constants[0].name, "ACTIVE");
}

#[test]
fn placeholder_takes_spec_identity() {
    let text = wrap(r#"        PLACEHOLDER_A(0x00000007, "PlaceholderA", KmipSpec.UnknownVersion);"#);
    let spec = slice(&[(7, "KeyWrapType")]);
    let (changes, regenerated, _) = run(&text, &spec);

    assert_eq!(
        changes.edits.get(&7),
        Some(&EditDecision::ReplaceIdentity)
    );
    assert_eq!(
        regenerated.constants,
        vec![Constant {
            name: "KEY_WRAP_TYPE".to_string(),
            value: 7,
            label: "KeyWrapType".to_string(),
            versions: "KmipSpec.UnknownVersion, KmipSpec.V2_1".to_string(),
        }]
    );
}

#[test]
fn replacement_keeps_other_tags_and_avoids_name_collisions() {
    let text = wrap(concat!(
        "        KEY_WRAP_TYPE(0x00000001, \"KeyWrapType\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
        "        RESERVE_2(0x00000002, \"Reserve2\", KmipSpec.V1_2, KmipSpec.V3_0);",
    ));
    let spec = slice(&[(1, "KeyWrapType"), (2, "Key Wrap Type"), (3, "KeyWrapType")]);
    let (_, regenerated, _) = run(&text, &spec);

    let rendered: Vec<(&str, &str)> = regenerated
        .constants
        .iter()
        .map(|constant| (constant.name.as_str(), constant.versions.as_str()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("KEY_WRAP_TYPE", "KmipSpec.UnknownVersion, KmipSpec.V2_1"),
            (
                "KEY_WRAP_TYPE_2",
                "KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1, KmipSpec.V3_0"
            ),
            ("KEY_WRAP_TYPE_3", "KmipSpec.UnknownVersion, KmipSpec.V2_1"),
        ]
    );
    let names: BTreeSet<&str> = rendered.iter().map(|(name, _)| *name).collect();
    assert_eq!(names.len(), rendered.len());
}

#[test]
fn duplicate_values_collapse_to_first_occurrence() {
    let text = wrap(concat!(
        "        FIRST(0x00000001, \"First\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
        "        SECOND(0x00000001, \"Second\", KmipSpec.UnknownVersion, KmipSpec.V2_1);",
    ));
    let (changes, regenerated, _) = run(&text, &slice(&[(1, "First")]));
    assert_eq!(changes.duplicates, vec!["SECOND".to_string()]);
    assert_eq!(regenerated.constants.len(), 1);
    assert_eq!(regenerated.constants[0].name, "FIRST");
}

#[test]
fn repeated_name_is_renamed_and_keeps_its_own_tags() {
    let text = wrap(concat!(
        "        FOO(0x00000001, \"Foo\", KmipSpec.UnknownVersion),\n",
        "        FOO(0x00000009, \"Foo\", KmipSpec.UnknownVersion, KmipSpec.V1_2);",
    ));
    let spec = slice(&[(1, "Foo")]);
    let (changes, regenerated, _) = run(&text, &spec);

    assert_eq!(changes.name_clashes, vec![9]);
    assert_eq!(
        regenerated.region,
        concat!(
            "        FOO(0x00000001, \"Foo\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
            "        FOO_2(0x00000009, \"Foo\", KmipSpec.UnknownVersion, KmipSpec.V1_2);\n",
        )
    );

    let (rerun, second, _) = run(&regenerated.text, &spec);
    assert!(rerun.name_clashes.is_empty());
    assert!(rerun.edits.is_empty());
    assert_eq!(second.text, regenerated.text);
}

#[test]
fn state_fixture_regenerates_and_preserves_boilerplate() {
    let spec = slice(&[
        (1, "Pre-Active"),
        (2, "Active"),
        (4, "Compromised"),
        (7, "Key Wrap Type"),
        (8, "Reserved"),
    ]);
    let (changes, regenerated, block) = run(STATE_JAVA, &spec);

    assert_eq!(changes.missing, vec![4]);
    assert_eq!(changes.extra, vec![5, 9]);
    assert_eq!(changes.edits.len(), 3);
    assert_eq!(
        regenerated.region,
        concat!(
            "        PRE_ACTIVE(0x00000001, \"PreActive\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
            "        ACTIVE(0x00000002, \"Active\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
            "        COMPROMISED(0x00000004, \"Compromised\", KmipSpec.UnknownVersion, KmipSpec.V2_1),\n",
            "        RESERVED_1(0x00000005, \"Reserved1\", KmipSpec.UnknownVersion),\n",
            "        KEY_WRAP_TYPE(0x00000007, \"KeyWrapType\", KmipSpec.UnknownVersion, KmipSpec.V1_2, KmipSpec.V2_1),\n",
            "        LEGACY(0x00000009, \"Legacy\", KmipSpec.UnknownVersion, KmipSpec.V1_2);\n",
        )
    );
    assert!(regenerated.text.starts_with(&block.prefix));
    assert!(regenerated.text.ends_with(&block.suffix));

    let values: Vec<u32> = regenerated.constants.iter().map(|c| c.value).collect();
    assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn second_pass_is_a_fixed_point() {
    let spec = slice(&[(1, "Pre-Active"), (2, "Active"), (4, "Compromised"), (7, "Key Wrap Type")]);
    let (_, first, _) = run(STATE_JAVA, &spec);
    let (changes, second, _) = run(&first.text, &spec);

    assert!(changes.missing.is_empty());
    assert!(changes.edits.is_empty());
    assert!(changes.duplicates.is_empty());
    assert_eq!(second.text, first.text);
}

#[test]
fn formats_hex_with_category_width() {
    let constant = Constant {
        name: "ACTIVATION_DATE".to_string(),
        value: 0x420001,
        label: "ActivationDate".to_string(),
        versions: "KmipSpec.UnknownVersion".to_string(),
    };
    assert_eq!(
        format_constant(&constant, 6, "    ", false),
        "    ACTIVATION_DATE(0x420001, \"ActivationDate\", KmipSpec.UnknownVersion),"
    );
    assert_eq!(
        format_constant(&constant, 8, "", true),
        "ACTIVATION_DATE(0x00420001, \"ActivationDate\", KmipSpec.UnknownVersion);"
    );
}
