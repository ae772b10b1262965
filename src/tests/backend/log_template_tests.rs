use super::*;

fn record(fields: &[&str]) -> String {
    let mut s = fields.join(&FIELD.to_string());
    s.push(RECORD);
    s
}

fn commit(change: &str, commit: &str, parents: &str, description: &str) -> String {
    record(&[
        change,
        commit,
        parents,
        "",
        "0",
        "0",
        "0",
        "0",
        "dev@example.com",
        "2024-05-01T12:00:00Z",
        description,
    ])
}

#[test]
fn parses_flags_bookmarks_and_multiline_descriptions() {
    let out = record(&[
        "kkk",
        "c2",
        "zzz:c1",
        "main,feat",
        "1",
        "0",
        "1",
        "1",
        "dev@example.com",
        "2024-05-01T12:00:00Z",
        "fix things\n\nlonger body\n",
    ]) + &commit("zzz", "c1", "", "root-ish");

    let nodes = parse_log(&out).unwrap();
    assert_eq!(nodes.len(), 2);

    let k = &nodes[0];
    assert_eq!(k.change_id.as_str(), "kkk");
    assert_eq!(k.parents, vec![ParentRef::Visible(ChangeId::new("zzz"))]);
    assert!(k.bookmarks.contains("main") && k.bookmarks.contains("feat"));
    assert!(k.is_working_copy && k.is_conflicted && k.is_empty);
    assert!(!k.is_immutable);
    assert_eq!(k.description, "fix things\n\nlonger body");
    assert_eq!(k.summary(), "fix things");
    assert_eq!(k.timestamp, 1_714_564_800);
}

#[test]
fn parents_outside_the_revset_are_elided() {
    let out = commit("kkk", "c2", "hidden:c0", "");
    let nodes = parse_log(&out).unwrap();
    assert_eq!(
        nodes[0].parents,
        vec![ParentRef::Elided(ChangeId::new("hidden"))]
    );
}

#[test]
fn divergent_copies_get_distinct_ids() {
    let out = commit("dup", "aaaaaaaaaa11", "base:b0", "one")
        + &commit("dup", "bbbbbbbbbb22", "base:b0", "two")
        + &commit("top", "t0", "dup:bbbbbbbbbb22", "child")
        + &commit("base", "b0", "", "base");

    let nodes = parse_log(&out).unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n.change_id.as_str()).collect();
    assert_eq!(ids, vec!["dup/aaaaaaaa", "dup/bbbbbbbb", "top", "base"]);
    assert!(nodes[0].is_divergent);
    assert_eq!(nodes[0].revision(), "aaaaaaaaaa11");
    assert_eq!(
        nodes[2].parents,
        vec![ParentRef::Visible(ChangeId::new("dup/bbbbbbbb"))]
    );
}

#[test]
fn short_records_are_rejected() {
    let out = record(&["kkk", "c2", ""]);
    assert!(matches!(parse_log(&out), Err(BackendError::Parse(_))));
}

#[test]
fn bad_timestamp_is_rejected() {
    let out = record(&[
        "kkk", "c2", "", "", "0", "0", "0", "0", "a", "yesterday", "",
    ]);
    assert!(matches!(parse_log(&out), Err(BackendError::Parse(_))));
}

#[test]
fn parses_operation_log() {
    let out = record(&["abcdef0123456789", "snapshot working copy", "2024-05-01T12:00:00Z"])
        + "\n"
        + &record(&["0000000000000000", "", ""]);
    let ops = parse_op_log(&out).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].id.as_str(), "abcdef0123456789");
    assert!(!ops[0].id.is_root());
    assert!(ops[1].id.is_root());
}

#[test]
fn empty_output_is_an_empty_graph() {
    assert!(parse_log("").unwrap().is_empty());
    assert!(parse_log("\n").unwrap().is_empty());
}

#[test]
fn templates_use_the_separators() {
    let t = log_template();
    assert!(t.contains(FIELD));
    assert!(t.ends_with(&format!("\"{RECORD}\"")));
    assert_eq!(t.matches(FIELD).count(), LOG_FIELDS - 1);
    assert_eq!(op_log_template().matches(FIELD).count(), OP_FIELDS - 1);
}
