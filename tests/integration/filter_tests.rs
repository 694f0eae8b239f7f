//! Library-level tests for loading a Bullseye report and filtering it
//!
//! These run the filter against the fixture report with various exclusion sets.

use std::path::PathBuf;
use zerocov::{
    find_zero_coverage, try_find_zero_coverage, BullseyeParser, CoverageDocument, CoverageError,
    CoverageParser, ExclusionSet, ZeroCoverageFilter,
};

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample_report() -> PathBuf {
    fixtures_path().join("sample.xml")
}

// ============================================================================
// Fixture report
// ============================================================================

#[test]
fn test_sample_with_fixture_exclusions() {
    let exclusions = ExclusionSet::load(&fixtures_path().join("exclude.txt")).unwrap();
    assert_eq!(exclusions.len(), 2);

    let outcome = find_zero_coverage(&sample_report(), &exclusions);

    assert_eq!(
        outcome.paths,
        vec![
            "src/main.c/usage",
            "src/net/socket.c/close_socket",
            "src/日志.c/写日志",
        ]
    );
    assert_eq!(outcome.stats.pruned_subtrees, 2);
    assert_eq!(outcome.stats.functions_seen, 5);
}

#[test]
fn test_sample_without_exclusions() {
    let outcome = find_zero_coverage(&sample_report(), &ExclusionSet::default());

    assert_eq!(
        outcome.paths,
        vec![
            "gen/parser.tab.c/yyparse",
            "src/main.c/usage",
            "src/net/socket.c/close_socket",
            "src/net/test/socket_test.c/test_open",
            "src/日志.c/写日志",
        ]
    );
    assert_eq!(outcome.stats.pruned_subtrees, 0);
}

#[test]
fn test_excluding_top_folder_empties_result() {
    let exclusions = ExclusionSet::from_lines("gen\nsrc\n");
    let outcome = find_zero_coverage(&sample_report(), &exclusions);

    assert!(outcome.paths.is_empty());
    assert_eq!(outcome.stats.functions_seen, 0);
}

#[test]
fn test_results_are_reproducible() {
    let exclusions = ExclusionSet::from_lines("test");
    let first = find_zero_coverage(&sample_report(), &exclusions);
    let second = find_zero_coverage(&sample_report(), &exclusions);

    assert_eq!(first, second);
}

#[test]
fn test_no_result_passes_through_excluded_name() {
    let exclusions = ExclusionSet::from_lines("net\ngen");
    let outcome = find_zero_coverage(&sample_report(), &exclusions);

    for path in &outcome.paths {
        assert!(
            path.split('/').all(|segment| !exclusions.contains(segment)),
            "{path} passes through an excluded folder"
        );
    }
    assert_eq!(outcome.paths, vec!["src/main.c/usage", "src/日志.c/写日志"]);
}

// ============================================================================
// Inline documents
// ============================================================================

#[test]
fn test_generated_folder_scenario() {
    let xml = r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml">
        <folder name="gen"><fn fn_cov="0" cd_cov="0" name="x"/></folder>
        <folder name="src">
            <fn fn_cov="0" cd_cov="0" name="y"/>
            <fn fn_cov="1" cd_cov="0" name="z"/>
        </folder>
    </BullseyeCoverage>"#;

    let document = CoverageDocument::parse_str(xml).unwrap();
    let exclusions = ExclusionSet::from_lines("gen");
    let outcome = ZeroCoverageFilter::new(&exclusions).apply(&document).unwrap();

    assert_eq!(outcome.paths, vec!["src/y"]);
}

#[test]
fn test_folder_file_function_path() {
    let xml = r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml">
        <folder name="a"><src name="b.c"><fn name="f" fn_cov="0" cd_cov="0"/></src></folder>
    </BullseyeCoverage>"#;

    let document = CoverageDocument::parse_str(xml).unwrap();
    let exclusions = ExclusionSet::default();
    let outcome = ZeroCoverageFilter::new(&exclusions).apply(&document).unwrap();

    assert_eq!(outcome.paths, vec!["a/b.c/f"]);
}

#[test]
fn test_wrong_root_yields_empty_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("jacoco.xml");
    std::fs::write(
        &report,
        r#"<report name="app"><package name="com/example"/></report>"#,
    )
    .unwrap();

    let exclusions = ExclusionSet::default();
    assert!(find_zero_coverage(&report, &exclusions).paths.is_empty());
    assert!(matches!(
        try_find_zero_coverage(&report, &exclusions),
        Err(CoverageError::UnexpectedRoot { .. })
    ));
}

#[test]
fn test_malformed_report_yields_empty_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("broken.xml");
    std::fs::write(
        &report,
        r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml">
            <folder name="src"><fn name="f" fn_cov="0" cd_cov="0"/></src>
        </BullseyeCoverage>"#,
    )
    .unwrap();

    let outcome = find_zero_coverage(&report, &ExclusionSet::default());
    assert!(outcome.paths.is_empty());
}

fn write_nested_report(path: &std::path::Path, levels: usize) {
    let mut xml = String::from(r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml">"#);
    xml.push_str(&r#"<folder name="d">"#.repeat(levels));
    xml.push_str(r#"<fn name="deep" fn_cov="0" cd_cov="0"/>"#);
    xml.push_str(&"</folder>".repeat(levels));
    xml.push_str("</BullseyeCoverage>");
    std::fs::write(path, xml).unwrap();
}

#[test]
fn test_deeply_nested_report_yields_empty_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("deep.xml");
    write_nested_report(&report, 200_000);

    let exclusions = ExclusionSet::default();
    assert!(find_zero_coverage(&report, &exclusions).paths.is_empty());
    assert!(matches!(
        try_find_zero_coverage(&report, &exclusions),
        Err(CoverageError::Traversal { .. })
    ));
}

#[test]
fn test_nesting_at_limit_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("deep.xml");
    write_nested_report(&report, zerocov::coverage::MAX_DEPTH);

    let outcome = find_zero_coverage(&report, &ExclusionSet::default());
    assert_eq!(outcome.paths.len(), 1);
    assert!(outcome.paths[0].ends_with("d/d/deep"));
}

#[test]
fn test_text_after_root_yields_empty_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("trailing.xml");
    std::fs::write(
        &report,
        r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml"><fn name="f"/></BullseyeCoverage>junk"#,
    )
    .unwrap();

    assert!(find_zero_coverage(&report, &ExclusionSet::default())
        .paths
        .is_empty());
}

#[test]
fn test_undeclared_prefix_yields_empty_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = dir.path().join("prefix.xml");
    std::fs::write(
        &report,
        r#"<BullseyeCoverage xmlns="http://www.bullseye.com/covxml"><fn name="f"/><q:x/></BullseyeCoverage>"#,
    )
    .unwrap();

    assert!(find_zero_coverage(&report, &ExclusionSet::default())
        .paths
        .is_empty());
}

#[test]
fn test_parser_reads_fixture() {
    let parser = BullseyeParser::new();
    assert!(parser.can_parse(&sample_report()));

    let document = parser.parse(&sample_report()).unwrap();
    assert_eq!(document.children.len(), 2);
}
