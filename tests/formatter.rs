use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use thriftfmt::formatter::{format_source, format_source_range};
use thriftfmt::options::FormatOptions;
use thriftfmt::position::Range;
use walkdir::WalkDir;

fn fmt(src: &str) -> String {
    format_source(src, &FormatOptions::default())
}

/// Find all test cases in the examples directory
fn find_test_cases() -> Vec<TestCase> {
    let examples_dir = Path::new("tests/examples");
    let mut test_cases = Vec::new();

    for entry in WalkDir::new(examples_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        // input files are named <base>_<n>.input
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.ends_with(".input") && file_name.contains('_') {
                if let Some(test_case) = create_test_case(path) {
                    test_cases.push(test_case);
                }
            }
        }
    }

    test_cases
}

#[derive(Debug, Clone)]
struct TestCase {
    name: String,
    input_file: PathBuf,
    expected_file: PathBuf,
}

/// Create a test case from an input file path; the expected output lives
/// next to it as <base>.thrift
fn create_test_case(input_path: &Path) -> Option<TestCase> {
    let file_name = input_path.file_name()?.to_str()?;
    let parent_dir = input_path.parent()?;
    let base_name = &file_name[..file_name.rfind('_')?];
    let expected_file = parent_dir.join(format!("{base_name}.thrift"));

    expected_file.exists().then(|| TestCase {
        name: format!("{}_{}", base_name, input_path.display()),
        input_file: input_path.to_path_buf(),
        expected_file,
    })
}

fn run_test_case(test_case: &TestCase) -> Result<(), String> {
    let input_content = fs::read_to_string(&test_case.input_file).map_err(|e| {
        format!(
            "Failed to read input file {:?}: {}",
            test_case.input_file, e
        )
    })?;
    let expected_content = fs::read_to_string(&test_case.expected_file).map_err(|e| {
        format!(
            "Failed to read expected file {:?}: {}",
            test_case.expected_file, e
        )
    })?;

    let formatted_content = fmt(&input_content);

    if formatted_content.trim() == expected_content.trim() {
        // formatted output must also be a fixed point
        if fmt(&formatted_content) == formatted_content {
            Ok(())
        } else {
            Err(format!(
                "Formatting not idempotent for test case '{}'",
                test_case.name
            ))
        }
    } else {
        Err(format!(
            "Formatting mismatch for test case '{}':\n\
             \n--- Expected ---\n{}\n\
             \n--- Got ---\n{}",
            test_case.name, expected_content, formatted_content,
        ))
    }
}

#[test]
fn example_files_formatting() {
    let test_cases = find_test_cases();
    assert!(
        !test_cases.is_empty(),
        "No test cases found in tests/examples/"
    );

    let mut failures = Vec::new();
    for test_case in &test_cases {
        if let Err(error) = run_test_case(test_case) {
            failures.push(error);
        }
    }
    if !failures.is_empty() {
        panic!("Test failures:\n\n{}", failures.join("\n\n"));
    }
}

#[test]
fn inline_struct_expansion() {
    let input = "struct User{1:i32 id,2:string name,3:list<i32> nums}\n";
    let expected = "struct User {\n    1: i32       id,\n    2: string    name,\n    3: list<i32> nums\n}\n";
    assert_eq!(fmt(input), expected);
}

#[test]
fn idempotence_over_a_document_mixing_every_construct() {
    let src = r#"namespace rs demo.core
include "shared.thrift"

typedef map < string , i32 > Counts

const i32 MAX_RETRIES = 3
const map<string, i32> LIMITS = {"a": 1, "b": 2}

enum Status {
  ACTIVE = 1, // live
  INACTIVE=2,
}

/**
 * A user record.
 */
struct User {
  1: required i64 id
  2: optional string name = "anon" (go.tag="name"),
  3: list< map<string,i32> > stats,
}

struct Empty {}

exception NotFound {
  1: string message
}

service UserService extends shared.BaseService {
  User fetch(1: i64 id) throws (1: NotFound e),
  oneway void ping();
}
"#;
    let once = fmt(src);
    let twice = fmt(&once);
    assert_eq!(once, twice);
    // nothing was dropped: every declaration survives
    for needle in [
        "namespace rs demo.core",
        "include \"shared.thrift\"",
        "typedef map<string,i32> Counts",
        "const i32 MAX_RETRIES = 3",
        "enum Status {",
        "struct User {",
        "struct Empty {}",
        "exception NotFound {",
        "service UserService extends shared.BaseService {",
        "oneway void ping()",
    ] {
        assert!(once.contains(needle), "missing {needle:?} in:\n{once}");
    }
}

#[test]
fn option_variations_stay_idempotent() {
    let src = "struct S {\n  1: i32 a = 5 (x=\"1\"), // c\n  2: string bb,\n}\nenum E { A = 1, BBB = 22 }\n";
    let variations = [
        r#"{"alignTypes": false, "alignFieldNames": false}"#,
        r#"{"alignStructDefaults": true, "alignAnnotations": true, "alignComments": true}"#,
        r#"{"alignEnumNames": false, "alignEnumEquals": false, "alignEnumValues": true}"#,
        r#"{"trailingComma": "add"}"#,
        r#"{"trailingComma": "remove"}"#,
        r#"{"indentSize": 2}"#,
        r#"{"insertSpaces": false, "tabSize": 8}"#,
        r#"{"collectionStyle": "multiline", "maxLineLength": 20}"#,
    ];
    for json in variations {
        let opts = FormatOptions::from_json(json).unwrap();
        let once = format_source(src, &opts);
        let twice = format_source(&once, &opts);
        assert_eq!(once, twice, "not idempotent under {json}");
    }
}

#[test]
fn incremental_equals_full_after_editing_one_construct() {
    let opts = FormatOptions::default();
    let base = fmt(
        "struct A { 1: i32 x }\n\nenum E { ONE = 1, TWO = 2 }\n\nservice S { void ping() }\n",
    );
    // mangle the enum only
    let edited = base.replace("ONE = 1,", "ONE=1,EXTRA = 9,");
    let full = format_source(&edited, &opts);
    let enum_line = edited
        .lines()
        .position(|l| l.contains("ONE"))
        .expect("enum member line");
    let dirty = Range::new(enum_line, 0, enum_line, 3);
    let incremental = format_source_range(&edited, &opts, Some(&dirty));
    assert_eq!(incremental, full);
}

#[test]
fn incremental_dirty_range_between_constructs() {
    let opts = FormatOptions::default();
    let base = fmt("struct A { 1: i32 x }\n\nstruct B { 1: i32 y }\n");
    let blank_line = base.lines().position(|l| l.is_empty()).unwrap();
    let dirty = Range::new(blank_line, 0, blank_line, 0);
    assert_eq!(
        format_source_range(&base, &opts, Some(&dirty)),
        format_source(&base, &opts)
    );
}

#[test]
fn formatter_never_panics_on_garbage() {
    let inputs = [
        "{{{{",
        "}}}}",
        "struct",
        "struct {",
        "struct X { 1: i32",
        "\"unterminated",
        "const = = =",
        "service S { void f( }",
        "enum E { = , }",
        "/* unclosed comment\nstruct X { 1: i32 y }",
    ];
    for src in inputs {
        let out = fmt(src);
        // output keeps ending in a newline and formatting stays stable
        assert_eq!(fmt(&out), out, "unstable for {src:?}");
    }
}

#[test]
fn check_mode_roundtrip_through_files() {
    // formatted content written out and re-read formats to itself
    let dir = std::env::temp_dir().join(format!("thriftfmt-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sample.thrift");
    fs::write(&path, "struct S{1:i32 x}\n").unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let formatted = fmt(&content);
    fs::write(&path, &formatted).unwrap();
    let reread = fs::read_to_string(&path).unwrap();
    assert_eq!(fmt(&reread), reread);
    fs::remove_dir_all(&dir).ok();
}
