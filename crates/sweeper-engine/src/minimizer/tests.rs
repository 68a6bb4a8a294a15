//! Tests for the greedy line minimiser.

use std::cell::RefCell;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use mockall::mock;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{LineDecision, LineMinimizer};
use crate::directive::DirectiveMatcher;
use crate::oracle::{BuildOracle, Verdict, from_fn};

mock! {
    Oracle {}
    impl BuildOracle for Oracle {
        fn verify(&self, project: &Utf8Path, configuration: &str) -> Verdict;
    }
}

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn file(&self, name: &str, content: &[u8]) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, content).expect("write source file");
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    Workspace { _dir: dir, root }
}

fn run<O: BuildOracle>(oracle: &O, path: &Utf8Path) -> super::PassReport {
    let matcher = DirectiveMatcher::default();
    LineMinimizer::new(oracle, Utf8Path::new("app.sweeper-trial.proj"), "Debug", &matcher)
        .minimize(path)
        .expect("pass succeeds")
}

fn read(path: &Utf8Path) -> String {
    fs::read_to_string(path).expect("read source file")
}

const WIDGET: &str = "\
#include <vector>
#include \"needed.h\"
// #include <commented.h>
int widget();
#include <map>
";

#[rstest]
fn always_passing_oracle_removes_every_candidate(workspace: Workspace) {
    let path = workspace.file("widget.cpp", WIDGET.as_bytes());

    let report = run(&from_fn(|_, _| Verdict::Pass), &path);

    assert_eq!(read(&path), "// #include <commented.h>\nint widget();\n");
    assert_eq!(report.removed_count(), 3);
    assert!(
        report
            .candidates()
            .iter()
            .all(|candidate| candidate.decision() == LineDecision::Removed)
    );
}

#[rstest]
fn required_line_survives(workspace: Workspace) {
    let path = workspace.file("widget.cpp", WIDGET.as_bytes());
    let watched = path.clone();
    let oracle =
        from_fn(move |_, _| Verdict::from(read(&watched).contains("#include \"needed.h\"")));

    let report = run(&oracle, &path);

    assert_eq!(
        read(&path),
        "#include \"needed.h\"\n// #include <commented.h>\nint widget();\n"
    );
    let kept: Vec<usize> = report
        .candidates()
        .iter()
        .filter(|candidate| candidate.decision() == LineDecision::Kept)
        .map(|candidate| candidate.line_number())
        .collect();
    assert_eq!(kept, [2]);
}

#[rstest]
#[case::first_wins("#include <a.h>\n#include <b.h>\n", "#include <b.h>\n")]
#[case::reversed_order("#include <b.h>\n#include <a.h>\n", "#include <a.h>\n")]
fn greedy_order_decides_between_alternatives(
    workspace: Workspace,
    #[case] original: &str,
    #[case] expected: &str,
) {
    let path = workspace.file("alt.cpp", original.as_bytes());
    let watched = path.clone();
    let oracle = from_fn(move |_, _| {
        let text = read(&watched);
        Verdict::from(text.contains("<a.h>") || text.contains("<b.h>"))
    });

    run(&oracle, &path);

    assert_eq!(read(&path), expected);
}

#[rstest]
fn each_trial_sees_earlier_decisions_on_disk(workspace: Workspace) {
    let path = workspace.file("seq.cpp", b"#include <a>\n#include <b>\n#include <c>\n");
    let watched = path.clone();
    let seen = RefCell::new(Vec::new());
    let oracle = from_fn(|_, _| {
        let text = read(&watched);
        let verdict = Verdict::from(text.contains("<c>"));
        seen.borrow_mut().push(text);
        verdict
    });

    run(&oracle, &path);

    assert_eq!(
        seen.into_inner(),
        [
            "\n#include <b>\n#include <c>\n",
            "\n\n#include <c>\n",
            "\n\n\n",
        ]
    );
    assert_eq!(read(&path), "#include <c>\n");
}

#[rstest]
fn failing_oracle_leaves_bytes_identical(workspace: Workspace) {
    let original = b"#include <a>\r\n\tint x = 1;\xff\r\n#include <b>";
    let path = workspace.file("legacy.cpp", original);

    let report = run(&from_fn(|_, _| Verdict::Fail), &path);

    assert_eq!(fs::read(&path).expect("read bytes"), original);
    assert_eq!(report.removed_count(), 0);
}

#[rstest]
fn preserves_terminators_and_unterminated_last_line(workspace: Workspace) {
    let path = workspace.file(
        "crlf.cpp",
        b"#include <a>\r\nint x;\r\n#include <b>\r\nint y;",
    );

    run(&from_fn(|_, _| Verdict::Pass), &path);

    assert_eq!(fs::read(&path).expect("read bytes"), b"int x;\r\nint y;");
}

#[rstest]
fn removing_the_final_unterminated_line(workspace: Workspace) {
    let path = workspace.file("tail.h", b"#pragma once\n#include <a>");

    run(&from_fn(|_, _| Verdict::Pass), &path);

    assert_eq!(read(&path), "#pragma once\n");
}

#[rstest]
fn file_without_candidates_is_never_built_or_written(workspace: Workspace) {
    let path = workspace.file("plain.cpp", b"int main() { return 0; }\n");
    let mut oracle = MockOracle::new();
    oracle.expect_verify().never();

    let report = run(&oracle, &path);

    assert!(report.candidates().is_empty());
    assert_eq!(read(&path), "int main() { return 0; }\n");
}

#[rstest]
fn builds_working_project_once_per_candidate(workspace: Workspace) {
    let path = workspace.file("two.cpp", b"#include <a>\n#include <b>\n");
    let mut oracle = MockOracle::new();
    oracle
        .expect_verify()
        .times(2)
        .returning(|project, configuration| {
            assert_eq!(project, Utf8Path::new("app.sweeper-trial.proj"));
            assert_eq!(configuration, "Debug");
            Verdict::Fail
        });

    let report = run(&oracle, &path);

    assert_eq!(report.candidates().len(), 2);
    assert_eq!(report.path(), path.as_path());
}

#[rstest]
fn reports_removed_text_and_line_numbers(workspace: Workspace) {
    let path = workspace.file("log.cpp", b"int a;\n  #include \"x.h\"  \n");
    let mut oracle = MockOracle::new();
    oracle
        .expect_verify()
        .once()
        .return_const(Verdict::Pass);

    let report = run(&oracle, &path);

    let removed: Vec<(usize, &str)> = report
        .removed()
        .map(|candidate| (candidate.line_number(), candidate.text()))
        .collect();
    assert_eq!(removed, [(2, "  #include \"x.h\"")]);
}
