// End-to-end tests for `zmatch run`, `validate` and `columns`.
// Run with: cargo test -p zmatcher-cli --test run_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn zmatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zmatch"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    zmatch().args(args).output().expect("spawn zmatch")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// One CSV line of a standard daily row: id, 40 filler cells, then the 22
/// coded columns (41..=62) with `values` set by column offset (AP = 1).
fn daily_line(id: &str, values: &[(usize, &str)]) -> String {
    let mut cells: Vec<String> = (0..63).map(|i| format!("f{i}")).collect();
    cells[0] = id.to_string();
    for cell in &mut cells[41..=62] {
        cell.clear();
    }
    for (offset, value) in values {
        cells[40 + offset] = value.to_string();
    }
    cells.join(",")
}

/// `<dir>/daily.csv` plus `<dir>/hist/` with the given historical files.
fn fixture(dir: &Path, daily: &[String], historical: &[(&str, &str)]) -> (PathBuf, PathBuf) {
    let daily_path = dir.join("daily.csv");
    fs::write(&daily_path, daily.join("\n") + "\n").unwrap();

    let hist_dir = dir.join("hist");
    fs::create_dir(&hist_dir).unwrap();
    for (name, content) in historical {
        fs::write(hist_dir.join(name), content).unwrap();
    }
    (daily_path, hist_dir)
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ===========================================================================
// zmatch run
// ===========================================================================

#[test]
fn run_writes_matches_next_to_daily() {
    let dir = tempfile::tempdir().unwrap();
    // AQ is offset 2 -> raw column 42
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "7")])],
        &[("h1.csv", "P1,AQ,5-10,9,100\n")],
    );

    let output = run(&["run", s(&daily), s(&hist)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out_path = dir.path().join("daily_Matches.csv");
    let content = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    // 63 daily cells + 5 historical cells, each quoted
    let cells: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(cells.len(), 68);
    assert!(cells.iter().all(|c| c.starts_with('"') && c.ends_with('"')));
    assert_eq!(cells[0], "\"P1\"");
    assert_eq!(cells[42], "\"7\"");
    assert_eq!(&cells[63..], &["\"P1\"", "\"AQ\"", "\"5-10\"", "\"9\"", "\"100\""]);

    assert!(stderr(&output).contains("1 match(es)"), "stderr: {}", stderr(&output));
}

#[test]
fn run_with_no_matches_exits_3_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "7")])],
        &[("h1.csv", "P2,AQ,5-10,9,100\n")],
    );

    let output = run(&["run", s(&daily), s(&hist)]);
    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("no matches"));
    assert!(!dir.path().join("daily_Matches.csv").exists());
}

#[test]
fn run_results_follow_file_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "7")])],
        &[
            ("b.csv", "P1,AQ,7-7,B,1\n"),
            ("a.csv", "P1,AQ,1-9,A,1\n"),
            ("notes.txt", "P1,AQ,1-9,X,1\n"),
        ],
    );

    let output = run(&["run", s(&daily), s(&hist), "-o", s(&dir.path().join("out.csv"))]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    let totals: Vec<&str> = content
        .lines()
        .map(|line| line.split(',').nth(66).unwrap())
        .collect();
    assert_eq!(totals, vec!["\"A\"", "\"B\""]);
}

#[test]
fn worker_count_does_not_change_output() {
    let dir = tempfile::tempdir().unwrap();
    let daily: Vec<String> = (0..6)
        .map(|p| {
            let aq = (p * 2).to_string();
            daily_line(&format!("P{}", p % 3), &[(2, aq.as_str()), (1, "x")])
        })
        .collect();
    let hist: String = (0..40)
        .map(|r| format!("P{},AQ,{}-{},T,W\n", r % 3, r % 7, r % 7 + 3))
        .collect();
    let (daily_path, hist_dir) = fixture(dir.path(), &daily, &[("h.csv", hist.as_str())]);

    let mut outputs = Vec::new();
    for workers in ["1", "3", "8"] {
        let out = dir.path().join(format!("out_{workers}.csv"));
        let output = run(&["run", s(&daily_path), s(&hist_dir), "-w", workers, "-o", s(&out)]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        outputs.push(fs::read(&out).unwrap());
    }

    assert!(!outputs[0].is_empty());
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test]
fn run_count_policy() {
    let dir = tempfile::tempdir().unwrap();
    // AQ = 5, AS (offset 4) = 3
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "5"), (4, "3")])],
        &[("wp.csv", "P1,AQAS,8,x,50\nP1,AQAS,9,x,50\n")],
    );

    let out = dir.path().join("wins.csv");
    let output = run(&["run", s(&daily), s(&hist), "--policy", "count", "-o", s(&out)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"AQAS\",\"8\""));
}

#[test]
fn run_xlsx_output() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "7")])],
        &[("h1.csv", "P1,AQ,5-10,9,100\n")],
    );

    let output = run(&["run", s(&daily), s(&hist), "--format", "xlsx"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out_path = dir.path().join("daily_Matches.xlsx");
    let table = zmatcher_io::read_table(&out_path, b',').unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].len(), 68);
    assert_eq!(table[0][63..], ["P1", "AQ", "5-10", "9", "100"]);
}

#[test]
fn header_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(
        dir.path(),
        &["id,header".to_string(), daily_line("P1", &[(2, "7")])],
        &[("h1.csv", "id,code,range,total,win\nP1,AQ,5-10,9,100\n")],
    );

    let out = dir.path().join("out.csv");
    let output = run(&[
        "run",
        s(&daily),
        s(&hist),
        "--daily-header-rows",
        "1",
        "--historical-header-rows",
        "1",
        "--any-id",
        "-o",
        s(&out),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    // Without skipping, the header rows would match vacuously under --any-id
    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 1);
}

// ===========================================================================
// Errors and exit codes
// ===========================================================================

#[test]
fn missing_arguments_is_usage_error() {
    let output = run(&["run"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no daily file"));
}

#[test]
fn missing_daily_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("hist")).unwrap();
    let output = run(&[
        "run",
        s(&dir.path().join("nope.csv")),
        s(&dir.path().join("hist")),
    ]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
}

#[test]
fn missing_folder_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, _) = fixture(dir.path(), &[daily_line("P1", &[])], &[]);
    let output = run(&["run", s(&daily), s(&dir.path().join("gone"))]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
}

#[test]
fn unsupported_daily_format() {
    let dir = tempfile::tempdir().unwrap();
    let (_, hist) = fixture(dir.path(), &[], &[]);
    let daily = dir.path().join("daily.txt");
    fs::write(&daily, "P1\n").unwrap();

    let output = run(&["run", s(&daily), s(&hist)]);
    assert_eq!(output.status.code(), Some(6), "stderr: {}", stderr(&output));
}

#[test]
fn unreadable_historical_file_aborts_unless_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "7")])],
        &[("a_broken.xlsx", "not a workbook"), ("b.csv", "P1,AQ,5-10,9,100\n")],
    );

    let output = run(&["run", s(&daily), s(&hist)]);
    assert_eq!(output.status.code(), Some(5), "stderr: {}", stderr(&output));
    assert!(!dir.path().join("daily_Matches.csv").exists());

    let output = run(&["run", s(&daily), s(&hist), "--skip-failed-files"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("skipped 1 file(s)"));
    assert!(dir.path().join("daily_Matches.csv").exists());
}

#[test]
fn invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(&config, "[match.schema]\ncodes = [\"AA\", \"AA\"]\n").unwrap();

    let output = run(&["run", "--config", s(&config)]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
}

#[test]
fn zero_workers_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (daily, hist) = fixture(dir.path(), &[daily_line("P1", &[])], &[]);
    let output = run(&["run", s(&daily), s(&hist), "-w", "0"]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
}

// ===========================================================================
// Config file
// ===========================================================================

#[test]
fn run_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fixture(
        dir.path(),
        &[daily_line("P1", &[(2, "5"), (4, "3")])],
        &[("wp.csv", "P1;AQAS;8;x;50\n")],
    );
    // Daily stays comma-separated; rewrite it with the config's delimiter
    let daily_semicolon = daily_line("P1", &[(2, "5"), (4, "3")]).replace(',', ";");
    fs::write(dir.path().join("daily.csv"), daily_semicolon + "\n").unwrap();

    let config = dir.path().join("run.toml");
    fs::write(
        &config,
        r#"
daily = "daily.csv"
historical = "hist"
output = "result.csv"
delimiter = ";"
workers = 2

[match.policy]
kind = "count"
"#,
    )
    .unwrap();

    let output = run(&["run", "--config", s(&config)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = fs::read_to_string(dir.path().join("result.csv")).unwrap();
    assert!(content.starts_with("\"P1\";"));
}

// ===========================================================================
// zmatch validate / columns
// ===========================================================================

#[test]
fn validate_reports_schema() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(&config, "daily = \"d.csv\"\n[match.policy]\nkind = \"count\"\n").unwrap();

    let output = run(&["validate", s(&config)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("valid: count policy, 22 code(s) (11 range), daily columns 41..=62"), "{err}");
}

#[test]
fn validate_rejects_bad_range_codes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(&config, "[match.schema]\ncodes = [\"AA\"]\nrange_codes = [\"ZZ\"]\n").unwrap();

    let output = run(&["validate", s(&config)]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn columns_lists_standard_table() {
    let output = run(&["columns"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 23, "header + 22 codes");
    assert!(lines[1].starts_with("AP"));
    assert!(lines[22].starts_with("BK"));
}
