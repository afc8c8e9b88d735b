// Integration tests for the `trainrecon` binary: exit codes, --json
// contract, report/history/tracker side effects.
//
// Run with: cargo test -p trainrecon-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ws = Self { dir };
        ws.write(
            "team.csv",
            "Unisea E-learning User;Position in Matrix;Nationality\n\
             John Smith;\"Operator\nOperador\";BR\n\
             Mary Jones;\"Welder\nSoldador\";US\n",
        );
        ws.write(
            "matrix.csv",
            "Role;Role PT;Procedure;Code EN;Code PT;Requirement\n\
             Operator;Operador;Induction;P-100-EN;P-100-PT;Mandatory\n\
             Welder;Soldador;Hot work;P-300-EN;P-300-PT;Recommended\n",
        );
        ws.write(
            "control.csv",
            "Name,c1,c2,c3,Code,Title,c6,c7,Status,Date\n\
             John Smith,,,,P-100-PT,Induction REV0003,,,Completed,2024-01-10\n\
             Mary Jone,,,,P-300-EN,Hot work REV0001,,,Completed,2024-02-20\n",
        );
        ws.write(
            "types.csv",
            "Code A,Code B,Category\nP-100-EN,P-100-PT,Safety\n",
        );
        ws.write(
            "settings.json",
            &format!(
                "{{\n  \"history.database\": {:?},\n  \"tracker.path\": {:?},\n  \"report.user\": \"qa\"\n}}\n",
                ws.path("history.db").display().to_string(),
                ws.path("tracker.csv").display().to_string(),
            ),
        );
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) {
        std::fs::write(self.path(name), content).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_trainrecon"));
        cmd.current_dir(self.dir.path());
        cmd.env_remove("RUST_LOG");
        cmd.arg("--settings").arg(self.path("settings.json"));
        cmd
    }

    fn run(&self, extra: &[&str]) -> Output {
        self.cmd()
            .args([
                "run",
                "--team",
                "team.csv",
                "--requirements",
                "matrix.csv",
                "--control",
                "control.csv",
            ])
            .args(extra)
            .output()
            .expect("trainrecon run")
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn exists(path: &Path) -> bool {
    path.exists()
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_writes_report_and_history() {
    let ws = Workspace::new();
    let output = ws.run(&["--output", "report.xlsx"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(exists(&ws.path("report.xlsx")));
    assert!(stderr(&output).contains("reconciled 2 records"));

    let history = ws.cmd().args(["history", "--json"]).output().unwrap();
    assert!(history.status.success(), "stderr: {}", stderr(&history));
    let entries: serde_json::Value = serde_json::from_slice(&history.stdout).unwrap();
    assert_eq!(entries[0]["file_name"], "report.xlsx");
    assert_eq!(entries[0]["report_type"], "xlsx");
    assert_eq!(entries[0]["user"], "qa");
}

#[test]
fn run_default_name_in_output_dir() {
    let ws = Workspace::new();
    let output = ws.run(&["--output-dir", "out", "--format", "csv", "--no-history"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let files: Vec<String> = std::fs::read_dir(ws.path("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("Status_Treinamento_"), "{files:?}");
    assert!(files[0].ends_with(".csv"));
    assert!(!exists(&ws.path("history.db")));
}

#[test]
fn run_json_is_single_document() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--training-types", "types.csv"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = val["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["employee_id"], "John Smith");
    assert_eq!(records[0]["category"], "Safety");
    assert_eq!(records[0]["final_status"], "Completed");
    assert_eq!(val["summary"]["fuzzy"], 1);
    assert!(val.get("filter").is_none());

    // --json alone writes no report
    let any_report = std::fs::read_dir(ws.dir.path())
        .unwrap()
        .any(|e| e.unwrap().file_name().to_string_lossy().starts_with("Status_Treinamento_"));
    assert!(!any_report);
}

#[test]
fn run_json_with_role_filter() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--role", "Soldador"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["records"].as_array().unwrap().len(), 1);
    assert_eq!(val["filter"]["role"], "Soldador");
}

#[test]
fn strict_fails_on_inconsistent_records() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--strict"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("1 inconsistent records"));
}

#[test]
fn threshold_flag_overrides_settings() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--threshold", "100"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["summary"]["fuzzy"], 0);
    assert_eq!(val["meta"]["fuzzy_threshold"], 100);
}

#[test]
fn config_file_overrides_settings() {
    let ws = Workspace::new();
    ws.write(
        "settings.json",
        "{\n  \"recon.fuzzyThreshold\": 50,\n  \"recon.domesticNationality\": \"US\"\n}\n",
    );
    ws.write("strict.toml", "fuzzy_threshold = 95\n");

    let validate = |extra: &[&str]| {
        ws.cmd()
            .args([
                "validate",
                "--team",
                "team.csv",
                "--requirements",
                "matrix.csv",
                "--control",
                "control.csv",
            ])
            .args(extra)
            .output()
            .unwrap()
    };

    let output = validate(&["--config", "strict.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("fuzzy threshold 95"), "{}", stderr(&output));

    // Without --config the settings value applies.
    let output = validate(&[]);
    assert!(stderr(&output).contains("fuzzy threshold 50"), "{}", stderr(&output));

    // --threshold still beats the file.
    let output = validate(&["--config", "strict.toml", "--threshold", "70"]);
    assert!(stderr(&output).contains("fuzzy threshold 70"), "{}", stderr(&output));
}

#[test]
fn config_file_keeps_settings_for_unset_keys() {
    let ws = Workspace::new();
    ws.write("settings.json", "{ \"recon.domesticNationality\": \"US\" }\n");
    ws.write("recon.toml", "fuzzy_threshold = 80\n");
    let output = ws.run(&["--json", "--config", "recon.toml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Mary is US, so domestic: she is assigned the PT code.
    assert_eq!(val["records"][1]["assigned_code"], "P-300-PT");
    assert_eq!(val["records"][0]["assigned_code"], "P-100-EN");
}

#[test]
fn update_tracker_writes_csv() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--update-tracker"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let show = ws.cmd().args(["tracker", "show", "--json"]).output().unwrap();
    assert!(show.status.success(), "stderr: {}", stderr(&show));
    let rows: serde_json::Value = serde_json::from_slice(&show.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[1]["assigned_code"], "P-300-EN");
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn schema_error_exit_code() {
    let ws = Workspace::new();
    ws.write("control.csv", "Name,c1,c2,c3,Code\nJohn Smith,,,,P-100-PT\n");
    let output = ws.run(&["--json"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("missing column"));
}

#[test]
fn missing_input_is_io_error() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.path("team.csv")).unwrap();
    let output = ws.run(&["--json"]);

    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn bad_config_exit_code() {
    let ws = Workspace::new();
    ws.write("recon.toml", "fuzzy_threshold = 150\n");
    let output = ws.run(&["--json", "--config", "recon.toml"]);

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn usage_error_exit_code() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["run", "--team", "team.csv"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// validate / views
// ===========================================================================

#[test]
fn validate_reports_every_table() {
    let ws = Workspace::new();
    ws.write("types.csv", "Code A,Code B\nP-1,P-2\n");
    let output = ws
        .cmd()
        .args([
            "validate",
            "--team",
            "team.csv",
            "--requirements",
            "matrix.csv",
            "--control",
            "control.csv",
            "--training-types",
            "types.csv",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("ok     team"), "{err}");
    assert!(err.contains("ok     control"), "{err}");
    assert!(err.contains("error  training-type"), "{err}");
}

#[test]
fn views_json_shape() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args([
            "views",
            "--team",
            "team.csv",
            "--requirements",
            "matrix.csv",
            "--control",
            "control.csv",
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["status_counts"].as_array().unwrap().len(), 3);
    assert!(val["status_by_role"]["Operador"].is_object());
    assert_eq!(val["monthly"][0]["month"], "2024-01");
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn config_show_resolves_data_paths() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["config", "show"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["report.user"], "qa");
    assert_eq!(
        val["resolved.historyDatabase"],
        ws.path("history.db").display().to_string()
    );
}

#[test]
fn config_init_refuses_to_overwrite() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["config", "init"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--force"));

    let output = ws.cmd().args(["config", "init", "--force"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(ws.path("settings.json")).unwrap();
    assert!(written.contains("\"output.format\": \"xlsx\""));
}
