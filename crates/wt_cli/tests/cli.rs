use std::io::Write;
use std::process::Command;

fn wt(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_wt"))
        .args(args)
        .output()
        .unwrap()
}

fn write_script(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".wt")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn run_delivers_the_message_and_prints_output() {
    let script = write_script(
        "on startup\n\
         put \"hello from\" && the paramCount && \"params\"\n\
         end startup",
    );
    let out = wt(&["run", script.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "hello from 0 params\n");
}

#[test]
fn run_passes_extra_arguments_to_the_handler() {
    let script = write_script(
        "on greet who\n\
         put \"hi\" && who\n\
         end greet",
    );
    let out = wt(&["run", script.path().to_str().unwrap(), "greet", "world"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "hi world\n");
}

#[test]
fn check_rejects_a_malformed_script() {
    let script = write_script("on go\nput \"unterminated\nend go");
    let out = wt(&["check", script.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!out.stderr.is_empty());
}

#[test]
fn check_accepts_a_clean_script() {
    let script = write_script("on go\nput 1 into x\nend go");
    let out = wt(&["check", script.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn eval_prints_the_value() {
    let out = wt(&["eval", "2 + 3 * 4"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "14\n");
}

#[test]
fn do_runs_loose_statements() {
    let out = wt(&["do", "put item 2 of \"a,b,c\""]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "b\n");
}

#[test]
fn runtime_faults_exit_nonzero() {
    let script = write_script("on go\nput 1 / 0\nend go");
    let out = wt(&["run", script.path().to_str().unwrap(), "go"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("division by zero"));
}
