//! Mock coverage tool binary for integration testing
//!
//! Stands in for the test runner, profile merger, both converters and the
//! summary tool so the pipeline can be exercised without a Go toolchain. The
//! first argument selects the role; every call is appended as a JSON line to
//! the file named by `MOCK_TOOL_LOG`. `MOCK_TOOL_FAIL=<role>:<code>` makes
//! that role fail, printing a failing test report on stdout like `go test`.

use serde_json::json;
use std::io::{Read, Write};

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: mock_tool <test|merge|convert|xml|summary> [args...]");
        std::process::exit(64);
    }
    let role = args.remove(0);

    let mut stdin = String::new();
    if role == "xml" {
        std::io::stdin().read_to_string(&mut stdin).ok();
    }

    record(&role, &args, &stdin);

    if let Some(code) = failure_code(&role) {
        println!("--- FAIL: TestMock (0.00s)");
        eprintln!("mock {role} failed");
        std::process::exit(code);
    }

    let output = match role.as_str() {
        "test" => run_tests(&args),
        "merge" => merge(&args),
        "convert" => convert(&args),
        "xml" => format!("<coverage>{}</coverage>\n", stdin.trim()),
        "summary" => summary(&args),
        other => {
            eprintln!("unknown role '{other}'");
            std::process::exit(64);
        }
    };

    let mut out = std::io::stdout().lock();
    out.write_all(output.as_bytes()).ok();
    out.flush().ok();
}

fn record(role: &str, args: &[String], stdin: &str) {
    let Ok(path) = std::env::var("MOCK_TOOL_LOG") else {
        return;
    };
    let line = json!({ "role": role, "args": args, "stdin": stdin });
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        writeln!(file, "{line}").ok();
    }
}

fn failure_code(role: &str) -> Option<i32> {
    let spec = std::env::var("MOCK_TOOL_FAIL").ok()?;
    let (failing, code) = spec.split_once(':')?;
    if failing == role {
        code.parse().ok()
    } else {
        None
    }
}

fn run_tests(args: &[String]) -> String {
    let target = args.last().cloned().unwrap_or_default();
    let package = target.trim_end_matches('/');

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let path = match arg.strip_prefix("-coverprofile=") {
            Some(path) => Some(path.to_string()),
            None if arg == "-coverprofile" => iter.next().cloned(),
            None => None,
        };
        if let Some(path) = path {
            let profile = format!("mode: set\n{package}/main.go:1.1,2.2 1 1\n");
            if let Err(e) = std::fs::write(&path, profile) {
                eprintln!("cannot write {path}: {e}");
                std::process::exit(1);
            }
        }
    }
    eprintln!("mock: tested {target}");
    format!("ok  \t{target}\n")
}

fn merge(files: &[String]) -> String {
    let mut merged = String::from("mode: set\n");
    for file in files {
        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("cannot read {file}: {e}");
                std::process::exit(1);
            }
        };
        for line in content.lines().filter(|l| !l.starts_with("mode:")) {
            merged.push_str(line);
            merged.push('\n');
        }
    }
    merged
}

fn read_blocks(file: &str) -> usize {
    std::fs::read_to_string(file)
        .map(|c| c.lines().filter(|l| !l.starts_with("mode:")).count())
        .unwrap_or(0)
}

fn convert(args: &[String]) -> String {
    let Some(file) = args.last() else {
        eprintln!("convert needs a profile");
        std::process::exit(64);
    };
    json!({ "profile": file, "blocks": read_blocks(file) }).to_string()
}

fn summary(args: &[String]) -> String {
    let Some(file) = args.last() else {
        eprintln!("summary needs a profile");
        std::process::exit(64);
    };
    format!("total:\t(statements)\t{} blocks\n", read_blocks(file))
}
