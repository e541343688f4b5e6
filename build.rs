use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const CHECKED_EXTENSIONS: &[&str] = &["rs", "md", "yaml", "toml"];

const EXCLUDED_DIRS: &[&str] = &["target", ".git", "examples"];

const EXCLUDED_FILES: &[&str] = &["Cargo.lock"];

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");

    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=TICKETFLOW_GIT_SHA={}", sha);

    let root = PathBuf::from(
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set"),
    );
    let files = collect_files_to_check(&root);

    enforce_line_limits(&root, &files);
    enforce_no_dead_code_allows(&root, &files);
    enforce_no_test_skips(&root, &files);
    enforce_serial_for_env_mutations(&root, &files);
}

fn enforce_line_limits(root: &Path, files: &[PathBuf]) {
    for file in files {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let mut violations = Vec::new();
    for file in files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                let line_count = count_non_empty_lines(&content);
                if line_count > MAX_LINES {
                    violations.push((relative(root, file), line_count));
                }
            }
            Err(e) => println!(
                "cargo:warning=Could not read file {}: {}",
                relative(root, file).display(),
                e
            ),
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("FILE LINE LIMIT EXCEEDED (max {} lines)", MAX_LINES);
        eprintln!("========================================");
        for (path, lines) in &violations {
            eprintln!(
                "  {} - {} lines (exceeds by {})",
                path.display(),
                lines,
                lines - MAX_LINES
            );
        }
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} file(s) exceed the {} line limit",
            violations.len(),
            MAX_LINES
        );
    }
}

fn collect_files_to_check(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Ok(output) = Command::new("git")
        .args(["ls-files"])
        .current_dir(root)
        .output()
    {
        if output.status.success() {
            if let Ok(stdout) = String::from_utf8(output.stdout) {
                for line in stdout.lines() {
                    let path = root.join(line);
                    if should_check_file(&path, root) {
                        files.push(path);
                    }
                }
                if !files.is_empty() {
                    return files;
                }
            }
        }
    }

    walk_directory(root, root, &mut files);
    files
}

fn walk_directory(dir: &Path, root: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if EXCLUDED_DIRS.contains(&name) {
                    continue;
                }
            }
            walk_directory(&path, root, files);
        } else if should_check_file(&path, root) {
            files.push(path);
        }
    }
}

fn should_check_file(path: &Path, root: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };

    if !CHECKED_EXTENSIONS.contains(&ext) {
        return false;
    }

    if let Ok(rel_path) = path.strip_prefix(root) {
        let rel_str = rel_path.to_string_lossy();
        if EXCLUDED_FILES.iter().any(|excluded| rel_str == *excluded) {
            return false;
        }

        for component in rel_path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if EXCLUDED_DIRS.contains(&name) {
                    return false;
                }
            }
        }
    }

    true
}

fn count_non_empty_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

fn relative(root: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(root).unwrap_or(file).to_path_buf()
}

/// Rust sources other than this build script.
fn rust_sources(files: &[PathBuf]) -> impl Iterator<Item = &PathBuf> {
    files.iter().filter(|p| {
        p.extension().and_then(|e| e.to_str()) == Some("rs")
            && p.file_name().and_then(|n| n.to_str()) != Some("build.rs")
    })
}

fn enforce_no_dead_code_allows(root: &Path, files: &[PathBuf]) {
    let mut violations: Vec<(PathBuf, usize, String)> = Vec::new();

    for file in rust_sources(files) {
        if let Ok(content) = std::fs::read_to_string(file) {
            for (line_num, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                    && trimmed.contains("dead_code")
                {
                    violations.push((relative(root, file), line_num + 1, trimmed.to_string()));
                }
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("#[allow(dead_code)] IS NOT ALLOWED");
        eprintln!("========================================");
        for (path, line_num, line) in &violations {
            eprintln!("  {}:{}", path.display(), line_num);
            eprintln!("    {}", line);
        }
        eprintln!("========================================");
        eprintln!("Delete unused code, or gate test-only helpers behind #[cfg(test)].");
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} #[allow(dead_code)] occurrence(s) found. Remove the dead code.",
            violations.len()
        );
    }
}

/// One test function located in a source file.
struct TestFn {
    start_line: usize,
    name: String,
    serial: bool,
    body: Vec<String>,
}

/// Splits a source file into its `#[test]` / `#[tokio::test]` functions.
fn test_functions(content: &str) -> Vec<TestFn> {
    let lines: Vec<&str> = content.lines().collect();
    let mut tests = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed != "#[test]" && !trimmed.starts_with("#[tokio::test") {
            i += 1;
            continue;
        }

        let start_line = i + 1;
        let mut serial = false;
        let mut name = String::new();
        let mut j = i + 1;
        while j < lines.len() && j < i + 5 {
            let attr = lines[j].trim();
            if attr == "#[serial]" || attr == "#[serial_test::serial]" {
                serial = true;
            }
            if let Some((_, after_fn)) = lines[j].split_once("fn ") {
                name = after_fn
                    .split('(')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                break;
            }
            j += 1;
        }
        if i > 0 {
            let prev = lines[i - 1].trim();
            serial |= prev == "#[serial]" || prev == "#[serial_test::serial]";
        }

        let mut body = Vec::new();
        let mut depth: i32 = 0;
        let mut opened = false;
        while j < lines.len() {
            let line = lines[j];
            for c in line.chars() {
                if c == '{' {
                    depth += 1;
                    opened = true;
                } else if c == '}' {
                    depth -= 1;
                }
            }
            body.push(line.to_string());
            j += 1;
            if opened && depth <= 0 {
                break;
            }
        }

        tests.push(TestFn {
            start_line,
            name,
            serial,
            body,
        });
        i = j;
    }

    tests
}

fn enforce_no_test_skips(root: &Path, files: &[PathBuf]) {
    let skip_patterns = ["Skipping test", "skipping test", "Test skipped", "test skipped"];
    let mut violations: Vec<(PathBuf, usize, String)> = Vec::new();

    for file in rust_sources(files) {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        for test in test_functions(&content) {
            let skipped = test
                .body
                .iter()
                .any(|line| skip_patterns.iter().any(|p| line.contains(p)));
            let early_return = test.body.iter().skip(1).any(|line| line.trim() == "return;");
            if skipped || early_return {
                violations.push((
                    relative(root, file),
                    test.start_line,
                    format!("test `{}` silently skips", test.name),
                ));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("SILENT TEST SKIPS ARE NOT ALLOWED");
        eprintln!("========================================");
        for (path, line_num, msg) in &violations {
            eprintln!("  {}:{}", path.display(), line_num);
            eprintln!("    {}", msg);
        }
        eprintln!("========================================");
        eprintln!("Tests must FAIL if they cannot run, not silently pass.");
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} silent test skip(s) found. Make tests fail instead of skip.",
            violations.len()
        );
    }
}

/// Requires #[serial] for tests that mutate environment variables.
fn enforce_serial_for_env_mutations(root: &Path, files: &[PathBuf]) {
    let mut violations: Vec<(PathBuf, usize, String)> = Vec::new();

    for file in rust_sources(files) {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        for test in test_functions(&content) {
            let mutates_env = test.body.iter().any(|line| {
                let trimmed = line.trim();
                !trimmed.starts_with("//")
                    && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"))
            });
            if mutates_env && !test.serial {
                violations.push((
                    relative(root, file),
                    test.start_line,
                    format!("test `{}` mutates env without #[serial]", test.name),
                ));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("ENV MUTATIONS REQUIRE #[serial]");
        eprintln!("========================================");
        for (path, line_num, msg) in &violations {
            eprintln!("  {}:{}", path.display(), line_num);
            eprintln!("    {}", msg);
        }
        eprintln!("========================================\n");
        panic!(
            "Build failed: {} test(s) mutate env vars without #[serial].",
            violations.len()
        );
    }
}
