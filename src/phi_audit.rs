// PHI audit: static analysis tests that scan every Rust source file for
// tracing calls carrying patient fields. Keeps names, diagnoses and clinician
// notes out of the logs as the code changes.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use regex::Regex;

    /// Patient-identifying fields that MUST NOT appear in tracing macro
    /// arguments. Matched as whole identifiers.
    const PHI_PATTERNS: &[&str] = &[
        "full_name",
        "patient_name",
        "age",
        "diagnosis",
        "start_date",
        "medical_aid",
        "disciplines",
        "modality",
        "auth_left",
        "last_meeting_comment",
        "social_work",
        "doctor",
        "psychology",
    ];

    /// Files that mention the patterns outside tracing calls on purpose.
    const ALLOWLIST: &[&str] = &["phi_audit.rs"];

    fn tracing_start() -> Regex {
        Regex::new(r"tracing::(trace|debug|info|warn|error)!\s*\(").unwrap()
    }

    fn phi_regex() -> Regex {
        let alternation = PHI_PATTERNS.join("|");
        Regex::new(&format!(r"\b({alternation})\b")).unwrap()
    }

    /// Collect every tracing macro call in `content` as `(line, call text)`.
    fn tracing_calls(content: &str) -> Vec<(usize, String)> {
        let start = tracing_start();
        let lines: Vec<&str> = content.lines().collect();
        let mut calls = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let Some(found) = start.find(lines[i]) else {
                i += 1;
                continue;
            };

            let first = &lines[i][found.start()..];
            let mut call = String::from(first.trim());
            let mut depth = paren_balance(first);
            let mut j = i + 1;
            while depth > 0 && j < lines.len() {
                let next = lines[j].trim();
                call.push(' ');
                call.push_str(next);
                depth += paren_balance(next);
                j += 1;
            }

            calls.push((i + 1, call));
            i = j;
        }
        calls
    }

    fn paren_balance(text: &str) -> i32 {
        text.chars().fold(0, |depth, ch| match ch {
            '(' => depth + 1,
            ')' => depth - 1,
            _ => depth,
        })
    }

    /// Phrases inside string literals are log messages, not fields.
    fn strip_string_literals(call: &str) -> String {
        let literal = Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap();
        literal.replace_all(call, "\"\"").into_owned()
    }

    fn violations_in(content: &str) -> Vec<(usize, String, String)> {
        let phi = phi_regex();
        tracing_calls(content)
            .into_iter()
            .filter_map(|(line, call)| {
                let code = strip_string_literals(&call);
                phi.find(&code)
                    .map(|m| (line, m.as_str().to_string(), call.clone()))
            })
            .collect()
    }

    #[test]
    fn no_phi_in_tracing_calls() {
        let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
        assert!(src_dir.exists(), "Source directory not found: {}", src_dir.display());

        let mut report = Vec::new();
        scan_directory(&src_dir, &src_dir, &mut report);

        assert!(
            report.is_empty(),
            "PHI AUDIT FAILED, {} violation(s) found in tracing calls:\n{}\n\n\
             Fix: log opaque ids, counts and row numbers instead.",
            report.len(),
            report.join("\n")
        );
    }

    #[test]
    fn scanner_detects_known_violation() {
        let source = r#"
            tracing::info!(
                name = %record.full_name,
                "stored patient"
            );
        "#;
        let found = violations_in(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
    }

    #[test]
    fn scanner_finds_calls_mid_line() {
        let source = r#"Err(_) => tracing::warn!(doctor = %d, "x"),"#;
        assert_eq!(violations_in(source).len(), 1);
    }

    #[test]
    fn scanner_passes_clean_tracing() {
        let source = r#"
            tracing::info!(patient_id = %id, batch = 2, "record stored");
            tracing::debug!(sheet = %name, rows = 4, "Parsed sheet");
        "#;
        assert!(violations_in(source).is_empty());
    }

    fn scan_directory(root: &Path, dir: &Path, report: &mut Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                scan_directory(root, &path, report);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                scan_file(root, &path, report);
            }
        }
    }

    fn scan_file(root: &Path, path: &Path, report: &mut Vec<String>) {
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        if ALLOWLIST.iter().any(|a| filename.contains(a)) {
            return;
        }
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };
        let relative = path.strip_prefix(root).unwrap_or(path).display().to_string();

        for (line, pattern, call) in violations_in(&content) {
            report.push(format!("  {relative}:{line}: found '{pattern}' in: {call}"));
        }
    }
}
