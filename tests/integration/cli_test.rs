//! Integration tests for the `tostring` binary
//!
//! These run the compiled binary end to end:
//! - text lines from stdin and from a file
//! - JSON values in object mode, with placeholder and config file
//! - error reporting for bad options

#[cfg(test)]
mod cli_tests {
    use std::fs;
    use std::io::Write;
    use std::process::{Command, Output, Stdio};
    use tempfile::tempdir;

    fn run_tostring(input: &str, args: &[&str]) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_tostring"))
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to start tostring");

        // The binary may exit before reading stdin (bad options, file input).
        let _ = child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes());

        child.wait_with_output().expect("failed to wait for tostring")
    }

    #[test]
    fn test_text_lines_from_stdin() {
        let output = run_tostring("beep,boop,bop\nsecond line\n", &["--quiet"]);
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "beep,boop,bop\nsecond line\n"
        );
    }

    #[test]
    fn test_object_mode_with_placeholder() {
        let input = "1\n\"2\"\nfalse\nnull\n{}\n[]\n";
        let output = run_tostring(
            input,
            &["--object-mode", "--null-as-absent", "--placeholder", "BEEP"],
        );
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "1\n2\nfalse\nBEEP\n{}\n[]\n"
        );
    }

    #[test]
    fn test_config_file_and_output_file() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("options.json");
        let input_path = tmp.path().join("input.ndjson");
        let output_path = tmp.path().join("nested/out.txt");

        fs::write(&config_path, r#"{"object_mode": true, "high_water_mark": 1}"#).unwrap();
        fs::write(&input_path, "{\"b\":1,\"a\":2}\n[true]\n").unwrap();

        let output = run_tostring(
            "",
            &[
                input_path.to_str().unwrap(),
                "--config",
                config_path.to_str().unwrap(),
                "--output",
                output_path.to_str().unwrap(),
                "--quiet",
            ],
        );

        assert!(output.status.success());
        let contents = fs::read_to_string(output_path).unwrap();
        assert_eq!(contents, "{\"b\":1,\"a\":2}\n[true]\n");
    }

    #[test]
    fn test_invalid_config_option_fails() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("options.json");
        fs::write(&config_path, r#"{"allow_half_open": "sometimes"}"#).unwrap();

        let output = run_tostring("x\n", &["--config", config_path.to_str().unwrap()]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("allow_half_open"));
    }

    #[test]
    fn test_invalid_json_in_object_mode_fails() {
        let output = run_tostring("{\"a\": ", &["--object-mode"]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not a sequence of JSON values"));
        assert!(stderr.contains("Tip: --object-mode"));
    }

    #[test]
    fn test_null_as_absent_without_object_mode_is_rejected() {
        let output = run_tostring("null\n", &["--null-as-absent"]);
        assert!(!output.status.success());
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--object-mode"));
    }
}
