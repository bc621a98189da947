//! Integration tests for convcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
[[record]]
name = "Node"
tag = "node"

[[record.field]]
name = "label"
type = "str"

[[record.field]]
name = "children"
type = "list[Node]"
default = []

[[record]]
name = "Point"
positional = true

[[record.field]]
name = "x"
type = "int"

[[record.field]]
name = "y"
type = "int"
default = 0
"#;

    /// A scratch directory with a schema and an isolated config path
    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("schema.toml"), SCHEMA).unwrap();
            Self { dir }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn schema(&self) -> PathBuf {
            self.path().join("schema.toml")
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("convcache");
            cmd.current_dir(self.path())
                .env_remove("CONVCACHE_CONFIG")
                .arg("--no-local")
                .arg("--config")
                .arg(self.path().join("config.toml"));
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("convcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("schema-driven JSON converters"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("convcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("convcache"));
    }

    #[test]
    fn check_valid_tree() {
        let fx = Fixture::new();
        let doc = fx.write(
            "tree.json",
            r#"{"_type_": "node", "label": "root", "children": [
                {"_type_": "node", "label": "leaf"}
            ]}"#,
        );

        fx.cmd()
            .arg("check")
            .arg("--schema")
            .arg(fx.schema())
            .args(["--type", "Node"])
            .arg(&doc)
            .assert()
            .success()
            .stdout(predicate::str::contains("Document conforms to Node"));
    }

    #[test]
    fn check_invalid_reports_path() {
        let fx = Fixture::new();
        let doc = fx.write(
            "tree.json",
            r#"{"_type_": "node", "label": "root", "children": [{"label": 7}]}"#,
        );

        fx.cmd()
            .arg("check")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "Node"])
            .arg(&doc)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Document does not conform to Node"))
            .stderr(predicate::str::contains("children.0.label"));
    }

    #[test]
    fn check_reads_stdin() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("check")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "list[Point]"])
            .write_stdin("[[1, 2], {\"x\": 3}]")
            .assert()
            .success();
    }

    #[test]
    fn check_reports_oversized_int() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("check")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "Point"])
            .write_stdin("[18446744073709551615]")
            .assert()
            .failure()
            .stderr(predicate::str::contains("x: Integer 18446744073709551615 is out of range"));
    }

    #[test]
    fn normalize_applies_defaults_and_tags() {
        let fx = Fixture::new();
        let output = fx
            .cmd()
            .arg("normalize")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "tuple[Node, Point]"])
            .write_stdin(r#"[{"label": "a", "children": []}, [4, 0]]"#)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"label": "a", "_type_": "node"}, {"x": 4}])
        );
    }

    #[test]
    fn unknown_type_hints() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("normalize")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "Missing"])
            .write_stdin("{}")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown type: Missing"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn bad_type_syntax() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("check")
            .arg("-s")
            .arg(fx.schema())
            .args(["-t", "list[int"])
            .write_stdin("[]")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid type expression"));
    }

    #[test]
    fn types_plain() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("types")
            .arg("-s")
            .arg(fx.schema())
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout("Node\nPoint\n");
    }

    #[test]
    fn types_json() {
        let fx = Fixture::new();
        let output = fx
            .cmd()
            .arg("types")
            .arg("-s")
            .arg(fx.schema())
            .args(["--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value[0]["name"], "Node");
        assert_eq!(value[0]["field"][1]["type"], "list[Node]");
        assert_eq!(value[1]["positional"], true);
    }

    #[test]
    fn types_rejects_unknown_reference() {
        let fx = Fixture::new();
        let schema = fx.write(
            "broken.toml",
            "[[record]]\nname = \"A\"\n[[record.field]]\nname = \"b\"\ntype = \"B\"\n",
        );
        fx.cmd()
            .arg("types")
            .arg("-s")
            .arg(schema)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown type: B"));
    }

    #[test]
    fn config_path_honors_flag() {
        let fx = Fixture::new();
        fx.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let fx = Fixture::new();
        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_init_then_set() {
        let fx = Fixture::new();
        fx.cmd().args(["config", "init"]).assert().success();
        assert!(fx.path().join("config.toml").exists());

        fx.cmd()
            .args(["config", "set", "cache.isolation", "session"])
            .assert()
            .success();
        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("isolation = \"session\""));

        fx.cmd()
            .args(["config", "set", "cache.isolation", "process"])
            .assert()
            .failure();
    }

    #[test]
    fn local_config_discovered() {
        let fx = Fixture::new();
        fx.write(".convcache.toml", "[cache]\nmemoize = false\n");

        let mut cmd = cargo_bin_cmd!("convcache");
        cmd.current_dir(fx.path())
            .env_remove("CONVCACHE_CONFIG")
            .arg("--config")
            .arg(fx.path().join("config.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("memoize = false"));
    }
}
