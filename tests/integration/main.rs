//! Integration tests for tiercache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tiercache() -> Command {
        let mut cmd = cargo_bin_cmd!("tiercache");
        cmd.env_remove("TIERCACHE_CONFIG")
            .env_remove("TIERCACHE_REMOTE")
            .env_remove("TIERCACHE_LOCAL");
        cmd
    }

    /// Remote directory, local cache and config file under one temp dir
    struct Sandbox {
        temp: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("remote")).unwrap();
            Self { temp }
        }

        fn config_path(&self) -> PathBuf {
            self.temp.path().join("config.toml")
        }

        fn remote_objects(&self) -> PathBuf {
            self.temp.path().join("remote").join("objects")
        }

        fn cmd(&self) -> Command {
            let mut cmd = tiercache();
            cmd.arg("--config")
                .arg(self.config_path())
                .arg("--remote")
                .arg(self.temp.path().join("remote"))
                .arg("--local")
                .arg(self.temp.path().join("local"));
            cmd
        }

        fn put(&self, id: &str, content: &str) {
            self.cmd()
                .args(["put", id])
                .write_stdin(content)
                .assert()
                .success();
        }

        fn state_of(&self, id: &str) -> String {
            let output = self
                .cmd()
                .args(["status", "--format", "plain", id])
                .output()
                .unwrap();
            assert!(output.status.success());
            String::from_utf8(output.stdout).unwrap().trim().to_string()
        }
    }

    #[test]
    fn help_displays() {
        tiercache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("caching storage"));
    }

    #[test]
    fn version_displays() {
        tiercache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tiercache"));
    }

    #[test]
    fn put_then_get_roundtrip() {
        let sandbox = Sandbox::new();
        sandbox.put("greeting", "hello");

        sandbox
            .cmd()
            .args(["get", "greeting"])
            .assert()
            .success()
            .stdout("hello");
    }

    #[test]
    fn get_caches_locally() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "content of a");
        assert_eq!(sandbox.state_of("a"), "a\tremote");

        sandbox.cmd().args(["get", "a"]).assert().success();
        assert_eq!(sandbox.state_of("a"), "a\tcached");
    }

    #[test]
    fn lazy_get_leaves_cache_empty() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "content of a");

        sandbox
            .cmd()
            .args(["--lazy", "get", "a"])
            .assert()
            .success()
            .stdout("content of a");
        assert_eq!(sandbox.state_of("a"), "a\tremote");
    }

    #[test]
    fn get_to_file() {
        let sandbox = Sandbox::new();
        let source = sandbox.temp.path().join("source.bin");
        let target = sandbox.temp.path().join("target.bin");
        let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&source, &content).unwrap();

        sandbox
            .cmd()
            .args(["put", "blob"])
            .arg(&source)
            .assert()
            .success()
            .stderr(predicate::str::contains("50000 bytes"));

        sandbox
            .cmd()
            .args(["get", "blob", "-o"])
            .arg(&target)
            .assert()
            .success();

        assert_eq!(fs::read(&target).unwrap(), content);
    }

    #[test]
    fn get_missing_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["get", "absent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not found"));
    }

    #[test]
    fn missing_remote_reports_hint() {
        let temp = TempDir::new().unwrap();
        tiercache()
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .args(["get", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No remote store configured"))
            .stderr(predicate::str::contains("--remote"));
    }

    #[test]
    fn cache_then_status_lists_ids() {
        let sandbox = Sandbox::new();
        sandbox.put("one", "1");
        sandbox.put("two", "2");

        sandbox.cmd().args(["cache", "one", "two"]).assert().success();

        let output = sandbox
            .cmd()
            .args(["status", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let statuses: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let ids: Vec<&str> = statuses
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert!(statuses[0]["local"].as_bool().unwrap());
    }

    #[test]
    fn cache_missing_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["cache", "absent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("could not be cached"));
    }

    #[test]
    fn purge_keeps_remote() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "abc");
        sandbox.cmd().args(["cache", "a"]).assert().success();

        sandbox
            .cmd()
            .args(["purge", "a"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Purged a"));

        assert_eq!(sandbox.state_of("a"), "a\tremote");
        sandbox.cmd().args(["get", "a"]).assert().success().stdout("abc");
    }

    #[test]
    fn overwrite_is_hidden_until_purged() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "old");
        sandbox.cmd().args(["get", "a"]).assert().success().stdout("old");

        sandbox
            .cmd()
            .args(["put", "a"])
            .write_stdin("new")
            .assert()
            .success()
            .stderr(predicate::str::contains("still cached locally"));
        sandbox.cmd().args(["get", "a"]).assert().success().stdout("old");

        sandbox
            .cmd()
            .args(["put", "--purge", "a"])
            .write_stdin("newer")
            .assert()
            .success();
        sandbox.cmd().args(["get", "a"]).assert().success().stdout("newer");
    }

    #[test]
    fn delete_removes_everywhere() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "abc");
        sandbox.cmd().args(["cache", "a"]).assert().success();

        sandbox
            .cmd()
            .args(["delete", "a"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Deleted a"));

        assert_eq!(sandbox.state_of("a"), "a\tmissing");
    }

    #[test]
    fn clear_requires_confirmation() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "abc");

        sandbox
            .cmd()
            .arg("clear")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--yes"));

        assert_eq!(sandbox.state_of("a"), "a\tremote");
    }

    #[test]
    fn clear_removes_all_objects() {
        let sandbox = Sandbox::new();
        sandbox.put("a", "abc");
        sandbox.put("b", "def");
        sandbox.cmd().args(["cache", "a"]).assert().success();

        sandbox.cmd().args(["clear", "--yes"]).assert().success();

        assert_eq!(fs::read_dir(sandbox.remote_objects()).unwrap().count(), 0);
        assert_eq!(sandbox.state_of("a"), "a\tmissing");
        sandbox
            .cmd()
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        tiercache()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"));
    }

    #[test]
    fn config_set_persists() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "cache.chunk_size", "4096"])
            .assert()
            .success();

        let content = fs::read_to_string(sandbox.config_path()).unwrap();
        assert!(content.contains("chunk_size = 4096"));
        assert!(!content.contains("[remote]"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "cache.colour", "blue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn remote_from_config_file() {
        let sandbox = Sandbox::new();
        fs::write(
            sandbox.config_path(),
            format!(
                "[remote]\nkind = \"directory\"\npath = {:?}\n\n[local]\npath = {:?}\n",
                sandbox.temp.path().join("remote"),
                sandbox.temp.path().join("local"),
            ),
        )
        .unwrap();
        sandbox.put("a", "from file config");

        tiercache()
            .arg("--config")
            .arg(sandbox.config_path())
            .args(["get", "a"])
            .assert()
            .success()
            .stdout("from file config");
    }

    #[test]
    fn relative_local_dirs_keep_separate_state() {
        let sandbox = Sandbox::new();
        let first = sandbox.temp.path().join("w1");
        let second = sandbox.temp.path().join("w2");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(
            sandbox.config_path(),
            format!(
                "[remote]\nkind = \"directory\"\npath = {:?}\n\n[cache]\nstate_file = {:?}\n",
                sandbox.temp.path().join("remote"),
                sandbox.temp.path().join("shared-state.json"),
            ),
        )
        .unwrap();
        sandbox.put("a", "shared remote");

        let relative = |cwd: &PathBuf| {
            let mut cmd = tiercache();
            cmd.current_dir(cwd)
                .arg("--config")
                .arg(sandbox.config_path())
                .args(["--local", "cache"]);
            cmd
        };

        relative(&first).args(["cache", "a"]).assert().success();
        relative(&first)
            .args(["status", "--format", "plain", "a"])
            .assert()
            .success()
            .stdout("a\tcached\n");

        relative(&second)
            .args(["status", "--format", "plain", "a"])
            .assert()
            .success()
            .stdout("a\tremote\n");
        relative(&second)
            .args(["get", "a"])
            .assert()
            .success()
            .stdout("shared remote");
    }
}
