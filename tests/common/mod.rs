#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    /// Runs inside the temp dir so the default `--defines .` store lands there.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("mushform");
        cmd.current_dir(&self.root).env("RUST_LOG", "mushform=info");
        cmd
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read output")
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_failure(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("error json output")
    }

    pub fn write_host_config(&self, port: u16) -> PathBuf {
        self.write(
            "host.toml",
            &format!(
                r#"[host]
address = "127.0.0.1"
port = {}
username = "Builder"
password = "secret"
settle_ms = 50
reply_timeout_ms = 2000
"#,
                port
            ),
        )
    }
}

/// A single-connection stand-in for a MUSH server. It answers `@version`
/// with `version_reply` and every search probe with `answer` wrapped in the
/// probe's token, and returns every line it received once the client hangs up.
pub struct FakeMush {
    pub port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl FakeMush {
    pub fn start(version_reply: &'static str, answer: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        let port = listener.local_addr().expect("local addr").port();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept client");
            let mut writer = stream.try_clone().expect("clone stream");
            writer
                .write_all(b"Welcome to the test MUSH\r\n")
                .expect("greet");
            let mut received = Vec::new();
            for line in BufReader::new(stream).lines() {
                let Ok(line) = line else { break };
                let reply = if line == "@version" {
                    Some(format!("{}\r\n", version_reply))
                } else if line.starts_with("think ") {
                    let token = line.split_whitespace().nth(1).unwrap_or("").to_string();
                    Some(format!("{} {} {}\r\n", token, answer, token))
                } else {
                    None
                };
                received.push(line);
                if let Some(reply) = reply {
                    if writer.write_all(reply.as_bytes()).is_err() {
                        break;
                    }
                }
            }
            received
        });
        Self { port, handle }
    }

    pub fn received(self) -> Vec<String> {
        self.handle.join().expect("fake server thread")
    }
}

pub fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf8 path")
}
