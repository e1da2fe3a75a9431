use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn run_podium(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_podium"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("PODIUM_GEMINI_API_KEY")
            .env_remove("PODIUM_BACKEND_URL")
            .output()
            .expect("failed to execute podium binary")
    }

    #[allow(dead_code)]
    pub fn write_video(&self, name: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, b"not really a video").expect("write test video");
        path
    }
}
