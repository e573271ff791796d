use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Some helpers are only exercised by the "e2e" feature, but they stay in the
// module so offline and e2e tests share one harness. The warnings are
// suppressed to keep CI clean either way.
#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
    pub install_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let install_dir = temp_dir.path().join("install");
        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_toolchest"));

        Self {
            temp_dir,
            install_dir,
            bin_path,
        }
    }

    /// A command with HOME and the XDG directories pointed at the temp dir,
    /// so nothing a test does can touch the real user environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("XDG_DATA_HOME", self.temp_dir.path().join("data"));
        cmd.env("XDG_CONFIG_HOME", self.temp_dir.path().join("config"));
        cmd
    }

    pub fn installed_bin(&self, name: &str) -> PathBuf {
        self.install_dir.join("bin").join(name)
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
