use crate::core::repository::LocalRepository;
use crate::core::{CommandRunner, CommandSpec, ConfigProvider, Coordinate};
use crate::utils::error::{LayerError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Output;

pub const REPORT_FILE: &str = "build-report.json";

#[cfg(windows)]
const CLASSPATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
const CLASSPATH_SEPARATOR: char = ':';

/// Everything a layer build touches, computed up front without side effects.
#[derive(Debug, Clone)]
pub struct LayerPlan {
    pub coordinate: Coordinate,
    pub library_dir: PathBuf,
    pub jar_path: PathBuf,
    pub pom_source: PathBuf,
    pub pom_target: PathBuf,
    pub output_dir: PathBuf,
    pub image_name: String,
    pub native_image: String,
    maven: String,
    remote_repositories: Vec<String>,
    extra_args: Vec<String>,
}

impl LayerPlan {
    pub fn new<C: ConfigProvider>(
        coordinate: Coordinate,
        native_image: impl Into<String>,
        repository: &LocalRepository,
        work_dir: &Path,
        config: &C,
    ) -> Result<Self> {
        let repository = repository.absolute()?;
        let work_dir = std::path::absolute(work_dir)?;
        let library_dir = repository.artifact_dir(&coordinate);
        Ok(Self {
            jar_path: repository.jar_path(&coordinate),
            pom_source: repository.pom_path(&coordinate),
            pom_target: library_dir.join("pom.xml"),
            output_dir: work_dir.join(coordinate.to_string()),
            image_name: coordinate.file_stem(),
            native_image: native_image.into(),
            maven: config.maven_executable().to_string(),
            remote_repositories: config.remote_repositories().to_vec(),
            extra_args: config.native_image_extra_args().to_vec(),
            library_dir,
            coordinate,
        })
    }

    /// `mvn dependency:get`, pulling the artifact and its transitive dependencies.
    pub fn resolve_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.maven).args([
            "dependency:get".to_string(),
            format!("-Dartifact={}", self.coordinate),
            "-Dtransitive=true".to_string(),
        ]);
        if !self.remote_repositories.is_empty() {
            spec = spec.arg(format!(
                "-DremoteRepositories={}",
                self.remote_repositories.join(",")
            ));
        }
        spec
    }

    /// Prints the dependency classpath of the POM copied into the artifact directory.
    pub fn classpath_command(&self) -> CommandSpec {
        CommandSpec::new(&self.maven)
            .args([
                "-q",
                "exec:exec",
                "-Dexec.executable=echo",
                "-Dexec.args=%classpath",
            ])
            .current_dir(&self.library_dir)
    }

    pub fn compile_command(&self, classpath: &str) -> CommandSpec {
        let jar = self.jar_path.display().to_string();
        let mut full_classpath = jar.clone();
        if !classpath.is_empty() {
            full_classpath.push(CLASSPATH_SEPARATOR);
            full_classpath.push_str(classpath);
        }

        CommandSpec::new(&self.native_image)
            .args([
                "-H:+UnlockExperimentalVMOptions".to_string(),
                "-cp".to_string(),
                full_classpath,
                format!("-H:LayerCreate=layer.nil,package={}", jar),
                "-H:+ReportExceptionStackTraces".to_string(),
                "--no-fallback".to_string(),
                "-o".to_string(),
                self.image_name.clone(),
            ])
            .args(self.extra_args.iter().cloned())
            .current_dir(&self.output_dir)
    }

    /// Human-readable plan for `--dry-run`.
    pub fn describe(&self) -> String {
        let lines = [
            format!("coordinate:   {}", self.coordinate),
            format!("library dir:  {}", self.library_dir.display()),
            format!("jar:          {}", self.jar_path.display()),
            format!(
                "pom:          {} -> {}",
                self.pom_source.display(),
                self.pom_target.display()
            ),
            format!("output dir:   {}", self.output_dir.display()),
            format!("image:        {}", self.image_name),
            format!("1. {}", self.resolve_command()),
            format!("2. {}", self.classpath_command()),
            format!("3. {}", self.compile_command("<classpath>")),
        ];
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub coordinate: String,
    pub image_name: String,
    pub output_dir: PathBuf,
    /// `None` when native-image was terminated by a signal.
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LayerReport {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

pub struct LayerBuilder<R: CommandRunner> {
    runner: R,
    monitor: SystemMonitor,
}

impl<R: CommandRunner> LayerBuilder<R> {
    pub fn new(runner: R) -> Self {
        Self::new_with_monitoring(runner, false)
    }

    pub fn new_with_monitoring(runner: R, monitor_enabled: bool) -> Self {
        Self {
            runner,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn build(&self, plan: &LayerPlan) -> Result<LayerReport> {
        let started_at = Utc::now();
        tracing::info!("🚀 Building layer for {}", plan.coordinate);

        self.resolve(plan).await?;
        self.locate(plan).await?;
        self.prepare_pom(plan).await?;

        tokio::fs::create_dir_all(&plan.output_dir).await?;
        tracing::debug!("Output directory: {}", plan.output_dir.display());

        let classpath = self.classpath(plan).await?;

        let compile = plan.compile_command(&classpath);
        tracing::info!("🔨 Compiling layer {}", plan.image_name);
        tracing::debug!("{}", compile);
        self.monitor.log_stats("Before native-image");
        let status = self.runner.status(&compile).await?;
        self.monitor.log_stats("After native-image");

        let report = LayerReport {
            coordinate: plan.coordinate.to_string(),
            image_name: plan.image_name.clone(),
            output_dir: plan.output_dir.clone(),
            exit_code: status.code(),
            started_at,
            finished_at: Utc::now(),
        };
        let report_path = report.write_to(&plan.output_dir).await?;
        tracing::debug!("Build report written to {}", report_path.display());
        self.monitor.log_final_stats();

        match report.exit_code {
            Some(0) => tracing::info!("✅ Layer {} built", plan.image_name),
            Some(code) => tracing::warn!("native-image exited with code {}", code),
            None => {
                return Err(LayerError::CompilerTerminated {
                    coordinate: plan.coordinate.to_string(),
                })
            }
        }

        Ok(report)
    }

    async fn resolve(&self, plan: &LayerPlan) -> Result<()> {
        tracing::info!("📦 Resolving {}", plan.coordinate);
        let status = self.runner.status(&plan.resolve_command()).await?;
        if !status.success() {
            return Err(LayerError::ResolutionFailed {
                coordinate: plan.coordinate.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    async fn locate(&self, plan: &LayerPlan) -> Result<()> {
        if !tokio::fs::try_exists(&plan.library_dir).await? {
            return Err(LayerError::ArtifactNotFound {
                coordinate: plan.coordinate.to_string(),
                path: plan.library_dir.clone(),
            });
        }
        Ok(())
    }

    async fn prepare_pom(&self, plan: &LayerPlan) -> Result<()> {
        if !tokio::fs::try_exists(&plan.pom_source).await? {
            return Err(LayerError::ArtifactNotFound {
                coordinate: plan.coordinate.to_string(),
                path: plan.pom_source.clone(),
            });
        }
        tokio::fs::copy(&plan.pom_source, &plan.pom_target).await?;
        tracing::debug!(
            "Copied {} to {}",
            plan.pom_source.display(),
            plan.pom_target.display()
        );
        Ok(())
    }

    async fn classpath(&self, plan: &LayerPlan) -> Result<String> {
        tracing::info!("🔗 Computing classpath");
        let output = self.runner.output(&plan.classpath_command()).await?;
        if !output.status.success() {
            return Err(LayerError::ClasspathFailed {
                coordinate: plan.coordinate.to_string(),
                message: failure_message(&output),
            });
        }

        let classpath = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        tracing::debug!("Classpath has {} entries", classpath_entries(&classpath));
        Ok(classpath)
    }
}

fn classpath_entries(classpath: &str) -> usize {
    classpath
        .split(CLASSPATH_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .count()
}

// Maven in quiet mode reports errors on stdout.
fn failure_message(output: &Output) -> String {
    let last_line = |bytes: &[u8]| {
        String::from_utf8_lossy(bytes)
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
    };

    last_line(output.stderr.as_slice())
        .or_else(|| last_line(output.stdout.as_slice()))
        .unwrap_or_else(|| match output.status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerConfig;

    fn plan_with(config: &LayerConfig) -> LayerPlan {
        let coordinate = Coordinate::parse("org.slf4j:slf4j-api:2.0.9").unwrap();
        LayerPlan::new(
            coordinate,
            "/opt/graalvm/bin/native-image",
            &LocalRepository::new("/repo"),
            Path::new("/work"),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_paths() {
        let plan = plan_with(&LayerConfig::default());

        assert_eq!(plan.library_dir, PathBuf::from("/repo/org/slf4j/slf4j-api/2.0.9"));
        assert_eq!(plan.jar_path, PathBuf::from("/repo/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar"));
        assert_eq!(plan.pom_target, PathBuf::from("/repo/org/slf4j/slf4j-api/2.0.9/pom.xml"));
        assert_eq!(plan.output_dir, PathBuf::from("/work/org.slf4j:slf4j-api:2.0.9"));
        assert_eq!(plan.image_name, "slf4j-api-2.0.9");
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_dirs_give_absolute_compile_paths() {
        let coordinate = Coordinate::parse("a:b:1").unwrap();
        let plan = LayerPlan::new(
            coordinate,
            "native-image",
            &LocalRepository::new("m2repo"),
            Path::new("."),
            &LayerConfig::default(),
        )
        .unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert!(plan.output_dir.is_absolute());
        assert_eq!(plan.jar_path, cwd.join("m2repo/a/b/1/b-1.jar"));

        // native-image runs inside output_dir, so its jar arguments must not be relative
        let spec = plan.compile_command("");
        let jar = plan.jar_path.display().to_string();
        assert_eq!(spec.current_dir.as_deref(), Some(plan.output_dir.as_path()));
        assert_eq!(spec.args[2], jar);
        assert_eq!(spec.args[3], format!("-H:LayerCreate=layer.nil,package={}", jar));
    }

    #[test]
    fn test_resolve_command() {
        let plan = plan_with(&LayerConfig::default());
        let spec = plan.resolve_command();

        assert_eq!(spec.program, "mvn");
        assert_eq!(
            spec.args,
            vec![
                "dependency:get",
                "-Dartifact=org.slf4j:slf4j-api:2.0.9",
                "-Dtransitive=true"
            ]
        );
        assert!(spec.current_dir.is_none());
    }

    #[test]
    fn test_resolve_command_with_remote_repositories() {
        let mut config = LayerConfig::default();
        config.maven.remote_repositories = vec![
            "https://repo1.maven.org/maven2".to_string(),
            "https://nexus.local/repo".to_string(),
        ];
        let spec = plan_with(&config).resolve_command();

        assert_eq!(
            spec.args.last().map(String::as_str),
            Some("-DremoteRepositories=https://repo1.maven.org/maven2,https://nexus.local/repo")
        );
    }

    #[test]
    fn test_classpath_command_runs_in_library_dir() {
        let plan = plan_with(&LayerConfig::default());
        let spec = plan.classpath_command();

        assert_eq!(
            spec.args,
            vec!["-q", "exec:exec", "-Dexec.executable=echo", "-Dexec.args=%classpath"]
        );
        assert_eq!(spec.current_dir.as_deref(), Some(plan.library_dir.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_command_flags() {
        let mut config = LayerConfig::default();
        config.native_image.extra_args = vec!["-J-Xmx8g".to_string()];
        let plan = plan_with(&config);
        let jar = "/repo/org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar";

        let spec = plan.compile_command("/repo/a.jar:/repo/b.jar");

        assert_eq!(spec.program, "/opt/graalvm/bin/native-image");
        assert_eq!(
            spec.args,
            vec![
                "-H:+UnlockExperimentalVMOptions".to_string(),
                "-cp".to_string(),
                format!("{}:/repo/a.jar:/repo/b.jar", jar),
                format!("-H:LayerCreate=layer.nil,package={}", jar),
                "-H:+ReportExceptionStackTraces".to_string(),
                "--no-fallback".to_string(),
                "-o".to_string(),
                "slf4j-api-2.0.9".to_string(),
                "-J-Xmx8g".to_string(),
            ]
        );
        assert_eq!(spec.current_dir.as_deref(), Some(plan.output_dir.as_path()));
    }

    #[test]
    fn test_compile_command_with_empty_classpath() {
        let plan = plan_with(&LayerConfig::default());
        let spec = plan.compile_command("");
        assert_eq!(spec.args[2], plan.jar_path.display().to_string());
    }

    #[test]
    fn test_describe_lists_every_step() {
        let description = plan_with(&LayerConfig::default()).describe();
        assert!(description.contains("1. mvn dependency:get"));
        assert!(description.contains("2. (in /repo/org/slf4j/slf4j-api/2.0.9) mvn -q exec:exec"));
        assert!(description.contains("3. (in /work/org.slf4j:slf4j-api:2.0.9) /opt/graalvm/bin/native-image"));
    }

    #[test]
    fn test_classpath_entries() {
        assert_eq!(classpath_entries(""), 0);
        assert_eq!(classpath_entries(&format!("a.jar{}b.jar", CLASSPATH_SEPARATOR)), 2);
    }
}
