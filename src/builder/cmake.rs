//! CMake build driver (Ninja generator).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::dirs::allocate_dir;
use crate::builder::BuildRequest;
use crate::core::error::DirKind;
use crate::core::state::OrchestratorState;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

/// A configured CMake invocation over one source tree.
pub struct CMakeBuilder<'a> {
    cmake: &'a Path,
    ninja: &'a Path,
    source_dir: PathBuf,
    build_dir: PathBuf,
    prefix_dir: PathBuf,
    build_type: String,
    cc: &'a str,
    cxx: &'a str,
    defines: Vec<(String, String)>,
}

impl<'a> CMakeBuilder<'a> {
    /// Create a builder for already allocated directories.
    pub fn new(
        state: &'a OrchestratorState,
        source_dir: PathBuf,
        build_dir: PathBuf,
        prefix_dir: PathBuf,
    ) -> Result<Self> {
        Ok(CMakeBuilder {
            cmake: state.tools.cmake()?,
            ninja: state.tools.ninja()?,
            source_dir,
            build_dir,
            prefix_dir,
            build_type: "Release".to_string(),
            cc: &state.compilers.cc,
            cxx: &state.compilers.cxx,
            defines: Vec::new(),
        })
    }

    /// Set `CMAKE_BUILD_TYPE`.
    pub fn build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    /// Add `-D<key>=<value>` cache entries.
    pub fn defines<I, K, V>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defines
            .extend(defines.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The configure command.
    pub fn configure_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(self.cmake)
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .args(["-G", "Ninja"])
            .arg(format!("-DCMAKE_MAKE_PROGRAM={}", self.ninja.display()))
            .arg(format!("-DCMAKE_INSTALL_PREFIX={}", self.prefix_dir.display()))
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type))
            .arg(format!("-DCMAKE_C_COMPILER={}", self.cc))
            .arg(format!("-DCMAKE_CXX_COMPILER={}", self.cxx));

        for (key, value) in &self.defines {
            cmd = cmd.arg(format!("-D{}={}", key, value));
        }

        cmd
    }

    /// `cmake --build <build> --target <target>`.
    pub fn target_command(&self, target: &str) -> ProcessBuilder {
        ProcessBuilder::new(self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .args(["--target", target])
    }

    /// Configure, build and install.
    pub fn run(&self, ctx: &BuildContext<'_>) -> Result<()> {
        let name = display_name(&self.source_dir);

        ctx.shell.status(Status::Configuring, &name);
        ctx.runner
            .run(&self.configure_command())
            .with_context(|| format!("CMake configuration of {} failed", name))?;

        ctx.shell.status(Status::Building, &name);
        ctx.runner
            .run(&self.target_command("all"))
            .with_context(|| format!("CMake build of {} failed", name))?;

        ctx.runner
            .run(&self.target_command("install"))
            .with_context(|| format!("CMake install of {} failed", name))?;

        Ok(())
    }
}

/// Build and install a CMake project, returning its prefix.
pub fn build(
    ctx: &BuildContext<'_>,
    state: &OrchestratorState,
    request: &BuildRequest,
    defines: &[(String, String)],
) -> Result<PathBuf> {
    state.tools.ensure_provisioned()?;

    let source_dir = ctx.resolve(&request.source_dir);
    let prefix = allocate_dir(&ctx.work_dir, request.prefix_dir.as_deref(), &source_dir, DirKind::Prefix)?;
    let build_dir = allocate_dir(&ctx.work_dir, request.build_dir.as_deref(), &source_dir, DirKind::Build)?;

    CMakeBuilder::new(state, source_dir, build_dir, prefix.clone())?
        .build_type(request.variant.to_string())
        .defines(defines.iter().cloned())
        .run(ctx)?;

    Ok(prefix)
}

fn display_name(source_dir: &Path) -> String {
    source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildVariant;
    use crate::core::error::BuildError;
    use crate::test_support::{provisioned_state, TestEnv};

    #[test]
    fn test_runs_configure_build_install() {
        let env = TestEnv::new();
        let src = env.unpack("yaml-cpp-yaml-cpp-0.6.3");
        let ctx = env.context();
        let state = provisioned_state(&env.work_dir());

        let request = BuildRequest::new("yaml-cpp-yaml-cpp-0.6.3");
        let defines = vec![("YAML_BUILD_SHARED_LIBS".to_string(), "ON".to_string())];
        let prefix = build(&ctx, &state, &request, &defines).unwrap();

        assert_eq!(prefix, src.join("prefix"));
        assert!(prefix.is_dir());
        assert!(src.join("build").is_dir());

        let cmake = state.tools.cmake.clone().unwrap();
        let ninja = state.tools.ninja.clone().unwrap();
        let build_dir = src.join("build");
        assert_eq!(
            env.runner.commands(),
            vec![
                format!(
                    "{} -S {} -B {} -G Ninja -DCMAKE_MAKE_PROGRAM={} -DCMAKE_INSTALL_PREFIX={} \
                     -DCMAKE_BUILD_TYPE=Release -DCMAKE_C_COMPILER=gcc -DCMAKE_CXX_COMPILER=g++ \
                     -DYAML_BUILD_SHARED_LIBS=ON",
                    cmake.display(),
                    src.display(),
                    build_dir.display(),
                    ninja.display(),
                    prefix.display()
                ),
                format!("{} --build {} --target all", cmake.display(), build_dir.display()),
                format!("{} --build {} --target install", cmake.display(), build_dir.display()),
            ]
        );
    }

    #[test]
    fn test_variant_and_explicit_dirs() {
        let env = TestEnv::new();
        env.unpack("date-3.0.0");
        let ctx = env.context();
        let state = provisioned_state(&env.work_dir());

        let request = BuildRequest {
            prefix_dir: Some(PathBuf::from("install/date")),
            build_dir: Some(PathBuf::from("scratch/date")),
            variant: BuildVariant::Debug,
            ..BuildRequest::new("date-3.0.0")
        };
        let prefix = build(&ctx, &state, &request, &[]).unwrap();

        assert_eq!(prefix, env.work_dir().join("install/date"));
        assert!(env.work_dir().join("scratch/date").is_dir());
        assert!(env.runner.commands()[0].contains("-DCMAKE_BUILD_TYPE=Debug"));
    }

    #[test]
    fn test_failed_step_stops_the_sequence() {
        let env = TestEnv::new();
        env.runner.fail_on("--target all", 1);
        env.unpack("Catch2-2.13.4");
        let ctx = env.context();
        let state = provisioned_state(&env.work_dir());

        let err = build(&ctx, &state, &BuildRequest::new("Catch2-2.13.4"), &[]).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::CommandFailed { code: Some(1), .. })
        ));
        assert_eq!(env.runner.commands().len(), 2);
    }

    #[test]
    fn test_requires_tools() {
        let env = TestEnv::new();
        let ctx = env.context();
        let mut state = provisioned_state(&env.work_dir());
        state.tools.ninja = None;

        let err = build(&ctx, &state, &BuildRequest::new("date-3.0.0"), &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::ToolsNotProvisioned { .. })
        ));
        assert!(!env.work_dir().join("date-3.0.0").exists());
    }

    #[test]
    fn test_missing_source_runs_nothing() {
        let env = TestEnv::new();
        let ctx = env.context();
        let state = provisioned_state(&env.work_dir());

        let err = build(&ctx, &state, &BuildRequest::new("date-3.0.0"), &[]).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::SourceDirMissing { .. })
        ));
        assert!(env.runner.commands().is_empty());
        assert!(!env.work_dir().join("date-3.0.0").exists());
    }
}
