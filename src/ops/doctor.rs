//! Host environment checks.
//!
//! The pipeline shells out to a handful of host tools. `depbuild doctor`
//! reports which of them can be found before a long build trips over a
//! missing one.
//!
//! ## Checks Performed
//!
//! - Archive extractors (`tar`, `7z`)
//! - Make program (`make`, `nmake` on Windows)
//! - The configured C and C++ compilers
//! - Provisioned CMake and Ninja, when a state file exists

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::platform::Platform;
use crate::core::state::{Compilers, ToolPaths};
use crate::util::process::find_executable;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if found)
    pub path: Option<PathBuf>,

    /// How long the check took
    pub duration: Duration,

    /// Whether a failure blocks a full build
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Whether every required check passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// What to check against.
#[derive(Debug, Clone)]
pub struct DoctorOptions {
    pub platform: Platform,
    pub compilers: Compilers,
    /// Tool paths from an existing state file
    pub tools: Option<ToolPaths>,
}

/// Run all checks, looking executables up on `PATH`.
pub fn doctor(options: &DoctorOptions) -> DoctorReport {
    doctor_with(options, &find_executable)
}

/// Run all checks with a custom executable lookup.
pub fn doctor_with(options: &DoctorOptions, lookup: &dyn Fn(&str) -> Option<PathBuf>) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report.add(check_executable("tar", "tar", "needed for .tar.* archives", lookup));
    report.add(check_executable("7z", "7z", "needed for .zip archives", lookup));

    let make = options.platform.make_program();
    report.add(check_executable("Make", make, "needed by cyrus-sasl and qt5base", lookup));

    report.add(check_executable("C Compiler", &options.compilers.cc, "set CC or --cc", lookup));
    report.add(check_executable("C++ Compiler", &options.compilers.cxx, "set CXX or --cxx", lookup));

    match &options.tools {
        Some(tools) => {
            report.add(check_provisioned("CMake", tools.cmake.as_deref()));
            report.add(check_provisioned("Ninja", tools.ninja.as_deref()));
        }
        None => report.add(
            CheckResult::fail("Build Tools", "no builder state found, run `depbuild init`").optional(),
        ),
    }

    report.total_duration = start.elapsed();
    report
}

fn check_executable(
    name: &str,
    program: &str,
    hint: &str,
    lookup: &dyn Fn(&str) -> Option<PathBuf>,
) -> CheckResult {
    let start = Instant::now();

    let found = if Path::new(program).is_absolute() {
        Some(PathBuf::from(program)).filter(|p| p.exists())
    } else {
        lookup(program)
    };

    match found {
        Some(path) => CheckResult::pass(name, format!("found {}", program))
            .with_path(path)
            .with_duration(start.elapsed()),
        None => CheckResult::fail(name, format!("{} not found ({})", program, hint))
            .with_duration(start.elapsed()),
    }
}

fn check_provisioned(name: &str, path: Option<&Path>) -> CheckResult {
    match path {
        Some(path) if path.exists() => {
            CheckResult::pass(name, "provisioned").with_path(path.to_path_buf())
        }
        Some(path) => CheckResult::fail(
            name,
            format!("recorded at {} but the file is missing", path.display()),
        ),
        None => CheckResult::fail(
            name,
            format!("not provisioned, run `depbuild tool {}`", name.to_lowercase()),
        ),
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        let _ = writeln!(output, "  {} {}{}: {}", status, check.name, required, check.message);

        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "       path: {}", path.display());
            }
            let _ = writeln!(output, "       took: {:?}", check.duration);
        }
    }

    let _ = writeln!(output);
    let _ = write!(
        output,
        "{}/{} checks passed",
        report.passed_count(),
        report.checks.len()
    );
    if report.required_failed_count() > 0 {
        let _ = write!(output, ", {} required failed", report.required_failed_count());
    }
    output.push('\n');

    output
}
