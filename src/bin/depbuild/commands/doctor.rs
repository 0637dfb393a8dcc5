//! `depbuild doctor` command

use anyhow::{bail, Result};

use super::Session;
use depbuild::core::platform::Platform;
use depbuild::core::state::Compilers;
use depbuild::ops::{doctor, format_report, DoctorOptions};

pub fn execute(session: &Session<'_>) -> Result<()> {
    let state = if session.state_path.exists() {
        Some(session.load_state()?)
    } else {
        None
    };

    let options = match state {
        Some(state) => DoctorOptions {
            platform: state.platform,
            compilers: state.compilers,
            tools: Some(state.tools),
        },
        None => DoctorOptions {
            platform: Platform::detect()?,
            compilers: session.config.compilers(None, None, Compilers::from_env()),
            tools: None,
        },
    };

    let report = doctor(&options);
    print!("{}", format_report(&report, session.shell.is_verbose()));

    if !report.all_required_passed() {
        bail!(
            "{} required check(s) failed",
            report.required_failed_count()
        );
    }

    Ok(())
}
