//! Launch outcome reporting.

use std::fmt;
use std::io::Write;
use std::process::ExitCode;

use crate::LaunchError;

/// Stages of one launch, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaunchState {
    /// Root archive opened.
    Created,
    /// Root entries classified and nested archives opened.
    ArchivesEnumerated,
    /// Nested loader constructed.
    LoaderBuilt,
    /// Entry point resolved and called.
    EntryPointInvoked,
    /// Entry point returned normally.
    Completed,
    /// The launch failed.
    Failed,
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::ArchivesEnumerated => "archives enumerated",
            Self::LoaderBuilt => "loader built",
            Self::EntryPointInvoked => "entry point invoked",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal value of one launch attempt.
#[derive(Debug)]
pub struct LaunchResult {
    /// Process exit status to report.
    pub exit_code: i32,

    /// Why the launch failed, if it did.
    pub failure: Option<LaunchError>,

    /// Last stage reached before the launch ended.
    pub reached: LaunchState,
}

impl LaunchResult {
    /// A launch whose entry point returned `exit_code`.
    #[must_use]
    pub const fn completed(exit_code: i32) -> Self {
        Self {
            exit_code,
            failure: None,
            reached: LaunchState::EntryPointInvoked,
        }
    }

    /// A launch that failed after reaching `reached`.
    #[must_use]
    pub const fn failed(failure: LaunchError, reached: LaunchState, exit_code: i32) -> Self {
        Self {
            exit_code,
            failure: Some(failure),
            reached,
        }
    }

    /// Terminal state: [`LaunchState::Completed`] or [`LaunchState::Failed`].
    #[must_use]
    pub const fn state(&self) -> LaunchState {
        if self.failure.is_some() {
            LaunchState::Failed
        } else {
            LaunchState::Completed
        }
    }

    /// Returns `true` if the entry point returned normally.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.failure.is_none()
    }

    /// Writes the failure's cause chain, outermost first. Writes nothing for
    /// a completed launch.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let Some(failure) = &self.failure else {
            return Ok(());
        };
        let mut causes = failure.chain().into_iter();
        if let Some(outermost) = causes.next() {
            writeln!(out, "error: {outermost}")?;
        }
        for cause in causes {
            writeln!(out, "  caused by: {cause}")?;
        }
        writeln!(out, "  launch stopped after: {}", self.reached)?;
        Ok(())
    }

    /// Exit status truncated to the low 8 bits, the way the operating system
    /// reports it. A failed launch never reports 0, even when its code is a
    /// multiple of 256.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        let status = u8::try_from(self.exit_code.rem_euclid(256)).unwrap_or(1);
        if status == 0 && self.failure.is_some() {
            1
        } else {
            status
        }
    }

    /// Process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_completed() {
        let result = LaunchResult::completed(0);
        assert!(result.is_completed());
        assert_eq!(result.state(), LaunchState::Completed);

        let mut out = Vec::new();
        result.report(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_failed_report_chain() {
        let result = LaunchResult::failed(
            LaunchError::EntryPointFailure {
                entry_point: "com.example.App".into(),
                source: Box::new(std::io::Error::other("port 8080 in use")),
            },
            LaunchState::EntryPointInvoked,
            1,
        );
        assert_eq!(result.state(), LaunchState::Failed);

        let mut out = Vec::new();
        result.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "error: entry point 'com.example.App' failed");
        assert_eq!(lines[1], "  caused by: port 8080 in use");
        assert!(lines[2].contains("entry point invoked"));
    }

    #[test]
    fn test_state_order() {
        assert!(LaunchState::Created < LaunchState::ArchivesEnumerated);
        assert!(LaunchState::ArchivesEnumerated < LaunchState::LoaderBuilt);
        assert!(LaunchState::LoaderBuilt < LaunchState::EntryPointInvoked);
    }

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(LaunchResult::completed(0).exit_status(), 0);
        assert_eq!(LaunchResult::completed(3).exit_status(), 3);
        assert_eq!(LaunchResult::completed(-1).exit_status(), 255);
        assert_eq!(LaunchResult::completed(256).exit_status(), 0);
    }

    #[test]
    fn test_failed_exit_status_is_never_zero() {
        for code in [0, 256, -256, 512] {
            let result = LaunchResult::failed(
                LaunchError::MissingMetadata("no Start-Class".to_string()),
                LaunchState::Created,
                code,
            );
            assert_eq!(result.exit_status(), 1, "failure_exit_code {code}");
        }

        let result = LaunchResult::failed(
            LaunchError::MissingMetadata("no Start-Class".to_string()),
            LaunchState::Created,
            70,
        );
        assert_eq!(result.exit_status(), 70);
    }
}
