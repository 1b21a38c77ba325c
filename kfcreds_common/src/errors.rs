//! Error-reporting helpers for command-line tools.

use std::{backtrace::BacktraceStatus, fmt};

use anyhow::Error;

/// Support for displaying an error with a complete list of causes, and an
/// optional backtrace.
pub trait DisplayCausesExt {
    /// Display the error and its causes, plus a backtrace if one was captured
    /// (see `RUST_BACKTRACE`).
    fn display_causes_and_backtrace(&self) -> DisplayCauses<'_>;

    /// Display the error and its causes.
    fn display_causes(&self) -> DisplayCauses<'_>;
}

impl DisplayCausesExt for Error {
    fn display_causes_and_backtrace(&self) -> DisplayCauses<'_> {
        DisplayCauses {
            err: self,
            show_backtrace: true,
        }
    }

    fn display_causes(&self) -> DisplayCauses<'_> {
        DisplayCauses {
            err: self,
            show_backtrace: false,
        }
    }
}

/// Helper type used to display errors.
pub struct DisplayCauses<'a> {
    err: &'a Error,
    show_backtrace: bool,
}

impl fmt::Display for DisplayCauses<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.err)?;
        for cause in self.err.chain().skip(1) {
            writeln!(f, "  caused by: {}", cause)?;
        }

        let backtrace = self.err.backtrace();
        if self.show_backtrace && backtrace.status() == BacktraceStatus::Captured {
            write!(f, "{}", backtrace)?;
        }
        Ok(())
    }
}

/// Generate a `main` function which calls the specified function. If the
/// function returns `Result::Err(_)`, then `main` will print the error and all
/// its causes, and exit with a non-zero status code.
#[macro_export]
macro_rules! quick_main {
    ($wrapped:ident) => {
        fn main() {
            if let Err(err) = $wrapped() {
                use $crate::errors::DisplayCausesExt;
                eprint!("{}", err.display_causes_and_backtrace());
                ::std::process::exit(1);
            }
        }
    };
}

#[test]
fn display_causes_lists_every_cause() {
    let err = anyhow::format_err!("secret not found").context("could not fetch secret");
    let shown = err.display_causes().to_string();
    assert_eq!(
        shown,
        "ERROR: could not fetch secret\n  caused by: secret not found\n",
    );
}
