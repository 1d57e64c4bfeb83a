//! Command implementations for drift-cli

mod checkout;
mod create;
mod import;
mod status;
mod update;
mod verify;

pub use checkout::run_checkout;
pub use create::run_create;
pub use import::run_import;
pub use status::run_status;
pub use update::run_update;
pub use verify::run_verify;

use drift_core::{Settings, Target};

use crate::cli::TargetArg;

/// Whether a command left outstanding drift behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    Drift,
}

impl RunStatus {
    fn from_clean(clean: bool) -> Self {
        if clean { Self::Clean } else { Self::Drift }
    }
}

/// Expand a target argument into the targets it names
pub fn resolve_targets(settings: &Settings, arg: &TargetArg) -> Vec<Target> {
    match arg {
        TargetArg::All => vec![Target::hss(), Target::imps()],
        TargetArg::Hss => vec![Target::hss()],
        TargetArg::Imps => vec![Target::imps()],
        TargetArg::Cfgset(args) => vec![Target::cfgset(settings, &args.ctype, &args.name)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CfgsetArgs;

    #[test]
    fn all_expands_to_builtin_targets() {
        let names: Vec<String> = resolve_targets(&Settings::default(), &TargetArg::All)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["hss", "imps"]);
    }

    #[test]
    fn cfgset_target_uses_name_and_type() {
        let arg = TargetArg::Cfgset(CfgsetArgs {
            name: "p0".into(),
            ctype: "cle".into(),
        });
        let targets = resolve_targets(&Settings::default(), &arg);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "cfgset p0");
    }

    #[test]
    fn run_status_from_clean() {
        assert_eq!(RunStatus::from_clean(true), RunStatus::Clean);
        assert_eq!(RunStatus::from_clean(false), RunStatus::Drift);
    }
}
