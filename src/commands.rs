use crate::options::OutputFormat;
use anyhow::{bail, Context, Result};
use gix_protect_paths::config::{self, validate, RuleConfig};
use gix_protect_paths::engine::Evaluator;
use gix_protect_paths::history::GitCli;
use gix_protect_paths::hooks::{Hook, HookDecision, MergeRequest, NoopHook, ProtectPaths};
use gix_protect_paths::permission::{ActingUser, StaticPermissions};
use gix_protect_paths::refs::{parse_pre_receive, ref_updates};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// What all commands share.
pub struct Invocation {
    pub git_dir: PathBuf,
    pub settings: gix_config::File<'static>,
    pub user: Option<String>,
    pub format: OutputFormat,
}

/// Read settings from `config`, or from the repository configuration in `git_dir`.
pub fn load_settings(git_dir: &Path, config: Option<&Path>) -> Result<gix_config::File<'static>> {
    let path = config.map_or_else(|| git_dir.join("config"), Path::to_owned);
    gix_config::File::from_path_no_includes(path.clone(), gix_config::Source::Local)
        .with_context(|| format!("could not read settings from '{}'", path.display()))
}

impl Invocation {
    /// The hook for this repository: inactive if nothing is configured, otherwise checking
    /// protected paths against the repository history.
    fn hook(&self) -> Result<Box<dyn Hook>> {
        if !config::is_configured(&self.settings) {
            gix_trace::debug!("protectPaths is not configured, allowing everything");
            return Ok(Box::new(NoopHook));
        }
        let errors = validate(&self.settings);
        if !errors.is_empty() {
            let errors: Vec<_> = errors.iter().map(ToString::to_string).collect();
            bail!("invalid protectPaths settings:\n{}", errors.join("\n"));
        }
        let rules = RuleConfig::from_store(&self.settings)?;
        let user = self
            .user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|user| !user.trim().is_empty())
            .context("the acting user is unknown, pass --user or set PROTECT_PATHS_USER")?;
        let user = ActingUser::resolve(user, &StaticPermissions::from_store(&self.settings))?;
        let evaluator = Evaluator::new(GitCli::new(self.git_dir.clone()));
        Ok(Box::new(ProtectPaths::new(evaluator, rules, user)))
    }

    pub fn pre_receive(&self, input: &str) -> Result<HookDecision> {
        let updates = ref_updates(&parse_pre_receive(input).context("could not parse pre-receive input")?);
        Ok(self.hook()?.pre_receive(&updates)?)
    }

    pub fn merge_check(&self, request: &MergeRequest) -> Result<HookDecision> {
        Ok(self.hook()?.merge_check(request)?)
    }

    /// Print `decision` and return true if the operation is allowed.
    pub fn report(&self, decision: &HookDecision) -> Result<ExitCode> {
        match self.format {
            OutputFormat::Human => decision.write_report(&mut std::io::stderr().lock())?,
            OutputFormat::Json => {
                let mut out = std::io::stdout().lock();
                serde_json::to_writer_pretty(
                    &mut out,
                    &serde_json::json!({
                        "allowed": decision.allowed,
                        "message": decision.message,
                        "details": decision.details,
                        "violations": decision.violations,
                    }),
                )?;
                writeln!(out)?;
            }
        }
        Ok(ExitCode::from(decision.status()))
    }

    /// Validate the settings and print every problem. Return true if they can be used.
    pub fn check_config(&self) -> Result<bool> {
        let configured = config::is_configured(&self.settings);
        let errors = if configured { validate(&self.settings) } else { Vec::new() };
        match self.format {
            OutputFormat::Human => {
                if !configured {
                    println!("protectPaths is not configured, all pushes and merges are allowed");
                } else if errors.is_empty() {
                    println!("protectPaths settings are valid");
                }
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            OutputFormat::Json => {
                let errors: Vec<_> = errors
                    .iter()
                    .map(|e| serde_json::json!({ "field": e.field, "message": e.message }))
                    .collect();
                let mut out = std::io::stdout().lock();
                serde_json::to_writer_pretty(
                    &mut out,
                    &serde_json::json!({ "configured": configured, "errors": errors }),
                )?;
                writeln!(out)?;
            }
        }
        Ok(errors.is_empty())
    }
}

/// Report an operation that could not be evaluated and is therefore rejected.
///
/// JSON output still gets a decision on stdout, so callers parsing it see the rejection.
pub fn report_error(format: OutputFormat, err: &anyhow::Error) {
    eprintln!("Error: {err:#}");
    if format == OutputFormat::Json {
        let error = serde_json::json!({ "allowed": false, "error": format!("{err:#}") });
        let mut out = std::io::stdout().lock();
        // Nothing is left to report to if stdout is gone.
        serde_json::to_writer_pretty(&mut out, &error).ok();
        writeln!(out).ok();
    }
}
