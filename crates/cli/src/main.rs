use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storesweep_core::config::{AssessConfig, ProfileSetting};
use storesweep_core::report::{
    format_bytes, write_accounts_csv, write_findings_csv, AssessmentReport,
};
use storesweep_core::types::Severity;
use storesweep_core::{assess_dir, AssessOptions};

#[derive(Parser, Debug)]
#[command(
    name = "storesweep",
    version,
    about = "Storage fleet assessment: cost, security and governance posture"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Assess {
        /// Inventory export directory produced by the upstream collector
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "storesweep-out")]
        out: PathBuf,

        #[arg(long, default_value = "all")]
        output_format: OutputFormat,

        /// Skip metrics-derived checks and widen the worker pool
        #[arg(long)]
        quick: bool,

        /// Override the configured worker pool size
        #[arg(long)]
        workers: Option<usize>,

        /// Override the configured cost workload profile
        #[arg(long)]
        profile: Option<ProfileArg>,

        /// Fail on the first malformed inventory export instead of skipping it
        #[arg(long)]
        strict: bool,

        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Markdown,
    All,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ProfileArg {
    Auto,
    Light,
    Moderate,
    Heavy,
}

impl From<ProfileArg> for ProfileSetting {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Auto => ProfileSetting::Auto,
            ProfileArg::Light => ProfileSetting::Light,
            ProfileArg::Moderate => ProfileSetting::Moderate,
            ProfileArg::Heavy => ProfileSetting::Heavy,
        }
    }
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    orange: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    orange: "\x1b[38;5;208m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    orange: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let res = match cli.cmd {
        Commands::Assess {
            input,
            config,
            out,
            output_format,
            quick,
            workers,
            profile,
            strict,
            verbose,
        } => {
            init_tracing(verbose);
            let mut cfg = load_config(config.as_deref());
            if quick {
                cfg.apply_quick_mode();
            }
            if let Some(workers) = workers {
                cfg.max_workers = workers;
            }
            if let Some(profile) = profile {
                cfg.workload_profile = profile.into();
            }
            run_assess(&input, cfg, strict, &out, &output_format)
        }
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}store{reset}{orange}|{reset}{dim}sweep{reset}  {dim}storage fleet assessment{reset}\n",
        bold = s.bold,
        orange = s.orange,
        dim = s.dim,
        reset = s.reset,
    );
}

fn severity_color(severity: Severity) -> &'static str {
    let s = style();
    match severity {
        Severity::Critical | Severity::High => s.red,
        Severity::Medium => s.yellow,
        Severity::Low | Severity::Info => s.dim,
    }
}

fn score_color(score: f64) -> &'static str {
    let s = style();
    if score >= 80.0 {
        s.green
    } else if score >= 50.0 {
        s.yellow
    } else {
        s.red
    }
}

fn load_config(path: Option<&Path>) -> AssessConfig {
    match path {
        Some(p) => AssessConfig::load(p).unwrap_or_else(|e| {
            eprintln!(
                "{}{}warning:{} failed to load config {}: {}",
                style().bold,
                style().yellow,
                style().reset,
                p.display(),
                e
            );
            AssessConfig::default()
        }),
        None => AssessConfig::discover().unwrap_or_default(),
    }
}

fn print_summary(report: &AssessmentReport, out: &Path) {
    let s = style();
    let stats = &report.summary.statistics;
    let findings = &report.summary.findings_statistics;

    eprintln!(
        "  {dim}storage accounts  {reset}{bold}{}{reset}",
        stats.total_storage_accounts,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}total capacity    {reset}{bold}{}{reset}",
        format_bytes(stats.total_capacity_bytes),
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}monthly cost      {reset}{bold}${:.2}{reset}",
        stats.total_monthly_cost,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    eprintln!(
        "  {dim}monthly savings   {reset}{bold}${:.2}{reset}",
        stats.total_monthly_savings,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    let sc = score_color(stats.average_security_score);
    eprintln!(
        "  {dim}security score    {reset}{sc}{bold}{:.1}{reset}",
        stats.average_security_score,
        dim = s.dim,
        sc = sc,
        bold = s.bold,
        reset = s.reset
    );

    if findings.total > 0 {
        eprintln!();
        for (severity, count) in [
            (Severity::Critical, findings.critical),
            (Severity::High, findings.high),
            (Severity::Medium, findings.medium),
            (Severity::Low, findings.low),
            (Severity::Info, findings.info),
        ] {
            if count > 0 {
                eprintln!(
                    "  {sc}{:<8}{reset} {}",
                    severity.as_str(),
                    count,
                    sc = severity_color(severity),
                    reset = s.reset
                );
            }
        }
    }

    if !report.failures.is_empty() {
        eprintln!();
        for failure in &report.failures {
            eprintln!(
                "  {red}failed{reset}  {}: {}",
                failure.account,
                failure.error,
                red = s.red,
                reset = s.reset
            );
        }
    }

    eprintln!();
    eprintln!(
        "  {dim}\u{2192} {}{reset}",
        out.display(),
        dim = s.dim,
        reset = s.reset
    );
    eprintln!();
}

fn write_outputs(
    report: &AssessmentReport,
    out: &Path,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("create out dir {}", out.display()))?;

    let write_json = matches!(output_format, OutputFormat::Json | OutputFormat::All);
    let write_markdown = matches!(output_format, OutputFormat::Markdown | OutputFormat::All);
    let write_csv = matches!(output_format, OutputFormat::Csv | OutputFormat::All);

    if write_json {
        let json_path = out.join("report.json");
        let json = serde_json::to_vec_pretty(report).context("serialize report json")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("write {}", json_path.display()))?;
    }

    if write_markdown {
        let md_path = out.join("summary.md");
        std::fs::write(&md_path, report.to_markdown())
            .with_context(|| format!("write {}", md_path.display()))?;
    }

    if write_csv {
        // CSV output is a degraded-mode concern: if it fails, the other
        // formats are still useful, so warn and continue.
        if let Err(e) = write_csv_outputs(report, out) {
            tracing::warn!(error = %format!("{e:#}"), "skipping CSV output");
            eprintln!(
                "{}{}warning:{} skipping CSV output: {:#}",
                style().bold,
                style().yellow,
                style().reset,
                e
            );
        }
    }

    Ok(())
}

fn write_csv_outputs(report: &AssessmentReport, out: &Path) -> anyhow::Result<()> {
    let accounts_path = out.join("accounts.csv");
    let accounts_file = std::fs::File::create(&accounts_path)
        .with_context(|| format!("create {}", accounts_path.display()))?;
    write_accounts_csv(accounts_file, &report.accounts)?;

    let findings_path = out.join("findings.csv");
    let findings_file = std::fs::File::create(&findings_path)
        .with_context(|| format!("create {}", findings_path.display()))?;
    write_findings_csv(findings_file, &report.accounts)?;

    Ok(())
}

fn run_assess(
    input: &Path,
    config: AssessConfig,
    strict: bool,
    out: &Path,
    output_format: &OutputFormat,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    print_banner();

    let opts = AssessOptions {
        config,
        strict,
        cancel: None,
    };

    let report = assess_dir(input, &opts)?;

    write_outputs(&report, out, output_format)?;

    // Machine-parseable line on stdout
    println!(
        "accounts={} failed={} findings={} monthly_cost={:.2} monthly_savings={:.2}",
        report.accounts.len(),
        report.failures.len(),
        report.summary.findings_statistics.total,
        report.summary.statistics.total_monthly_cost,
        report.summary.statistics.total_monthly_savings
    );

    // Human-readable output on stderr
    print_summary(&report, out);

    let exit = if !report.failures.is_empty() {
        eprintln!(
            "  {yellow}{bold}PARTIAL{reset}  {dim}({} of {} account(s) failed){reset}",
            report.failures.len(),
            report.accounts.len() + report.failures.len(),
            yellow = s.yellow,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        std::process::ExitCode::from(2)
    } else {
        if report.accounts.is_empty() {
            eprintln!(
                "  {yellow}{bold}NO ACCOUNTS FOUND{reset}",
                yellow = s.yellow,
                bold = s.bold,
                reset = s.reset
            );
        } else {
            eprintln!(
                "  {green}{bold}OK{reset}",
                green = s.green,
                bold = s.bold,
                reset = s.reset
            );
        }
        std::process::ExitCode::from(0)
    };

    eprintln!();

    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn severity_colors_group_by_urgency() {
        assert_eq!(severity_color(Severity::Critical), style().red);
        assert_eq!(severity_color(Severity::High), style().red);
        assert_eq!(severity_color(Severity::Medium), style().yellow);
        assert_eq!(severity_color(Severity::Low), style().dim);
    }

    #[test]
    fn score_color_thresholds() {
        assert_eq!(score_color(95.0), style().green);
        assert_eq!(score_color(60.0), style().yellow);
        assert_eq!(score_color(20.0), style().red);
    }

    #[test]
    #[serial]
    fn style_respects_no_color() {
        std::env::set_var("NO_COLOR", "1");
        assert_eq!(style().bold, "");
        std::env::remove_var("NO_COLOR");
        assert_ne!(style().bold, "");
    }

    #[test]
    fn profile_arg_maps_onto_config_setting() {
        assert_eq!(ProfileSetting::from(ProfileArg::Auto), ProfileSetting::Auto);
        assert_eq!(
            ProfileSetting::from(ProfileArg::Heavy),
            ProfileSetting::Heavy
        );
    }

    #[test]
    fn missing_config_path_falls_back_to_defaults() {
        let cfg = load_config(Some(Path::new("does-not-exist.toml")));
        assert_eq!(cfg.max_workers, AssessConfig::default().max_workers);
    }
}
