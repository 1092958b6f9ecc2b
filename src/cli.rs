//! CLI argument parsing module for npm-outdated

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse duration string in format: Nms (milliseconds), Ns (seconds), Nm (minutes)
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, "ms")
    } else if let Some(n) = s.strip_suffix('s') {
        (n, "s")
    } else if let Some(n) = s.strip_suffix('m') {
        (n, "m")
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;
    if num == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        _ => num
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration too large: {}", s))?,
    };

    Ok(duration)
}

/// Check installed npm packages against the registry
#[derive(Parser, Debug, Clone)]
#[command(
    name = "npm-outdated",
    version,
    about = "Check installed npm packages against the registry"
)]
pub struct CliArgs {
    /// Only check these packages (default: every declared dependency)
    pub packages: Vec<String>,

    /// Project directory containing package.json
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    // Scope
    /// Check globally installed packages instead of the project
    #[arg(short, long)]
    pub global: bool,

    /// Global install prefix (default: NPM_CONFIG_PREFIX, PREFIX or the platform default)
    #[arg(long, requires = "global")]
    pub prefix: Option<PathBuf>,

    // Output options
    /// Output results in JSON format
    #[arg(long, conflicts_with = "parseable")]
    pub json: bool,

    /// Output results as colon separated lines
    #[arg(short, long)]
    pub parseable: bool,

    /// Show the dependency type and homepage as well
    #[arg(short, long)]
    pub long: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    // Lookup options
    /// Accept cached registry metadata instead of revalidating
    #[arg(long)]
    pub prefer_offline: bool,

    /// Maximum number of concurrent registry lookups
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Time limit for a single registry lookup (e.g., 500ms, 30s, 2m)
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Registry base URL
    #[arg(long, env = "NPM_CONFIG_REGISTRY")]
    pub registry: Option<String>,

    /// Exit with an error if any registry lookup fails
    #[arg(long)]
    pub strict: bool,

    // General options
    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - no progress bar and no warnings
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["npm-outdated"]);
        assert!(args.packages.is_empty());
        assert_eq!(args.dir, PathBuf::from("."));
        assert!(!args.global);
        assert!(args.prefix.is_none());
        assert!(!args.json);
        assert!(!args.parseable);
        assert!(!args.long);
        assert!(!args.no_color);
        assert!(!args.prefer_offline);
        assert_eq!(args.concurrency, 10);
        assert_eq!(args.timeout, Duration::from_secs(30));
        assert!(!args.strict);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_package_filter() {
        let args = CliArgs::parse_from(["npm-outdated", "react", "@types/node"]);
        assert_eq!(args.packages, ["react", "@types/node"]);
    }

    #[test]
    fn test_dir_flag() {
        let args = CliArgs::parse_from(["npm-outdated", "-C", "/some/path"]);
        assert_eq!(args.dir, PathBuf::from("/some/path"));

        let args = CliArgs::parse_from(["npm-outdated", "--dir", "app"]);
        assert_eq!(args.dir, PathBuf::from("app"));
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["npm-outdated", "-g", "--prefix", "/opt/node"]);
        assert!(args.global);
        assert_eq!(args.prefix, Some(PathBuf::from("/opt/node")));
    }

    #[test]
    fn test_prefix_requires_global() {
        let result = CliArgs::try_parse_from(["npm-outdated", "--prefix", "/opt/node"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_flags() {
        let args = CliArgs::parse_from(["npm-outdated", "--json", "--long"]);
        assert!(args.json);
        assert!(args.long);

        let args = CliArgs::parse_from(["npm-outdated", "-p", "-l"]);
        assert!(args.parseable);
        assert!(args.long);
    }

    #[test]
    fn test_json_conflicts_with_parseable() {
        let result = CliArgs::try_parse_from(["npm-outdated", "--json", "--parseable"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_concurrency() {
        let args = CliArgs::parse_from(["npm-outdated", "--concurrency", "4"]);
        assert_eq!(args.concurrency, 4);

        let result = CliArgs::try_parse_from(["npm-outdated", "--concurrency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeout() {
        let args = CliArgs::parse_from(["npm-outdated", "--timeout", "500ms"]);
        assert_eq!(args.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_registry_flag() {
        let args = CliArgs::parse_from(["npm-outdated", "--registry", "https://npm.example.com"]);
        assert_eq!(args.registry.as_deref(), Some("https://npm.example.com"));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("xs").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("5h").is_err());
    }

    #[test]
    fn test_parse_duration_overflow() {
        let err = parse_duration("999999999999999999m").unwrap_err();
        assert!(err.contains("too large"));
        assert!(
            CliArgs::try_parse_from(["npm-outdated", "--timeout", "999999999999999999m"]).is_err()
        );
        assert!(parse_duration("999999999999999999s").is_ok());
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "npm-outdated",
            "--verbose",
            "--strict",
            "--prefer-offline",
            "--no-color",
            "lodash",
        ]);
        assert!(args.verbose);
        assert!(args.strict);
        assert!(args.prefer_offline);
        assert!(args.no_color);
        assert_eq!(args.packages, ["lodash"]);
    }
}
