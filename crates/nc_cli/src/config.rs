use clap::{Parser, Subcommand};
use nc_scrappers::{CrawlCommands, FetcherKind};
use std::str::FromStr;
use std::time::Duration;

pub const PLACEHOLDER_API_KEY: &str = "your-api-key-secret-placeholder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

const DURATION_TOO_LARGE: &str = "duration too large";

/// Adds `digits` scaled by `unit` seconds to `total`, refusing to overflow.
fn add_scaled(total: u64, digits: &str, unit: u64) -> std::result::Result<u64, String> {
    // Only ascii digits reach here, so a parse failure is an overflow.
    let n: u64 = digits.parse().map_err(|_| DURATION_TOO_LARGE.to_string())?;
    n.checked_mul(unit)
        .and_then(|secs| total.checked_add(secs))
        .ok_or_else(|| DURATION_TOO_LARGE.to_string())
}

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `6h`, `1h15m30s`, `1d` or a bare number of seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = 0u64;
        let mut digits = String::new();
        let mut parts = 0;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if digits.is_empty() {
                return Err(format!("Expected a number before '{}'", c));
            }
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86_400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = add_scaled(total, &digits, unit)?;
            digits.clear();
            parts += 1;
        }

        if !digits.is_empty() {
            total = add_scaled(total, &digits, 1)?;
            parts += 1;
        }
        if parts == 0 {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

/// Every option can also come from the environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(author, version, about = "Crawls a news listing on a schedule and serves the articles", long_about = None)]
pub struct Cli {
    /// Article store: sqlite://path/to.db, sqlite::memory: or memory://
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://articles.db", global = true)]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 1, global = true)]
    pub max_connections: u32,

    /// Shared secret expected in the X-API-Key header
    #[arg(long, env = "API_KEY_SECRET", default_value = PLACEHOLDER_API_KEY, hide_env_values = true, global = true)]
    pub api_key: String,

    /// Listing page to crawl
    #[arg(long, env = "CRAWL_TARGET_URL", default_value = "https://example.com/news", global = true)]
    pub target_url: String,

    /// Time between scheduled crawls (e.g. 6h, 30m, 1h15m30s)
    #[arg(long, env = "CRAWL_INTERVAL", default_value = "6h", global = true)]
    pub interval: HumanDuration,

    /// Fetcher to use: http or fixture
    #[arg(long, env = "CRAWL_FETCHER", default_value = "http", global = true)]
    pub fetcher: FetcherKind,

    #[arg(long, env = "CRAWL_FETCH_TIMEOUT", default_value = "10s", global = true)]
    pub fetch_timeout: HumanDuration,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the API and crawl on the configured interval (default)
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
        bind: String,
    },
    #[command(flatten)]
    Crawl(CrawlCommands),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        let secs = |s: &str| s.parse::<HumanDuration>().unwrap().0.as_secs();
        assert_eq!(secs("6h"), 6 * 3600);
        assert_eq!(secs("30m"), 1800);
        assert_eq!(secs("1h15m30s"), 4530);
        assert_eq!(secs("1d"), 86400);
        assert_eq!(secs("45"), 45);
        assert_eq!(secs("1h 30m"), 5400);
    }

    #[test]
    fn test_human_duration_errors() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("-5s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        let err = "9999999999999999999h".parse::<HumanDuration>().unwrap_err();
        assert_eq!(err, "duration too large");
        assert!("99999999999999999999999s".parse::<HumanDuration>().is_err());
        assert!(format!("{}s1s", u64::MAX).parse::<HumanDuration>().is_err());
        assert_eq!(
            format!("{}s", u64::MAX).parse::<HumanDuration>().unwrap().0.as_secs(),
            u64::MAX
        );
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "newscrawl",
            "--database-url",
            "memory://",
            "--fetcher",
            "fixture",
            "--interval",
            "2h",
            "crawl",
        ])
        .unwrap();
        assert_eq!(cli.database_url, "memory://");
        assert_eq!(cli.fetcher, FetcherKind::Fixture);
        assert_eq!(cli.interval.0, Duration::from_secs(7200));
        assert_eq!(cli.command, Some(Commands::Crawl(CrawlCommands::Crawl)));
    }

    #[test]
    fn test_cli_rejects_unknown_fetcher() {
        assert!(Cli::try_parse_from(["newscrawl", "--fetcher", "rss"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["newscrawl", "list", "--limit", "5", "--database-url", "memory://"]).unwrap();
        assert_eq!(cli.database_url, "memory://");
        assert_eq!(
            cli.command,
            Some(Commands::Crawl(CrawlCommands::List { offset: 0, limit: 5 }))
        );
    }
}
