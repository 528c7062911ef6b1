use anyhow::{bail, Context, Result};
use kicker_feed::config::Config;
use kicker_feed::feed::injuries::ScrapedInjuryFeed;
use kicker_feed::feed::nflverse::NflverseProvider;
use kicker_feed::feed::ownership::ScrapedOwnershipFeed;
use kicker_feed::feed::weather::OpenMeteo;
use kicker_feed::history::JsonFileHistory;
use kicker_feed::pipeline::{self, Feeds};
use kicker_feed::season;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
struct Args {
    config: PathBuf,
    week: Option<u32>,
    dry_run: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args { config: PathBuf::from("config.toml"), week: None, dry_run: false };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config = args.next().context("--config needs a path")?.into();
            }
            "--week" => {
                let raw = args.next().context("--week needs a number")?;
                parsed.week = Some(raw.parse().with_context(|| format!("invalid week: {}", raw))?);
            }
            "--dry-run" => parsed.dry_run = true,
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config)?;
    let now = season::eastern_now();
    let week = season::target_week(
        now.date(),
        config.season.start_date,
        args.week.or(config.season.force_week),
    );

    let stats = NflverseProvider::new(&config.provider)?;
    let injuries = ScrapedInjuryFeed::new(&config.scrape.injuries_url, config.scrape.injuries_timeout_ms)?;
    let ownership = ScrapedOwnershipFeed::new(&config.scrape.ownership_url, config.scrape.ownership_timeout_ms)?;
    let weather = OpenMeteo::new(&config.weather)?;
    let feeds = Feeds { stats: &stats, injuries: &injuries, ownership: &ownership, weather: &weather };
    let store = JsonFileHistory::new(&config.output.history_path);
    let mut rng = StdRng::from_entropy();

    let output = pipeline::run(&config, &feeds, &store, week, now, &mut rng).await?;
    if args.dry_run {
        tracing::info!(
            week,
            rankings = output.document.rankings.len(),
            "dry run, nothing written"
        );
        return Ok(());
    }
    pipeline::publish(&config, &output, &store)
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kicker_feed=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match parse_args(std::env::args().skip(1)) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "run failed");
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let a = args(&[]).unwrap();
        assert_eq!(a, Args { config: PathBuf::from("config.toml"), week: None, dry_run: false });
    }

    #[test]
    fn test_all_flags() {
        let a = args(&["--week", "9", "--config", "alt.toml", "--dry-run"]).unwrap();
        assert_eq!(a.week, Some(9));
        assert_eq!(a.config, PathBuf::from("alt.toml"));
        assert!(a.dry_run);
    }

    #[test]
    fn test_bad_input() {
        assert!(args(&["--week"]).is_err());
        assert!(args(&["--week", "nine"]).is_err());
        assert!(args(&["--verbose"]).is_err());
    }
}
