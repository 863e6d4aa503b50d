use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use track_recommender::models::{Catalog, Feature, Recommendation, Track};
use track_recommender::progress::{format_elapsed, hide_spinners};
use track_recommender::scoring::DEFAULT_TOP_N;
use track_recommender::session::{Session, SessionError};
use track_recommender::{load_catalog, match_query, rank_recommendations, MatchError};

#[derive(Parser)]
#[command(name = "track-recommender")]
#[command(about = "Find a song you like and get similar tracks from a catalog")]
struct Args {
    /// Catalog CSV (track_name, track_artist, track_popularity, playlist_genre, audio features)
    #[arg(long, env = "TRACK_RECOMMENDER_CATALOG", default_value = "spotifydata.csv")]
    catalog: PathBuf,

    /// Number of recommendations to show
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Run a single query instead of the interactive prompt
    #[arg(long)]
    query: Option<String>,

    /// Accept the matched song without asking (with --query)
    #[arg(long)]
    yes: bool,

    /// Print recommendations as JSON
    #[arg(long)]
    json: bool,

    /// Hide spinners, keep plain log lines
    #[arg(long)]
    log_only: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    song: &'a str,
    artist: &'a str,
    recommendations: &'a [Recommendation],
}

/// Print `msg` and read one line. `None` on EOF.
fn prompt(input: &mut impl BufRead, msg: &str) -> Result<Option<String>> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_recommendations(track: &Track, recs: &[Recommendation], json: bool) -> Result<()> {
    if json {
        let out = JsonOutput {
            song: &track.name,
            artist: &track.artist,
            recommendations: recs,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\nYou picked: {} by {}", track.name, track.artist);
    println!("{:-<96}", "");
    if recs.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }
    println!("{:<3} {:<40} {:<30} {:<12} {:>6}", "#", "Track", "Artist", "Genre", "Score");
    for (i, r) in recs.iter().enumerate() {
        println!(
            "{:<3} {:<40} {:<30} {:<12} {:>6.3}",
            i + 1,
            r.name,
            r.artist,
            r.genre,
            r.score
        );
    }
    println!("{:-<96}", "");
    Ok(())
}

fn recommend(track: &Track, catalog: &Catalog, features: &[Feature], args: &Args) -> Result<()> {
    let start = Instant::now();
    let recs = rank_recommendations(track, catalog, features, args.top_n);
    debug!("Ranked {} tracks in {}", catalog.len(), format_elapsed(start.elapsed()));
    print_recommendations(track, &recs, args.json)
}

fn run_once(query: &str, catalog: &Catalog, features: &[Feature], args: &Args) -> Result<()> {
    let track = match_query(query, catalog)?;

    if !args.yes {
        let question = format!("Did you mean: {} by {}? [y/n] ", track.name, track.artist);
        let answer = prompt(&mut io::stdin().lock(), &question)?;
        if !answer.as_deref().is_some_and(is_yes) {
            eprintln!("Match rejected.");
            return Ok(());
        }
    }

    recommend(track, catalog, features, args)
}

fn run_interactive(catalog: &Catalog, features: &[Feature], args: &Args) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut session = Session::new();

    loop {
        let Some(query) = prompt(&mut input, "\nEnter a song you like (or 'quit'): ")? else {
            break;
        };
        if query.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        let track = match session.search(&query, catalog) {
            Ok(track) => track,
            Err(SessionError::Match(MatchError::EmptyInput)) => {
                println!("Please type a song name.");
                continue;
            }
            Err(SessionError::Match(MatchError::NoMatchFound(_))) => {
                println!("No close matches found. Try another song.");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let question = format!("Did you mean: {} by {}? [y/n] ", track.name, track.artist);
        let Some(answer) = prompt(&mut input, &question)? else {
            break;
        };
        if !is_yes(&answer) {
            session.reject()?;
            println!("OK, search again.");
            continue;
        }

        session.confirm()?;
        if let Some(confirmed) = session.confirmed_track(catalog) {
            recommend(confirmed, catalog, features, args)?;
        }
        session.reset();
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    hide_spinners(args.log_only);

    let start = Instant::now();
    let (catalog, features) = load_catalog(&args.catalog)
        .with_context(|| format!("Failed to load catalog {:?}", args.catalog))?;
    debug!(
        "Loaded {} tracks from {:?} in {}",
        catalog.len(),
        args.catalog,
        format_elapsed(start.elapsed())
    );

    match args.query.as_deref() {
        Some(query) => run_once(query, &catalog, features, &args),
        None => run_interactive(&catalog, features, &args),
    }
}
