mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use keyword_monetizer::config::{split_list, AppConfig};
use keyword_monetizer::metrics::{AdMetricsSource, SearchAdClient};
use keyword_monetizer::monetization::{click_value_rows, total_revenue, Monetizer};
use keyword_monetizer::outline::build_outline;
use keyword_monetizer::snapshots::{track_provider_trends, SnapshotStore};
use keyword_monetizer::suggest::{build_providers, collect_longtail, DEFAULT_MODIFIERS};
use keyword_monetizer::{
    compute_trends, format_float, format_number, format_optional, title_metas, AnalysisReport,
    AnalysisRequest, Analyzer, EnrichmentSources, TrendDelta,
};

#[derive(Parser)]
#[command(name = "keyword-monetizer", about = "Keyword research and blog monetization estimator")]
struct Cli {
    /// Config file (defaults to KEYWORD_CONFIG_PATH or config/keywords.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect, score and (optionally) enrich keyword candidates.
    Analyze(AnalyzeArgs),
    /// Estimate display and affiliate revenue for enriched candidates.
    Monetize(MonetizeArgs),
    /// SearchAd related keywords ranked by click value.
    Related(RelatedArgs),
    /// Long-tail autocomplete across seed + modifier prompts.
    Longtail(LongtailArgs),
    /// Diff suggestion snapshots per provider.
    Trends(TrendsArgs),
    /// Print a blog post outline for a keyword.
    Outline(OutlineArgs),
    /// Config file helpers.
    Config(ConfigArgs),
    /// Serve the JSON API.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct CollectArgs {
    /// Seed keyword; repeat for several. Reads one per line from stdin when omitted.
    #[arg(long = "seed")]
    seeds: Vec<String>,
    /// Comma-separated providers (naver, google).
    #[arg(long)]
    providers: Option<String>,
    #[arg(long)]
    depth: Option<u8>,
    /// Expansion profile (travel, food).
    #[arg(long)]
    profile: Option<String>,
    #[arg(long)]
    include_suffixes: bool,
    #[arg(long, default_value_t = 0)]
    max_candidates: usize,
    #[arg(long)]
    enrich_limit: Option<usize>,
    #[arg(long, default_value_t = 30)]
    top: usize,
    /// Print JSON records instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    collect: CollectArgs,
    /// Enrich candidates with SearchAd / search index metrics.
    #[arg(long)]
    enrich: bool,
}

#[derive(Args, Debug, Clone)]
struct MonetizeArgs {
    #[command(flatten)]
    collect: CollectArgs,
    #[arg(long)]
    capture_pct: Option<f64>,
    #[arg(long)]
    pv_per_visit: Option<f64>,
    #[arg(long)]
    ecpm: Option<f64>,
    #[arg(long)]
    aff_cvr_pct: Option<f64>,
    #[arg(long)]
    aff_commission: Option<f64>,
    #[arg(long)]
    min_monthly: Option<u64>,
    /// Comma-separated tokens; keywords containing any are dropped.
    #[arg(long)]
    exclude: Option<String>,
    /// Also print a suggested post title and meta description per row.
    #[arg(long)]
    titles: bool,
}

#[derive(Args, Debug, Clone)]
struct RelatedArgs {
    #[arg(long)]
    seed: String,
    #[arg(long, default_value_t = 200)]
    max_rows: usize,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct LongtailArgs {
    #[arg(long)]
    seed: String,
    /// Comma-separated modifiers appended to the seed, one prompt each.
    #[arg(long)]
    modifiers: Option<String>,
    /// Comma-separated providers (naver, google).
    #[arg(long)]
    providers: Option<String>,
    #[arg(long, default_value_t = 1)]
    min_hits: u32,
    #[arg(long, default_value_t = 200)]
    max_items: usize,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct TrendsArgs {
    /// Seeds to collect now and compare with the last stored snapshot.
    #[arg(long = "seed")]
    seeds: Vec<String>,
    #[arg(long, default_value = "data/snapshots.json")]
    store: PathBuf,
    /// Offline mode: previous snapshot, one keyword per line.
    #[arg(long, requires = "curr")]
    prev: Option<PathBuf>,
    /// Offline mode: current snapshot, one keyword per line.
    #[arg(long, requires = "prev")]
    curr: Option<PathBuf>,
    /// Comma-separated hot terms replacing the default vocabulary.
    #[arg(long)]
    hot_terms: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct OutlineArgs {
    #[arg(long)]
    keyword: String,
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Write the default configuration.
    Init {
        #[arg(long, default_value = "config/keywords.toml")]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    /// Optional directory of static files served at `/`.
    #[arg(long)]
    web_root: Option<String>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = AppConfig::load(cli.config)?;
    init_tracing(&config);

    match cli.command {
        Command::Analyze(args) => run_analyze(args, config).await,
        Command::Monetize(args) => run_monetize(args, config).await,
        Command::Related(args) => run_related(args, config).await,
        Command::Longtail(args) => run_longtail(args, config).await,
        Command::Trends(args) => run_trends(args, config).await,
        Command::Outline(args) => run_outline(args),
        Command::Config(args) => run_config(args, &config),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

async fn run_analyze(args: AnalyzeArgs, config: AppConfig) -> Result<(), String> {
    let analyzer = build_analyzer(&args.collect, &config, None)?;
    let request = build_request(&args.collect, &config, args.enrich)?;
    let report = analyzer.run(&request).await?;

    if args.collect.json {
        let records: Vec<_> = report
            .scores
            .iter()
            .take(args.collect.top)
            .map(|score| score.to_record())
            .collect();
        return print_json(&records);
    }

    print_warnings(&report);
    println!(
        "Scoring mode: {} | candidates {}",
        report.scoring_mode.label(),
        report.candidates.len()
    );
    for (rank, score) in report.scores.iter().take(args.collect.top).enumerate() {
        let mut line = format!(
            "{:>3}. {} | opportunity {} | demand {} | competition {} | hits {}",
            rank + 1,
            score.keyword,
            format_float(score.opportunity, 3),
            format_float(score.demand, 3),
            format_float(score.competition, 3),
            score.provider_hits
        );
        if let Some(entry) = report.metrics.as_ref().and_then(|map| map.get(&score.keyword)) {
            line.push_str(&format!(
                " | pc {} | mobile {} | blog {} | google {} | cpc {}",
                format_optional(entry.monthly_pc),
                format_optional(entry.monthly_mobile),
                format_optional(entry.naver_blog_total),
                format_optional(entry.google_total),
                entry
                    .cpc
                    .map(|cpc| format_float(cpc, 0))
                    .unwrap_or_else(|| "-".to_string())
            ));
        }
        println!("{}", line);
    }
    Ok(())
}

async fn run_monetize(args: MonetizeArgs, config: AppConfig) -> Result<(), String> {
    let mut params = config.monetization.params.clone();
    if let Some(value) = args.capture_pct {
        params.capture_pct = value;
    }
    if let Some(value) = args.pv_per_visit {
        params.pv_per_visit = value;
    }
    if let Some(value) = args.ecpm {
        params.ecpm = value;
    }
    if let Some(value) = args.aff_cvr_pct {
        params.aff_cvr_pct = value;
    }
    if let Some(value) = args.aff_commission {
        params.aff_commission = value;
    }
    let min_monthly = args.min_monthly.unwrap_or(config.monetization.min_monthly);
    let exclude = args
        .exclude
        .as_deref()
        .map(split_list)
        .unwrap_or_else(|| config.monetization.exclude_tokens.clone());

    let monetizer = Monetizer::new(params, min_monthly, &exclude);
    let analyzer = build_analyzer(&args.collect, &config, Some(monetizer))?;
    let request = build_request(&args.collect, &config, true)?;
    let report = analyzer.run(&request).await?;

    if args.collect.json {
        let records: Vec<_> = report
            .monetization
            .iter()
            .take(args.collect.top)
            .map(|row| row.to_record())
            .collect();
        return print_json(&records);
    }

    print_warnings(&report);
    let titles = if args.titles {
        title_metas(
            report
                .monetization
                .iter()
                .take(args.collect.top)
                .map(|row| (row.keyword.as_str(), row.monthly_search)),
        )
    } else {
        Vec::new()
    };
    println!(
        "Keywords modeled: {} | total estimated revenue: {}",
        report.monetization.len(),
        format_number(total_revenue(&report.monetization))
    );
    for (rank, row) in report.monetization.iter().take(args.collect.top).enumerate() {
        println!(
            "{:>3}. {} [{}] | monthly {} | visits {} | pageviews {} | display {} | affiliate {} | total {}",
            rank + 1,
            row.keyword,
            row.intent.label(),
            format_number(row.monthly_search.min(i64::MAX as u64) as i64),
            format_number(row.est_visits),
            format_number(row.est_pageviews),
            format_number(row.est_display_rev),
            format_number(row.est_aff_rev),
            format_number(row.est_total_rev)
        );
        if let Some(pair) = titles.get(rank) {
            println!("     title [{}]: {}", pair.angle.label(), pair.title);
            println!("     meta: {}", pair.meta);
        }
    }
    Ok(())
}

async fn run_related(args: RelatedArgs, config: AppConfig) -> Result<(), String> {
    let client = SearchAdClient::from_env(&config.http)
        .ok_or_else(|| "NAVER_AD_CUSTOMER_ID, NAVER_AD_API_KEY and NAVER_AD_SECRET_KEY are required".to_string())?;
    let seed = keyword_monetizer::normalize(&args.seed);
    if seed.is_empty() {
        return Err("missing seed keyword".to_string());
    }
    let related = client
        .related_keywords(&seed, args.max_rows)
        .await
        .map_err(|err| format!("SearchAd request failed: {}", err))?;
    let rows = click_value_rows(&related);

    if args.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No related keywords found for {}", seed);
        return Ok(());
    }
    let total: i64 = rows.iter().map(|row| row.est_revenue).sum();
    println!("Related keywords: {} | click value total: {}", rows.len(), format_number(total));
    for row in &rows {
        println!(
            "- {} | pc {} | mobile {} | clicks {} | cpc {} | comp {} | value {}",
            row.keyword,
            format_number(row.monthly_pc.min(i64::MAX as u64) as i64),
            format_number(row.monthly_mobile.min(i64::MAX as u64) as i64),
            format_number(row.clicks_pc.saturating_add(row.clicks_mobile).min(i64::MAX as u64) as i64),
            format_float(row.cpc, 0),
            row.competition_index.as_deref().unwrap_or("-"),
            format_number(row.est_revenue)
        );
    }
    Ok(())
}

async fn run_longtail(args: LongtailArgs, config: AppConfig) -> Result<(), String> {
    let names = args
        .providers
        .as_deref()
        .map(split_list)
        .unwrap_or_else(|| config.suggest.providers.clone());
    let providers = build_providers(&names, &config.suggest, &config.http)
        .map_err(|err| err.to_string())?;
    if providers.is_empty() {
        return Err("no suggestion providers configured".to_string());
    }
    let modifiers = match args.modifiers.as_deref() {
        Some(value) => split_list(value),
        None => DEFAULT_MODIFIERS.iter().map(|item| item.to_string()).collect(),
    };

    let rows = collect_longtail(&args.seed, &modifiers, &providers, args.min_hits, args.max_items).await;
    if args.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No long-tail suggestions for {}; try other modifiers", args.seed);
        return Ok(());
    }
    for row in &rows {
        println!(
            "- {} | hits {} | prompt {} | {}",
            row.keyword, row.hits, row.prompt, row.provider
        );
    }
    Ok(())
}

async fn run_trends(args: TrendsArgs, config: AppConfig) -> Result<(), String> {
    let hot_terms = args.hot_terms.as_deref().map(split_list).unwrap_or_default();
    let hot_refs: Vec<&str> = hot_terms.iter().map(String::as_str).collect();

    if let (Some(prev), Some(curr)) = (&args.prev, &args.curr) {
        let delta = compute_trends(&read_lines(prev)?, &read_lines(curr)?, Some(hot_refs.as_slice()));
        if args.json {
            return print_json(&delta);
        }
        print_delta(&delta);
        return Ok(());
    }

    let seeds = read_seeds(args.seeds.clone())?;
    let providers = build_providers(&config.suggest.providers, &config.suggest, &config.http)
        .map_err(|err| err.to_string())?;
    let store = SnapshotStore::load(args.store.clone()).await?;
    let run = track_provider_trends(
        &store,
        &providers,
        &seeds,
        config.suggest.depth,
        Some(hot_refs.as_slice()),
    )
    .await?;

    for warning in &run.warnings {
        eprintln!("warning: {}", warning);
    }
    if args.json {
        return print_json(&run.trends);
    }
    for trend in &run.trends {
        println!("[{}]", trend.provider);
        print_delta(&trend.delta);
    }
    Ok(())
}

fn print_delta(delta: &TrendDelta) {
    println!("New ({}):", delta.new_suggestions.len());
    for item in &delta.new_suggestions {
        println!("+ {}", item);
    }
    println!("Dropped ({}):", delta.dropped_suggestions.len());
    for item in &delta.dropped_suggestions {
        println!("- {}", item);
    }
    if !delta.hot_terms.is_empty() {
        println!("Hot terms:");
        for (term, count) in &delta.hot_terms {
            println!("  {}: {}", term, count);
        }
    }
}

fn run_outline(args: OutlineArgs) -> Result<(), String> {
    let outline = build_outline(&args.keyword);
    println!("{}", outline.title);
    for section in &outline.sections {
        println!("## {}", section);
    }
    println!();
    for question in &outline.faq {
        println!("{}", question);
    }
    Ok(())
}

fn run_config(args: ConfigArgs, config: &AppConfig) -> Result<(), String> {
    match args.command {
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force)", path.display()));
            }
            config.write(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn build_analyzer(
    args: &CollectArgs,
    config: &AppConfig,
    monetizer: Option<Monetizer>,
) -> Result<Analyzer, String> {
    let names = args
        .providers
        .as_deref()
        .map(split_list)
        .unwrap_or_else(|| config.suggest.providers.clone());
    let providers =
        build_providers(&names, &config.suggest, &config.http).map_err(|err| err.to_string())?;
    let sources = EnrichmentSources::from_env(&config.http);
    let analyzer = Analyzer::new(providers, sources, config);
    Ok(match monetizer {
        Some(monetizer) => analyzer.with_monetizer(monetizer),
        None => analyzer,
    })
}

fn build_request(
    args: &CollectArgs,
    config: &AppConfig,
    enrich: bool,
) -> Result<AnalysisRequest, String> {
    let mut request = AnalysisRequest::new(read_seeds(args.seeds.clone())?);
    request.depth = args.depth.unwrap_or(config.suggest.depth);
    request.profile = args.profile.clone();
    request.include_suffixes = args.include_suffixes;
    request.max_candidates = args.max_candidates;
    request.enrich = enrich;
    request.enrich_limit = args.enrich_limit.or(Some(config.enrichment.limit));
    Ok(request)
}

fn read_seeds(args: Vec<String>) -> Result<Vec<String>, String> {
    let seeds: Vec<String> = args
        .iter()
        .map(|seed| keyword_monetizer::normalize(seed))
        .filter(|seed| !seed.is_empty())
        .collect();
    if !seeds.is_empty() {
        return Ok(keyword_monetizer::unique_ordered(seeds));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let seeds = parse_lines(&buffer);
    if seeds.is_empty() {
        return Err("missing seed keywords: pass --seed or pipe one per line".to_string());
    }
    Ok(seeds)
}

fn read_lines(path: &Path) -> Result<Vec<String>, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    Ok(parse_lines(&contents))
}

fn parse_lines(contents: &str) -> Vec<String> {
    keyword_monetizer::unique_ordered(
        contents
            .lines()
            .map(keyword_monetizer::normalize)
            .filter(|line| !line.is_empty()),
    )
}

fn print_warnings(report: &AnalysisReport) {
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
