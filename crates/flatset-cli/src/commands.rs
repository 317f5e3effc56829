use anyhow::Context;
use colored::Colorize;
use serde_json::Value;

use flatset_search::search;
use flatset_store::validator::{self, Validator};
use flatset_store::{Collection, SearchOptions, SearchResult, SearchTerm, StoreConfig};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::List(args) => cmd_list(&config, args, format).await,
        Command::Add(args) => cmd_add(&config, args, format).await,
        Command::Search(args) => cmd_search(&config, args, format).await,
        Command::Find(args) => cmd_find(args, format).await,
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(file) = &cli.file {
        config.file_path = file.clone();
    }
    Ok(config)
}

fn validator_for(require: &[String]) -> Validator {
    if require.is_empty() {
        validator::accept_all()
    } else {
        validator::required_keys(require.iter().cloned())
    }
}

async fn open_loaded(config: &StoreConfig, require: &[String]) -> anyhow::Result<Collection<Value>> {
    let collection = Collection::open(config, validator_for(require));
    collection
        .load_batch()
        .await
        .with_context(|| format!("failed to load {}", config.file_path.display()))?;
    Ok(collection)
}

async fn cmd_list(config: &StoreConfig, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let collection = open_loaded(config, &args.require).await?;
    let items = collection.get_all_items();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            for (i, item) in items.iter().enumerate() {
                println!("{} {}", format!("{i:>4}").dimmed(), item);
            }
            println!("{} item(s) in {}", items.len().to_string().bold(), collection.location().cyan());
        }
    }
    Ok(())
}

async fn cmd_add(config: &StoreConfig, args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut items = args
        .items
        .iter()
        .map(|text| serde_json::from_str::<Value>(text).with_context(|| format!("invalid JSON item: {text}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let collection = open_loaded(config, &args.require).await?;

    if items.len() == 1 {
        let item = items.remove(0);
        let stored = collection.add_item(item).await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stored)?),
            OutputFormat::Text => println!("{} Added {}", "✓".green().bold(), stored),
        }
    } else {
        let total = items.len();
        let accepted = collection.add_items(items).await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "accepted": accepted, "total": total })),
            OutputFormat::Text => {
                println!("{} Added {} of {} item(s)", "✓".green().bold(), accepted.to_string().bold(), total);
                if accepted < total {
                    println!("  {} {} item(s) rejected", "!".yellow(), total - accepted);
                }
            }
        }
    }
    Ok(())
}

async fn cmd_search(config: &StoreConfig, args: SearchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (term, options) = build_query(&args.query)?;
    let collection = open_loaded(config, &[]).await?;
    let found = collection.search_matches(&term, &options);

    match format {
        OutputFormat::Json if args.matches => {
            let report: Vec<Value> = found
                .iter()
                .map(|(item, results)| serde_json::json!({ "item": item, "matches": results }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Json => {
            let items: Vec<&Value> = found.iter().map(|(item, _)| item).collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            for (item, results) in &found {
                println!("{item}");
                if args.matches {
                    print_results(results, "    ");
                }
            }
            println!("{} matching item(s) for {}", found.len().to_string().bold(), term.to_string().yellow());
        }
    }
    Ok(())
}

async fn cmd_find(args: FindArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (term, options) = build_query(&args.query)?;
    let text = tokio::fs::read_to_string(&args.document)
        .await
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.document.display()))?;

    let results = search(&document, &term, &options);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            print_results(&results, "");
            println!("{} match(es) for {}", results.len().to_string().bold(), term.to_string().yellow());
        }
    }
    Ok(())
}

fn build_query(query: &QueryArgs) -> anyhow::Result<(SearchTerm, SearchOptions)> {
    let term = if query.regex {
        SearchTerm::pattern(&query.term).with_context(|| format!("invalid regex: {}", query.term))?
    } else if query.number {
        let n: f64 = query.term.parse().with_context(|| format!("not a number: {}", query.term))?;
        SearchTerm::Number(n)
    } else {
        SearchTerm::Text(query.term.clone())
    };

    let options = SearchOptions {
        find_by: query.by.into(),
        match_partial: query.partial || query.regex,
        stop_on_first_match: query.first,
        predicate: None,
    };
    Ok((term, options))
}

fn print_results(results: &[SearchResult], indent: &str) {
    for result in results {
        println!("{indent}{} = {}", result.dotted_path().cyan(), result.value);
    }
}
