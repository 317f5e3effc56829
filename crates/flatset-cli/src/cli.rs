use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use flatset_store::FindBy;

#[derive(Parser)]
#[command(
    name = "flatset",
    about = "flatset: a JSON-file collection store with deep search",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with store settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backing collection file (overrides the config file)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every item in the collection
    List(ListArgs),
    /// Add one or more JSON items to the collection
    Add(AddArgs),
    /// Show collection items containing a deep-search match
    Search(SearchArgs),
    /// Deep-search an arbitrary JSON document
    Find(FindArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Keys every item must have; items without them are skipped
    #[arg(long, value_delimiter = ',')]
    pub require: Vec<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Items as JSON text, e.g. '{"name":"Alice"}'
    #[arg(required = true)]
    pub items: Vec<String>,
    /// Keys every item must have (applies to loaded items too)
    #[arg(long, value_delimiter = ',')]
    pub require: Vec<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    /// Also print where each item matched
    #[arg(long)]
    pub matches: bool,
}

#[derive(Args)]
pub struct FindArgs {
    /// JSON document to search
    pub document: PathBuf,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Text, number or regex to look for
    pub term: String,
    /// Compare against keys or primitive values
    #[arg(long, default_value = "key")]
    pub by: By,
    /// Case-insensitive substring matching
    #[arg(short, long)]
    pub partial: bool,
    /// Treat the term as a regular expression (implies --partial)
    #[arg(long, conflicts_with = "number")]
    pub regex: bool,
    /// Treat the term as a number
    #[arg(long)]
    pub number: bool,
    /// Stop at the first match
    #[arg(long)]
    pub first: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum By {
    Key,
    Value,
}

impl From<By> for FindBy {
    fn from(by: By) -> Self {
        match by {
            By::Key => FindBy::Key,
            By::Value => FindBy::Value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["flatset", "list", "--file", "users.json"]).unwrap();
        assert!(matches!(cli.command, Command::List(_)));
        assert_eq!(cli.file, Some(PathBuf::from("users.json")));
    }

    #[test]
    fn parse_add_with_required_keys() {
        let cli = Cli::try_parse_from([
            "flatset", "add", "--require", "id,name", r#"{"name":"a"}"#, r#"{"name":"b"}"#,
        ])
        .unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.require, vec!["id", "name"]);
            assert_eq!(args.items.len(), 2);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_add_requires_items() {
        assert!(Cli::try_parse_from(["flatset", "add"]).is_err());
    }

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::try_parse_from(["flatset", "search", "name"]).unwrap();
        if let Command::Search(args) = cli.command {
            assert_eq!(args.query.term, "name");
            assert_eq!(args.query.by, By::Key);
            assert!(!args.query.partial);
            assert!(!args.matches);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_search_by_value_partial_first() {
        let cli = Cli::try_parse_from([
            "flatset", "search", "findme", "--by", "value", "-p", "--first", "--matches",
        ])
        .unwrap();
        if let Command::Search(args) = cli.command {
            assert_eq!(args.query.by, By::Value);
            assert!(args.query.partial);
            assert!(args.query.first);
            assert!(args.matches);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_regex_conflicts_with_number() {
        assert!(Cli::try_parse_from(["flatset", "search", "5", "--regex", "--number"]).is_err());
    }

    #[test]
    fn parse_find() {
        let cli = Cli::try_parse_from(["flatset", "find", "doc.json", "^na", "--regex"]).unwrap();
        if let Command::Find(args) = cli.command {
            assert_eq!(args.document, PathBuf::from("doc.json"));
            assert!(args.query.regex);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "flatset", "--verbose", "--format", "json", "--config", "flatset.toml", "list",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("flatset.toml")));
    }

    #[test]
    fn by_maps_to_find_by() {
        assert_eq!(FindBy::from(By::Key), FindBy::Key);
        assert_eq!(FindBy::from(By::Value), FindBy::Value);
    }
}
