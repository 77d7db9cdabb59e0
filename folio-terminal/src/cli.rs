//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "folio-terminal")]
#[command(version, about = "Preview a bendable-page book in the terminal")]
pub struct Args {
    /// Page manifest (`page <front> <back>` lines, or a `.json` record list).
    /// Sample pages are used when omitted.
    pub manifest: Option<PathBuf>,

    /// Book configuration (JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start with the bone chain drawn over the pages.
    #[arg(short, long)]
    pub bones: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["folio-terminal"]).unwrap();
        assert!(args.manifest.is_none());
        assert!(args.config.is_none());
        assert!(!args.bones);
    }

    #[test]
    fn test_manifest_and_config() {
        let args =
            Args::try_parse_from(["folio-terminal", "pages.txt", "--config", "book.json", "-b"])
                .unwrap();
        assert_eq!(args.manifest, Some(PathBuf::from("pages.txt")));
        assert_eq!(args.config, Some(PathBuf::from("book.json")));
        assert!(args.bones);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["folio-terminal", "--cnofig", "book.json"]).is_err());
        assert!(Args::try_parse_from(["folio-terminal", "--config"]).is_err());
    }
}
