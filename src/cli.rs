//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::backends::scan::ScanOptions;
use crate::commands::link::LinkRun;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::linker::{LinkOptions, SlugMode, TextSource};

/// headlink - give HTML headings linkable ids.
#[derive(Parser, Debug)]
#[command(name = "headlink")]
#[command(
    author,
    version,
    about,
    long_about = r#"headlink assigns an `id` attribute to every <h2>, <h3> and <h4> in HTML
documents so that each heading can be the target of a fragment link.

The id is the heading text, lowercased, with its first space replaced by a
hyphen: "Quick Start Guide" becomes "quick-start guide". Use --all-spaces to
hyphenate every space, and --unique to suffix repeated ids.

Each command prints a ResultSet in the selected format (default: jsonl).
Progress and diagnostics go to stderr.

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: excerpts only (ids and slugs)

Examples:
    headlink link
    headlink link site/ --dry-run --headings
    headlink lint --all-spaces
    headlink slug "Quick Start Guide"
    cat page.html | headlink link - > linked.html
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
All paths emitted in results are relative to this root, and positional paths are\n\
interpreted relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: Prefer jsonl when you want stable, line-oriented output for piping."
    )]
    pub format: String,

    /// Quiet mode (warnings and errors only).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Only log warnings and errors to stderr. Results are still printed\n\
to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr, including skipped heading levels and\n\
per-document summaries."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// How heading text becomes an id
#[derive(Args, Debug, Clone)]
pub struct ModeArgs {
    /// Space handling (first-space/all-spaces).
    #[arg(
        long,
        env = "HEADLINK_SLUG_MODE",
        default_value = "first-space",
        value_name = "MODE",
        long_help = "Select how spaces in heading text become hyphens.\n\n\
Supported values:\n\
- first-space (default): only the first space, \"A B C\" -> \"a-b c\"\n\
- all-spaces: every space, \"A B C\" -> \"a-b-c\""
    )]
    pub slug_mode: String,

    /// Shorthand for --slug-mode all-spaces.
    #[arg(long)]
    pub all_spaces: bool,
}

impl ModeArgs {
    pub fn mode(&self) -> Result<SlugMode> {
        if self.all_spaces {
            return Ok(SlugMode::AllSpaces);
        }
        Ok(self.slug_mode.parse()?)
    }
}

/// Options shared by link and lint
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    #[command(flatten)]
    pub mode: ModeArgs,

    /// Suffix repeated ids with -1, -2, ...
    #[arg(
        long,
        env = "HEADLINK_UNIQUE",
        long_help = "Make ids unique within each document. The first heading keeps the plain\n\
id; later headings with the same id get the first free numeric suffix\n\
(getting-started, getting-started-1, ...).\n\n\
Off by default: duplicate ids are kept and reported as warnings."
    )]
    pub unique: bool,

    /// Text the id is derived from (text/inner-html).
    #[arg(
        long,
        env = "HEADLINK_TEXT_SOURCE",
        default_value = "text",
        value_name = "SOURCE",
        long_help = "Select which text of a heading the id is derived from.\n\n\
Supported values:\n\
- text (default): markup removed, entities decoded, whitespace collapsed\n\
- inner-html: the raw inner markup, unmodified"
    )]
    pub text_source: String,

    #[command(flatten)]
    pub scan: ScanArgs,
}

impl LinkArgs {
    pub fn to_options(&self) -> Result<LinkOptions> {
        let text_source: TextSource = self.text_source.parse()?;
        Ok(LinkOptions {
            mode: self.mode.mode()?,
            unique: self.unique,
            text_source,
        })
    }
}

/// Document discovery options
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Include hidden files/directories (dotfiles).
    #[arg(
        long,
        long_help = "Include hidden files and directories (dotfiles).\n\n\
By default, hidden entries are skipped."
    )]
    pub hidden: bool,

    /// Disable .gitignore and other ignore rules.
    #[arg(
        long,
        long_help = "Disable respect for ignore files (.gitignore, .ignore, global ignores).\n\n\
Use this to process generated output directories that are normally ignored."
    )]
    pub no_ignore: bool,

    /// Maximum directory depth when scanning directories.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

impl ScanArgs {
    pub fn to_options(&self) -> ScanOptions {
        ScanOptions {
            hidden: self.hidden,
            no_ignore: self.no_ignore,
            max_depth: self.max_depth,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign ids to the headings of HTML documents.
    #[command(
        long_about = "Give every <h2>, <h3> and <h4> an id derived from its text, overwriting\n\
any existing id, and write each document back if it changed.\n\n\
With no PATHS every .html/.htm/.xhtml file under ROOT is linked. Directories are\n\
scanned; files are linked as given. A single `-` reads HTML from stdin and writes\n\
the linked HTML to stdout.\n\n\
Emits one file item per document; --headings adds one item per heading.\n\n\
Examples:\n\
  headlink link\n\
  headlink link public/ --dry-run\n\
  headlink link index.html --headings --format md\n\
  headlink link - < page.html\n"
    )]
    Link {
        /// Files or directories (relative to ROOT unless absolute), or `-`.
        #[arg(value_name = "PATHS", num_args = 0..)]
        paths: Vec<PathBuf>,

        /// Compute changes without writing files.
        #[arg(
            long,
            long_help = "Report what would change without writing any file. File items still\n\
carry `changed` and the post-link hash."
        )]
        dry_run: bool,

        /// Emit one result item per heading.
        #[arg(long)]
        headings: bool,

        #[command(flatten)]
        link: LinkArgs,
    },

    /// Report headings whose ids are missing or out of date.
    #[command(
        long_about = "Check headings without rewriting anything.\n\n\
Issues:\n\
- MISSING_ID (error): the heading has no id\n\
- STALE_ID (error): the id differs from the one link would assign\n\
- EMPTY_ID (warning): the heading text is empty\n\
- DUPLICATE_ID (warning): another heading in the document has the same id\n\n\
Exits with status 1 when any error is found, for CI gating.\n\n\
Examples:\n\
  headlink lint\n\
  headlink lint public/ --all-spaces --unique\n"
    )]
    Lint {
        /// Files or directories (relative to ROOT unless absolute), or `-`.
        #[arg(value_name = "PATHS", num_args = 0..)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        link: LinkArgs,
    },

    /// Print the id a piece of heading text would get.
    #[command(long_about = "Print the id for each TEXT argument.\n\n\
Examples:\n\
  headlink slug \"Quick Start Guide\"\n\
  headlink slug --all-spaces \"Quick Start Guide\" --format raw\n")]
    Slug {
        /// Heading text.
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,

        #[command(flatten)]
        mode: ModeArgs,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse()?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("invalid root: {}", cli.root.display()))?;
    log::debug!("root: {}", root.display());

    match cli.command {
        Commands::Link {
            paths,
            dry_run,
            headings,
            link,
        } => {
            let run = LinkRun {
                options: link.to_options()?,
                scan: link.scan.to_options(),
                dry_run,
                headings,
            };
            crate::commands::link::run_link(&root, &paths, run, render_config)
        }

        Commands::Lint { paths, link } => crate::commands::lint::run_lint(
            &root,
            &paths,
            link.scan.to_options(),
            &link.to_options()?,
            render_config,
        ),

        Commands::Slug { text, mode } => {
            crate::commands::slug::run_slug(&text, mode.mode()?, render_config)
        }
    }
}
