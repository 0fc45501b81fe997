use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download Packages files from the remote repository
    Fetch {
        /// Repository base URL (the `dists/` directory)
        #[arg(required = false, long)]
        base_url: Option<String>,

        /// Codenames to fetch (default: all configured)
        #[arg(required = false, long = "codename", num_args = 1..)]
        codenames: Vec<String>,

        /// Branches to fetch (default: all configured)
        #[arg(required = false, long = "branch", num_args = 1..)]
        branches: Vec<String>,

        /// Architectures to fetch (default: all configured)
        #[arg(required = false, long = "architecture", num_args = 1..)]
        architectures: Vec<String>,

        /// Directory to store files in
        #[arg(required = false, short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        output: String,
    },

    /// Normalize Description and Tag fields of Packages files
    #[command(arg_required_else_help = true)]
    Normalize {
        /// Input directory
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        input: String,

        /// Output directory
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        output: String,

        /// Descend into subdirectories and mirror their layout
        #[arg(required = false, short, long)]
        recursive: bool,
    },

    /// Parse Packages files into JSON
    #[command(arg_required_else_help = true)]
    Parse {
        /// Input directory
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        input: String,

        /// Output directory
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        output: String,

        /// Descend into subdirectories and mirror their layout
        #[arg(required = false, short, long)]
        recursive: bool,

        /// Normalize fields before parsing
        #[arg(required = false, short, long)]
        normalize: bool,
    },

    /// Look up packages in a parsed index
    #[command(arg_required_else_help = true)]
    Query {
        /// Branch, e.g. main
        #[arg(required = true, short, long)]
        branch: String,

        /// Architecture, e.g. amd64
        #[arg(required = true, short, long)]
        architecture: String,

        /// Codename directory level, if the data root has one
        #[arg(required = false, long)]
        codename: Option<String>,

        /// Package name; lists the whole index when omitted
        #[arg(required = false, short, long)]
        package: Option<String>,

        /// Data root (default: configured data_path)
        #[arg(required = false, short, long, value_hint = ValueHint::DirPath)]
        data: Option<String>,
    },

    /// Serve parsed indexes over HTTP
    Serve {
        /// Address to listen on
        #[arg(required = false, long)]
        bind: Option<String>,

        /// Data root (default: configured data_path)
        #[arg(required = false, short, long, value_hint = ValueHint::DirPath)]
        data: Option<String>,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Print the effective configuration
    Config,
}
