use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hairgallery",
    version,
    about = "filterable hairstyle gallery",
    long_about = "hairgallery loads hairstyle entries from a JSON file or URL, filters them by length, style and face shape, probes every image and renders the matching cards.\n\nExamples:\n  hairgallery -d ./hairstyles.json\n  hairgallery -d ./hairstyles.json --length short --face oval -o gallery.html\n  hairgallery -d https://example.com/hairstyles.json --interactive\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered gallery to a file. HTML output is a static snapshot of the current filters and card positions; its controls are not scripted."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from the file extension when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'd',
        long = "data",
        value_name = "FILE|URL",
        help_heading = "Input",
        help = "Hairstyle data (JSON file path or http(s) URL)."
    )]
    pub data: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.hairgallery/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if missing) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'l',
        long = "length",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only show hairstyles with this length."
    )]
    pub length: Option<String>,

    #[arg(
        short = 's',
        long = "style",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only show hairstyles with this style."
    )]
    pub style: Option<String>,

    #[arg(
        short = 'f',
        long = "face",
        visible_alias = "face-shape",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Only show hairstyles suited to this face shape."
    )]
    pub face: Option<String>,

    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Images",
        help = "How long each image may take to load before it is skipped (default 5)."
    )]
    pub timeout: Option<String>,

    #[arg(
        short = 'b',
        long = "base-url",
        value_name = "URL",
        help_heading = "Images",
        help = "Resolve relative image paths against this URL."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'a',
        long = "asset-dir",
        value_name = "DIR",
        help_heading = "Images",
        help = "Resolve relative image paths against this directory (defaults to the data file's directory)."
    )]
    pub asset_dir: Option<String>,

    #[arg(
        long = "default-image",
        value_name = "PATH",
        help_heading = "Images",
        help = "Image shown when none of an entry's images load."
    )]
    pub default_image: Option<String>,

    #[arg(
        long = "swipe-threshold",
        value_name = "PX",
        help_heading = "Carousel",
        help = "Minimum horizontal swipe distance in pixels (default 50)."
    )]
    pub swipe_threshold: Option<f32>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Carousel",
        help = "Browse the gallery from stdin (type 'help' for commands)."
    )]
    pub interactive: bool,

    #[arg(
        long = "user-agent",
        value_name = "UA",
        help_heading = "Images",
        help = "User-Agent sent when fetching data and probing images."
    )]
    pub user_agent: Option<String>,
}
