use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "reelspirit",
    version,
    about = "Analyze an Instagram profile and browse its classified posts"
)]
pub struct Cli {
    /// Instagram profile link or handle (e.g. https://www.instagram.com/kitsune.cim or @kitsune.cim)
    pub profile: String,

    /// Only list posts in this category; "all" lists everything
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Show stored results without starting a new analysis
    #[arg(long)]
    pub skip_submit: bool,
}
