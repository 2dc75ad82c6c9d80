use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use mosaic_core::tree::{Corner, MosaicDirection, Side};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Mosaic",
    version = mosaic_core::version(),
    about = "Mosaic - inspect and edit recursive tiling layouts",
)]
pub struct Args {
    /// Specify custom configuration file path
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Specify custom configuration file path"
    )]
    pub config_path: Option<PathBuf>,

    /// Use default configuration and ignore config files
    #[arg(
        long = "defaults",
        global = true,
        help = "Use default configuration and ignore config files"
    )]
    pub use_defaults: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose", help = "Only log info and above")]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "Log everything, including traces")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every pane with the rectangle it occupies
    Show {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long, default_value_t = 1920)]
        width: u32,
        #[arg(long, default_value_t = 1080)]
        height: u32,
    },
    /// Print pane ids in layout order
    Leaves {
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Rebuild the layout as a balanced tree
    Arrange {
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Add a new pane in a corner
    Add {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long, value_enum)]
        corner: CornerArg,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Move a pane next to another node
    Move {
        #[command(flatten)]
        layout: LayoutArgs,
        /// Path of the pane to move, e.g. `second.first`
        #[arg(long)]
        from: String,
        /// Path of the node to drop it on
        #[arg(long)]
        to: String,
        #[arg(long, value_enum)]
        side: SideArg,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Split a pane, adding a new one after it
    Split {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long)]
        path: String,
        #[arg(long, value_enum)]
        direction: DirectionArg,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Remove a pane or subtree
    Remove {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long)]
        path: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the path to the pane in a corner
    Corner {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long, value_enum)]
        corner: CornerArg,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LayoutArgs {
    /// Layout file (.yaml, .yml or .json)
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    /// Write the result here instead of printing it as YAML
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CornerArg {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<CornerArg> for Corner {
    fn from(corner: CornerArg) -> Self {
        match corner {
            CornerArg::TopLeft => Corner::TopLeft,
            CornerArg::TopRight => Corner::TopRight,
            CornerArg::BottomLeft => Corner::BottomLeft,
            CornerArg::BottomRight => Corner::BottomRight,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SideArg {
    Left,
    Right,
    Top,
    Bottom,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
            SideArg::Top => Side::Top,
            SideArg::Bottom => Side::Bottom,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    Row,
    Column,
}

impl From<DirectionArg> for MosaicDirection {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Row => MosaicDirection::Row,
            DirectionArg::Column => MosaicDirection::Column,
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
