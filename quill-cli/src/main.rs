use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use quill_cli::{EmitMode, compile_cmd, render_cmd};
use quill_compiler::{CompilerOptions, Whitespace};

#[derive(Parser)]
#[command(name = "quill", version, about = "Quill template compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TemplateFlags {
    /// Skip static analysis; every node is generated inline
    #[arg(long)]
    no_optimize: bool,
    /// Keep HTML comments in the output
    #[arg(long)]
    comments: bool,
    /// Collapse whitespace instead of preserving it
    #[arg(long)]
    condense: bool,
    /// Report diagnostic offsets relative to the file
    #[arg(long)]
    source_range: bool,
}

impl TemplateFlags {
    fn options(&self) -> CompilerOptions {
        let mut options = CompilerOptions::new()
            .optimize(!self.no_optimize)
            .comments(self.comments)
            .output_source_range(self.source_range);
        if self.condense {
            options = options.whitespace(Whitespace::Condense);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template into render functions.
    Compile {
        input: PathBuf,
        /// Output directory (default: target/quill-gen)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = EmitMode::Render)]
        emit: EmitMode,
        #[command(flatten)]
        flags: TemplateFlags,
    },
    /// Compile and render a template, printing the resulting HTML.
    Render {
        input: PathBuf,
        /// Data as key=value; repeatable
        #[arg(long = "data", short = 'd')]
        data: Vec<String>,
        #[command(flatten)]
        flags: TemplateFlags,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            input,
            out_dir,
            emit,
            flags,
        } => {
            compile_cmd(&input, out_dir.as_deref(), emit, &flags.options())?;
        }
        Commands::Render { input, data, flags } => {
            let html = render_cmd(&input, &data, &flags.options())?;
            println!("{html}");
        }
    }
    Ok(())
}
