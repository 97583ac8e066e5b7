//! Example lyrics and tag cheat sheet commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::cli::{print_structured, GlobalArgs};
use crate::library::Library;

/// Example lyrics.
#[derive(Parser)]
pub struct TemplatesCommand {
    /// Templates subcommand to execute.
    #[command(subcommand)]
    pub command: TemplatesSubcommands,
}

/// Templates subcommands.
#[derive(Subcommand)]
pub enum TemplatesSubcommands {
    /// Lists the examples.
    List,
    /// Prints one example's lyrics.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Example id or number from `templates list`.
    pub name: String,
}

/// One line of `templates list`.
#[derive(Serialize)]
struct TemplateSummary<'a> {
    number: usize,
    id: &'a str,
    title: &'a str,
    style: &'a str,
    tags: &'a [String],
}

impl TemplatesCommand {
    /// Executes the templates command.
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        let library = Library::load()?;
        match self.command {
            TemplatesSubcommands::List => {
                let summaries: Vec<TemplateSummary<'_>> = library
                    .examples
                    .iter()
                    .enumerate()
                    .map(|(index, example)| TemplateSummary {
                        number: index + 1,
                        id: &example.id,
                        title: &example.title,
                        style: &example.style,
                        tags: &example.tags,
                    })
                    .collect();
                print_structured(&summaries, global)
            }
            TemplatesSubcommands::Show(cmd) => {
                let example = library
                    .find(&cmd.name)
                    .with_context(|| format!("No example named '{}'", cmd.name))?;
                if global.json {
                    return print_structured(example, global);
                }
                eprintln!("{} | {}", example.title, example.style);
                println!("{}", example.content.trim_end());
                Ok(())
            }
        }
    }
}

/// Tag cheat sheet options.
#[derive(Parser)]
pub struct TagsCommand {}

impl TagsCommand {
    /// Executes the tags command.
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        let library = Library::load()?;
        if global.json {
            return print_structured(&library.tags, global);
        }
        let width = library
            .tags
            .iter()
            .map(|tag| tag.label.chars().count())
            .max()
            .unwrap_or(0);
        for tag in &library.tags {
            println!("{:<width$}  {}", tag.label, tag.description);
        }
        Ok(())
    }
}
