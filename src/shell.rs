//! Line-oriented interactive session.
//!
//! Keeps one [`SearchContext`] for the whole session, so every source
//! remembers its last result set and page while the user switches between
//! them.

use std::collections::BTreeSet;
use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use wwise_search::backends::FileSearchBackend;
use wwise_search::waapi::Connector;
use wwise_search::{Dispatcher, IdTypeFilter, PageState, SearchContext, SearchError, Source};

use crate::error::{AppError, Result};
use crate::render::render_page;

pub const PROMPT: &str = "wwise> ";

pub const HELP: &str = "\
Commands:
  use <project|waapi|bank>     select the source to search
  find <id> [types...]         search the active source (types: guid shortid mediaid)
  next | prev                  move one page
  page <n>                     jump to page n
  show                         print the current page again
  clear                        forget the active source's results
  probe                        test the WAAPI connection
  help                         show this text
  quit                         leave the shell";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Use(Source),
    Find {
        id: String,
        filters: BTreeSet<IdTypeFilter>,
    },
    Next,
    Prev,
    Page(i64),
    Show,
    Clear,
    Probe,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(AppError::Command("empty command".into()));
        };
        let rest: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("use", [source]) => Self::Use(source.parse()?),
            ("find", [id, types @ ..]) => Self::Find {
                id: (*id).to_owned(),
                filters: if types.is_empty() {
                    IdTypeFilter::all().iter().copied().collect()
                } else {
                    IdTypeFilter::parse_tags(types.iter().flat_map(|t| t.split(',')))
                },
            },
            ("next" | "n", []) => Self::Next,
            ("prev" | "p", []) => Self::Prev,
            ("page", [n]) => Self::Page(
                n.parse()
                    .map_err(|_| AppError::Command(format!("not a page number: {n}")))?,
            ),
            ("show", []) => Self::Show,
            ("clear", []) => Self::Clear,
            ("probe", []) => Self::Probe,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit" | "q", []) => Self::Quit,
            (verb, _) => {
                return Err(AppError::Command(format!(
                    "unknown or malformed command '{verb}' (type 'help')"
                )));
            }
        };
        Ok(command)
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Quit,
}

/// Interactive session state.
pub struct Shell<F, C> {
    dispatcher: Dispatcher<F, C>,
    ctx: SearchContext,
}

impl<F: FileSearchBackend, C: Connector> Shell<F, C> {
    pub fn new(dispatcher: Dispatcher<F, C>, ctx: SearchContext) -> Self {
        Self { dispatcher, ctx }
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    /// Run one command.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<Step> {
        let output = match command {
            ShellCommand::Use(source) => {
                self.ctx.set_active(Some(source));
                format!("Active source: {source}\n")
            }
            ShellCommand::Find { id, filters } => {
                self.dispatcher.search_active(&mut self.ctx, &id, filters).await?;
                self.render_active()?
            }
            ShellCommand::Next => {
                self.active_page_mut()?.next_page();
                self.render_active()?
            }
            ShellCommand::Prev => {
                self.active_page_mut()?.prev_page();
                self.render_active()?
            }
            ShellCommand::Page(n) => {
                self.active_page_mut()?.set_page(n);
                self.render_active()?
            }
            ShellCommand::Show => self.render_active()?,
            ShellCommand::Clear => {
                let source = self.active()?;
                self.ctx.clear(source);
                format!("Cleared {source} results\n")
            }
            ShellCommand::Probe => {
                let info = self.dispatcher.probe(&self.ctx.config).await?;
                format!("{}\n", info.summary())
            }
            ShellCommand::Help => format!("{HELP}\n"),
            ShellCommand::Quit => return Ok(Step::Quit),
        };
        Ok(Step::Output(output))
    }

    /// Parse and run one input line; blank lines do nothing.
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<Step>> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        let command: ShellCommand = line.parse()?;
        self.execute(command).await.map(Some)
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// Results go to `out`; each failed command prints one line to `err`
    /// and the session continues.
    pub async fn run<R, W, E>(&mut self, input: R, out: &mut W, err: &mut E) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        E: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                return Ok(());
            };
            match self.handle_line(&line).await {
                Ok(Some(Step::Output(text))) => write!(out, "{text}")?,
                Ok(Some(Step::Quit)) => return Ok(()),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "shell command failed");
                    writeln!(err, "error: {e}")?;
                }
            }
        }
    }

    fn active(&self) -> Result<Source> {
        self.ctx
            .active()
            .ok_or_else(|| SearchError::InvalidInput("no search source is active".into()).into())
    }

    fn active_page_mut(&mut self) -> Result<&mut PageState> {
        let source = self.active()?;
        Ok(self.ctx.page_mut(source))
    }

    fn render_active(&self) -> Result<String> {
        let source = self.active()?;
        Ok(render_page(self.ctx.page(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_find_with_default_types() {
        let command: ShellCommand = "find 7654321".parse().expect("parse");
        assert_eq!(
            command,
            ShellCommand::Find {
                id: "7654321".into(),
                filters: IdTypeFilter::all().iter().copied().collect(),
            }
        );
    }

    #[test]
    fn parses_find_with_listed_types() {
        let command: ShellCommand = "find {AA} guid,shortid colour".parse().expect("parse");
        let ShellCommand::Find { filters, .. } = command else {
            panic!("expected find");
        };
        assert_eq!(
            filters.into_iter().collect::<Vec<_>>(),
            vec![IdTypeFilter::Guid, IdTypeFilter::ShortId]
        );
    }

    #[test]
    fn parses_navigation() {
        assert_eq!("next".parse::<ShellCommand>().ok(), Some(ShellCommand::Next));
        assert_eq!("PREV".parse::<ShellCommand>().ok(), Some(ShellCommand::Prev));
        assert_eq!("page -3".parse::<ShellCommand>().ok(), Some(ShellCommand::Page(-3)));
        assert_eq!(
            "use waapi".parse::<ShellCommand>().ok(),
            Some(ShellCommand::Use(Source::LiveMiddleware))
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        for line in ["page two", "use", "use cloud", "find", "dance", "next 2"] {
            assert!(line.parse::<ShellCommand>().is_err(), "{line}");
        }
    }
}
