//! Commands of the interactive browser.

use crate::draft::FilterField;

pub const HELP: &str = "\
Commands:
  search <text>          search by title (applied after a short pause)
  clear                  clear the search immediately
  filter <field> <value> edit a filter (genres, type, status, rating, order_by, sort, start_date, end_date)
  unset <field>          clear a filter in the draft
  filters                show applied filters and the pending draft
  apply | cancel         apply or discard the pending draft
  reset                  restore default filters, keeping the search
  scroll [rows]          scroll the list down
  more                   jump to the end of the list and load the next page
  list                   show the list again
  show <id>              open the detail view
  back                   return to the list
  genres                 list genres
  help | quit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Clear,
    Filter(FilterField, String),
    Unset(FilterField),
    Filters,
    Apply,
    Cancel,
    Reset,
    Scroll(Option<usize>),
    More,
    List,
    Show(String),
    Back,
    Genres,
    Help,
    Quit,
    Empty,
}

/// Parse one input line
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "search" | "s" | "/" => {
            if rest.is_empty() {
                Command::Clear
            } else {
                Command::Search(rest.to_string())
            }
        }
        "clear" => Command::Clear,
        "filter" | "f" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: filter <field> <value>".to_string())?;
            let field = field.parse::<FilterField>().map_err(|e| e.to_string())?;
            Command::Filter(field, value.trim().to_string())
        }
        "unset" => {
            if rest.is_empty() {
                return Err("usage: unset <field>".to_string());
            }
            Command::Unset(rest.parse::<FilterField>().map_err(|e| e.to_string())?)
        }
        "filters" => Command::Filters,
        "apply" => Command::Apply,
        "cancel" => Command::Cancel,
        "reset" => Command::Reset,
        "scroll" | "j" => {
            if rest.is_empty() {
                Command::Scroll(None)
            } else {
                let rows = rest
                    .parse::<usize>()
                    .map_err(|_| format!("not a row count: {}", rest))?;
                Command::Scroll(Some(rows))
            }
        }
        "more" | "m" => Command::More,
        "list" | "l" => Command::List,
        "show" | "open" => {
            if rest.is_empty() {
                return Err("usage: show <id>".to_string());
            }
            Command::Show(rest.to_string())
        }
        "back" | "b" => Command::Back,
        "genres" => Command::Genres,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(command)
}
