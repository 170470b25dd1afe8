use std::{env, path::PathBuf};

use anyhow::{Result, anyhow, bail};

use crate::{
    config::DEFAULT_CONFIG_PATH,
    records::RecordKind,
    view::{FilterCriteria, Selection, SortKey},
};

const USAGE: &str = "usage: rollcall [--config <path>] <command>
commands:
  list <students|teachers|results> [--category <c>] [--search <text>] [--secondary <s>] [--year <y|all>] [--sort <key>]
  facets <students|teachers|results>
  notices
  grade <score>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        kind: RecordKind,
        criteria: FilterCriteria,
        sort: Option<SortKey>,
    },
    Facets {
        kind: RecordKind,
    },
    Notices,
    Grade {
        raw: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: PathBuf,
    pub command: Command,
}

pub fn invocation_from_args() -> Result<Invocation> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut options = Vec::new();

    while let Some(arg) = args.next() {
        if let Some(name) = arg.strip_prefix("--") {
            let value = args
                .next()
                .ok_or_else(|| anyhow!("missing value for --{name}\n{USAGE}"))?;
            if name == "config" {
                config_path = Some(PathBuf::from(value));
            } else {
                options.push((name.to_string(), value));
            }
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let command_name = positional
        .next()
        .ok_or_else(|| anyhow!("missing command\n{USAGE}"))?;
    let command = match command_name.as_str() {
        "list" => {
            let kind = listed_kind(positional.next())?;
            let mut criteria = FilterCriteria::default();
            let mut sort = None;
            for (name, value) in options.drain(..) {
                match name.as_str() {
                    "category" => criteria.primary_category = Some(value),
                    "search" => criteria.search_text = value,
                    "secondary" => criteria.secondary = Selection::parse(&value),
                    "year" => {
                        criteria.exam_year = Selection::parse_year(&value)
                            .ok_or_else(|| anyhow!("invalid --year '{value}'\n{USAGE}"))?;
                    }
                    "sort" => {
                        sort = Some(
                            SortKey::parse(&value)
                                .ok_or_else(|| anyhow!("unknown sort key '{value}'\n{USAGE}"))?,
                        );
                    }
                    other => bail!("unknown option --{other} for list\n{USAGE}"),
                }
            }
            Command::List {
                kind,
                criteria,
                sort,
            }
        }
        "facets" => Command::Facets {
            kind: listed_kind(positional.next())?,
        },
        "notices" => Command::Notices,
        "grade" => Command::Grade {
            raw: positional
                .next()
                .ok_or_else(|| anyhow!("missing score for grade\n{USAGE}"))?,
        },
        other => bail!("unknown command: {other}\n{USAGE}"),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument: {extra}\n{USAGE}");
    }
    if let Some((name, _)) = options.first() {
        bail!("unknown option --{name} for {command_name}\n{USAGE}");
    }

    Ok(Invocation {
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        command,
    })
}

fn listed_kind(value: Option<String>) -> Result<RecordKind> {
    let value = value.ok_or_else(|| anyhow!("missing record kind\n{USAGE}"))?;
    match RecordKind::parse(&value) {
        Some(RecordKind::Notices) => bail!("notices are listed with the notices command\n{USAGE}"),
        Some(kind) => Ok(kind),
        None => bail!("unknown record kind: {value}\n{USAGE}"),
    }
}
