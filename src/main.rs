use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rollcall::{
    cli::{Command, invocation_from_args},
    config::Config,
    grading,
    logging::init_tracing,
    records::{ExamResult, Notice, Record, RecordKind, Student, Teacher},
    store::{HttpRecordStore, RecordStore, StoreConfig},
    view::{CriteriaPatch, FilterCriteria, SortKey, ViewModel},
};
use serde::Serialize;
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = invocation_from_args()?;

    let output = match invocation.command {
        Command::Grade { raw } => grade(&raw),
        command => {
            let config = Config::load(&invocation.config_path).with_context(|| {
                format!(
                    "failed to load config from {}",
                    invocation.config_path.display()
                )
            })?;
            let _logging_guard =
                init_tracing(&config.logging).context("failed to initialize logging")?;
            run(command, &config).await?
        }
    };

    print_json(&output)
}

async fn run(command: Command, config: &Config) -> Result<Value> {
    match command {
        Command::List {
            kind,
            criteria,
            sort,
        } => {
            let sort = sort.unwrap_or(config.view.default_sort);
            match kind {
                RecordKind::Students => list::<Student>(&config.store, criteria, sort).await,
                RecordKind::Teachers => list::<Teacher>(&config.store, criteria, sort).await,
                RecordKind::Results => list::<ExamResult>(&config.store, criteria, sort).await,
                RecordKind::Notices => bail!("notices have no listing pipeline"),
            }
        }
        Command::Facets { kind } => match kind {
            RecordKind::Students => facets::<Student>(&config.store).await,
            RecordKind::Teachers => facets::<Teacher>(&config.store).await,
            RecordKind::Results => facets::<ExamResult>(&config.store).await,
            RecordKind::Notices => bail!("notices have no facets"),
        },
        Command::Notices => {
            let store = HttpRecordStore::<Notice>::new(&config.store)?;
            Ok(serde_json::to_value(store.fetch_all().await?)?)
        }
        Command::Grade { raw } => Ok(grade(&raw)),
    }
}

fn grade(raw: &str) -> Value {
    let score = grading::parse_score(raw);
    json!({
        "input": raw,
        "score": score,
        "grade": grading::classify_optional(score),
    })
}

async fn loaded_view_model<R: Record>(
    store_config: &StoreConfig,
    sort: SortKey,
) -> Result<ViewModel<R>> {
    let store = HttpRecordStore::<R>::new(store_config)?;
    let view_model = ViewModel::<R>::with_preferred_sort(Arc::new(store), sort);
    view_model
        .load()
        .await
        .with_context(|| format!("failed to load {}", R::KIND))?;
    Ok(view_model)
}

async fn list<R: Record>(
    store_config: &StoreConfig,
    criteria: FilterCriteria,
    sort: SortKey,
) -> Result<Value> {
    let view_model = loaded_view_model::<R>(store_config, sort).await?;
    let mut patch = CriteriaPatch::search(criteria.search_text)
        .with_secondary(criteria.secondary)
        .with_exam_year(criteria.exam_year);
    if let Some(category) = criteria.primary_category {
        patch = patch.with_category(category);
    }
    view_model.set_criteria(patch);

    Ok(json!({
        "kind": R::KIND,
        "state": view_model.state(),
        "sort": view_model.sort_key(),
        "view": view_model.view(),
    }))
}

async fn facets<R: Record>(store_config: &StoreConfig) -> Result<Value> {
    let view_model = loaded_view_model::<R>(store_config, SortKey::default()).await?;
    Ok(json!({
        "kind": R::KIND,
        "facets": view_model.facets(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}
