use std::fs;
use std::io::Read;
use std::path::Path;

use inquire::Text;
use serde::Serialize;

use super::commands::{PromptFields, SortArg};
use super::pickers::{PromptDisplay, confirm_action, find_prompt, select_prompt, short_id};
use super::{connect, user_error};
use crate::config::ClientConfig;
use crate::editor::{PromptEditor, Saved};
use crate::sync::DeleteOutcome;
use crate::types::{Prompt, Provider};
use crate::view::{CollectionQuery, SortDirection, apply, provider_facets, tag_facets};

pub struct ListOptions {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub providers: Vec<Provider>,
    pub sort: SortArg,
    pub ascending: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct ModelsOutput {
    provider: Provider,
    models: &'static [&'static str],
}

fn read_content(fields: &PromptFields) -> anyhow::Result<Option<String>> {
    if let Some(content) = &fields.content {
        return Ok(Some(content.clone()));
    }
    match &fields.content_file {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(Some(buf))
        }
        Some(path) => Ok(Some(fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {e}", path.display())
        })?)),
        None => Ok(None),
    }
}

fn check_model(provider: Provider, model: &str) -> anyhow::Result<()> {
    if !provider.supports(model) {
        anyhow::bail!(
            "Unknown model '{model}' for {provider}. Choose one of: {}",
            provider.models().join(", ")
        );
    }
    Ok(())
}

/// Copies the command-line fields onto an editor draft.
fn apply_fields(editor: &mut PromptEditor, fields: &PromptFields, content: Option<String>) -> anyhow::Result<()> {
    if let Some(provider) = fields.provider {
        editor.set_provider(provider);
    }
    if let Some(model) = &fields.model {
        check_model(editor.draft.provider, model)?;
        editor.draft.model = model.clone();
    }
    if let Some(title) = &fields.title {
        editor.draft.title = title.clone();
    }
    if let Some(description) = &fields.description {
        editor.draft.description = description.clone();
    }
    if !fields.tags.is_empty() {
        editor.draft.tags.extend(fields.tags.iter().cloned());
    }
    if let Some(content) = content {
        editor.draft.content = content;
    }
    Ok(())
}

pub async fn run_prompt_list(config: &ClientConfig, opts: ListOptions) -> anyhow::Result<()> {
    let sync = connect(config).await?;
    let prompts = sync.fetch_all().await.map_err(user_error)?;

    let query = CollectionQuery {
        search: opts.search.unwrap_or_default(),
        tags: opts.tags.into_iter().collect(),
        providers: opts.providers.into_iter().collect(),
        sort: opts.sort.into(),
        direction: if opts.ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        },
    };
    let visible = apply(&prompts, &query);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No prompts found.");
        return Ok(());
    }

    println!();
    for prompt in &visible {
        println!("  {}", PromptDisplay { prompt });
    }
    println!();
    let tags: Vec<String> = tag_facets(&prompts)
        .iter()
        .map(|(t, n)| format!("{t} ({n})"))
        .collect();
    if !tags.is_empty() {
        println!("Tags: {}", tags.join(", "));
    }
    let providers: Vec<String> = provider_facets(&prompts)
        .iter()
        .map(|(p, n)| format!("{p} ({n})"))
        .collect();
    println!("Providers: {}", providers.join(", "));
    println!();

    Ok(())
}

pub async fn run_prompt_show(config: &ClientConfig, id: &str, json: bool) -> anyhow::Result<()> {
    let sync = connect(config).await?;
    let prompts = sync.fetch_all().await.map_err(user_error)?;
    let prompt = find_prompt(&prompts, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(prompt)?);
        return Ok(());
    }

    print_prompt(prompt);
    Ok(())
}

fn print_prompt(prompt: &Prompt) {
    let record = &prompt.record;
    println!();
    println!("{}", record.title);
    println!("  id:       {}", record.id);
    println!("  model:    {}/{}", record.provider, record.model);
    if !record.description.is_empty() {
        println!("  about:    {}", record.description);
    }
    if !record.tags.is_empty() {
        println!("  tags:     {}", record.tags.join(", "));
    }
    println!("  file:     {}", record.filename);
    println!("  created:  {}", record.created_at.to_rfc3339());
    println!("  updated:  {}", record.updated_at.to_rfc3339());
    println!();
    match &prompt.content {
        Some(content) => println!("{}", content.trim_end()),
        None => println!("(content could not be read)"),
    }
    println!();
}

pub async fn run_prompt_add(
    config: &ClientConfig,
    fields: PromptFields,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let mut content = read_content(&fields)?;
    let mut title = fields.title.clone();

    if title.is_none() && !non_interactive {
        title = Some(Text::new("Title:").prompt()?);
    }
    if content.is_none() && !non_interactive {
        content = Some(Text::new("Prompt:").prompt()?);
    }

    let mut editor = PromptEditor::create();
    apply_fields(&mut editor, &PromptFields { title, ..fields }, content)?;

    let sync = connect(config).await?;
    let record = match editor.submit(&sync).await.map_err(user_error)? {
        Saved::Created(record) | Saved::Updated(record) => record,
        Saved::Missing => anyhow::bail!("Prompt disappeared while saving"),
    };

    println!();
    println!("Added '{}' ({})", record.title, short_id(&record.id));
    println!();
    Ok(())
}

pub async fn run_prompt_edit(
    config: &ClientConfig,
    id: Option<String>,
    fields: PromptFields,
    clear_tags: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let sync = connect(config).await?;
    let prompts = sync.fetch_all().await.map_err(user_error)?;

    let prompt = match id {
        Some(id) => find_prompt(&prompts, &id)?,
        None if non_interactive => anyhow::bail!("an id is required in non-interactive mode"),
        None => select_prompt(&prompts, "Select prompt to edit:")?,
    };

    let content = read_content(&fields)?;
    if prompt.content.is_none() && content.is_none() {
        anyhow::bail!(
            "The body of '{}' could not be read. Pass --content or --content-file to replace it.",
            prompt.record.title
        );
    }

    let mut editor = PromptEditor::edit(prompt);
    if clear_tags {
        editor.draft.tags.clear();
    }
    apply_fields(&mut editor, &fields, content)?;

    match editor.submit(&sync).await.map_err(user_error)? {
        Saved::Updated(record) | Saved::Created(record) => {
            println!();
            println!("Updated '{}' ({})", record.title, short_id(&record.id));
            println!();
        }
        Saved::Missing => {
            println!("Nothing to update: the prompt no longer exists.");
        }
    }
    Ok(())
}

pub async fn run_prompt_rm(
    config: &ClientConfig,
    id: Option<String>,
    yes: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let sync = connect(config).await?;
    let prompts = sync.fetch_all().await.map_err(user_error)?;

    let prompt = match id {
        Some(id) => find_prompt(&prompts, &id)?,
        None if non_interactive => anyhow::bail!("an id is required in non-interactive mode"),
        None => select_prompt(&prompts, "Select prompt to delete:")?,
    };

    let mut editor = PromptEditor::edit(prompt);
    editor.request_delete().map_err(user_error)?;

    let confirmed = confirm_action(
        &format!("Delete prompt '{}'?", prompt.record.title),
        yes,
        non_interactive,
    )?;
    if !confirmed {
        editor.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    match editor.confirm_delete(&sync).await.map_err(user_error)? {
        DeleteOutcome::Deleted(record) => {
            println!();
            println!("Deleted '{}'", record.title);
            println!();
        }
        DeleteOutcome::Absent => println!("Nothing to delete: the prompt no longer exists."),
    }
    Ok(())
}

pub fn run_prompt_models(provider: Option<Provider>, json: bool) -> anyhow::Result<()> {
    let providers: Vec<Provider> = match provider {
        Some(p) => vec![p],
        None => Provider::ALL.to_vec(),
    };

    if json {
        let output: Vec<ModelsOutput> = providers
            .into_iter()
            .map(|provider| ModelsOutput {
                provider,
                models: provider.models(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for provider in providers {
        println!("{provider}");
        for model in provider.models() {
            println!("  {model}");
        }
    }
    Ok(())
}
