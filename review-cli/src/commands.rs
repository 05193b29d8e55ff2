//! Subcommand handlers. Each returns `Ok(())` on success; `main` turns an
//! error into exit code 1.

use std::path::Path;

use anyhow::{Context, bail};
use gatereview_core::config::{ConfigLoader, ReviewConfig};
use gatereview_core::layout::LAYOUT_TEMPLATE;
use gatereview_core::{CorrectionStore, Layout, SampleList};
use gatereview_tui::ReviewOptions;
use gatereview_tui::logging::init_file_logging;

use crate::cli::{LayoutCommand, ReviewArgs, SamplesArgs, SummaryArgs};

fn load_config(path: Option<&Path>) -> anyhow::Result<ReviewConfig> {
    let config = match path {
        Some(path) => ConfigLoader::new().with_file(path).load(),
        None => ConfigLoader::load_default(),
    };
    config.context("Failed to load settings")
}

pub fn review(args: ReviewArgs) -> anyhow::Result<()> {
    if !args.input.is_dir() {
        bail!("Input folder {} does not exist", args.input.display());
    }
    let mut config = load_config(args.config.as_deref())?;
    if args.no_confirm {
        config.confirm_discard = false;
        config.confirm_clear = false;
    }
    let layout = Layout::load(&args.layout)?;

    let log_dir = args.input.join(&config.output_dir_name);
    let _log_guard = init_file_logging(&log_dir, &config.log_level)?;
    tracing::info!(
        layout = %args.layout.display(),
        gate = %layout.gate_name,
        "Loaded layout"
    );

    gatereview_tui::run(ReviewOptions {
        input: args.input,
        layout,
        config,
        store: args.store,
    })
}

pub fn summary(args: SummaryArgs) -> anyhow::Result<()> {
    if !args.store.is_file() {
        bail!("Correction store {} does not exist", args.store.display());
    }
    let store = CorrectionStore::at(&args.store);

    if args.json {
        let entries: Vec<serde_json::Value> = store
            .entries_for(&args.sample)?
            .into_iter()
            .map(|(gate, descriptor)| serde_json::json!({ "gate": gate, "descriptor": descriptor }))
            .collect();
        let json = serde_json::json!({
            "sample": args.sample,
            "discarded": store.is_discarded(&args.sample)?,
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let summary = store.summarize(&args.sample)?;
    if summary.is_empty() {
        println!("{}: no record", args.sample);
    } else {
        println!("{summary}");
    }
    Ok(())
}

pub fn samples(args: SamplesArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let extension = args
        .extension
        .as_deref()
        .unwrap_or(config.document_extension.as_str());
    let samples = SampleList::scan(&args.input, extension)?;

    // An explicit store must exist; the default one is only used if present.
    let store = match args.store {
        Some(path) if !path.is_file() => {
            bail!("Correction store {} does not exist", path.display());
        }
        Some(path) => Some(CorrectionStore::at(path)),
        None => {
            let path = config.store_path(&args.input);
            path.is_file().then(|| CorrectionStore::at(path))
        }
    };

    let mut rows = Vec::with_capacity(samples.size());
    for (index, sample) in samples.iter().enumerate() {
        let discarded = match &store {
            Some(store) => samples.is_discarded(index, store)?,
            None => false,
        };
        rows.push((index, sample, discarded));
    }

    if args.json {
        let json: Vec<serde_json::Value> = rows
            .iter()
            .map(|(index, sample, discarded)| {
                serde_json::json!({
                    "index": index + 1,
                    "id": sample.id,
                    "path": sample.path.display().to_string(),
                    "discarded": discarded,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for (index, sample, discarded) in rows {
        let marker = if discarded { "  discarded" } else { "" };
        println!("{:>4}  {}{marker}", index + 1, sample.id);
    }
    Ok(())
}

pub fn layout(command: LayoutCommand) -> anyhow::Result<()> {
    match command {
        LayoutCommand::Template => {
            print!("{LAYOUT_TEMPLATE}");
            Ok(())
        }
        LayoutCommand::Check { path } => {
            let layout = Layout::load(&path)?;
            let pages: Vec<String> = layout
                .pages_to_display()
                .iter()
                .map(|page| (page + 1).to_string())
                .collect();
            println!("gate: {}", layout.gate_name);
            println!(
                "images: {} (pages {})",
                layout.number_of_images,
                pages.join(", ")
            );
            println!("categories: {}", layout.taxonomy.categories().join(", "));
            println!("triggers:");
            for binding in layout.taxonomy.bindings() {
                println!("  {} -> {}", binding.key, binding.descriptor);
            }
            Ok(())
        }
    }
}
