use super::print::{print_config, print_full_notes, print_messages, print_notes};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use notekeep::api::{ConfigAction, NoteFilter, NoteUpdate, NotesApi};
use notekeep::config::NotesConfig;
use notekeep::error::{NotesError, Result};
use notekeep::model::{image_data_uri, NewNote};
use notekeep::store::fs_backend::FsBackend;
use notekeep::store::NoteStore;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: NotesApi<FsBackend>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Create {
            title,
            content,
            tags,
            color,
            pin,
            images,
        }) => handle_create(&mut ctx, title, content, tags, color, pin, images),
        Some(Commands::List { search, tag }) => handle_list(&mut ctx, search, tag),
        Some(Commands::View { ids }) => handle_view(&mut ctx, ids),
        Some(Commands::Update {
            id,
            title,
            content,
            color,
            clear_color,
            add_tags,
            remove_tags,
            add_images,
            remove_images,
        }) => {
            let mut update = NoteUpdate::new(id);
            update.title = title;
            update.content = content;
            update.color = if clear_color { Some(None) } else { color.map(Some) };
            update.add_tags = add_tags;
            update.remove_tags = remove_tags;
            update.add_images = read_images(&add_images)?;
            update.remove_images = remove_images;
            handle_update(&mut ctx, update)
        }
        Some(Commands::Delete { ids }) => handle_delete(&mut ctx, ids),
        Some(Commands::Pin { ids }) => handle_pin(&mut ctx, ids),
        Some(Commands::Unpin { ids }) => handle_unpin(&mut ctx, ids),
        Some(Commands::Export { output }) => handle_export(&mut ctx, output),
        Some(Commands::Import { paths }) => handle_import(&mut ctx, paths),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&mut ctx, None, None),
    }
}

/// Logs go to stderr so they never mix with command output.
/// `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "notekeep=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "notekeep", "notekeep")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| NotesError::Api("Could not determine a data directory".into()))?,
    };
    debug!(data_dir = %data_dir.display(), "using data directory");

    let config = NotesConfig::load(&data_dir)?;
    let store = NoteStore::open(FsBackend::new(&data_dir));
    Ok(AppContext {
        api: NotesApi::new(store, config, data_dir),
    })
}

fn handle_create(
    ctx: &mut AppContext,
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    color: Option<String>,
    pin: bool,
    images: Vec<PathBuf>,
) -> Result<()> {
    let mut new = NewNote::new(title.unwrap_or_default(), content.unwrap_or_default())
        .with_tags(tags)
        .with_images(read_images(&images)?)
        .pinned(pin);
    if let Some(color) = color {
        new = new.with_color(color);
    }

    // The store accepts blank notes; the CLI does not create them.
    if new.is_blank() {
        return Err(NotesError::Api(
            "Nothing to save: give a title, content or an image".into(),
        ));
    }

    let result = ctx.api.create_note(new)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, search: Option<String>, tag: Option<String>) -> Result<()> {
    let filter = NoteFilter { search, tag };
    let result = ctx.api.list_notes(&filter)?;
    print_notes(&result.listed_notes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.view_notes(&ids)?;
    print_full_notes(&result.listed_notes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(ctx: &mut AppContext, update: NoteUpdate) -> Result<()> {
    let result = ctx.api.update_note(&update)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_notes(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_pin(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.pin_notes(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_unpin(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.unpin_notes(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &mut AppContext, output: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export_notes(output.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, paths: Vec<PathBuf>) -> Result<()> {
    let result = ctx.api.import_notes(&paths)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn read_images(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths.iter().map(|p| read_image(p)).collect()
}

/// Reads an image file into a `data:` URI.
fn read_image(path: &Path) -> Result<String> {
    let mime = image_mime(path).ok_or_else(|| {
        NotesError::Api(format!("Unsupported image type: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)?;
    Ok(image_data_uri(mime, &bytes))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
