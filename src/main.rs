use anyhow::{bail, Context, Result};
use clap::Parser;

use phrase_sync::api::HttpApi;
use phrase_sync::cli::{CliArgs, Command, CredentialsCommand, Target};
use phrase_sync::credentials::{self, Credential, Resolution, UserCredentialSet};
use phrase_sync::host::{DesignDocument, FileClientStorage};
use phrase_sync::link::LinkState;
use phrase_sync::runtime::Session;
use phrase_sync::{SandboxModel, SyncConfig};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    phrase_sync::tracing::init();
    let config = SyncConfig::load();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(args.command, config))
}

async fn run(command: Command, config: SyncConfig) -> Result<()> {
    match command {
        Command::Credentials { action } => manage_credentials(action, &config).await,
        Command::Scan(target) => {
            let session = open(&target, &config)?;
            scan(&session);
            Ok(())
        }
        Command::Status(target) => {
            let mut session = open(&target, &config)?;
            status(&mut session);
            Ok(())
        }
        Command::Configure {
            target,
            file_id,
            language,
            revision,
        } => {
            let mut session = open(&target, &config)?;
            session.configure_file(&file_id, language, revision)?;
            finish(&session)
        }
        Command::Pull(target) => {
            let mut session = open(&target, &config)?;
            session.pull().await?;
            finish(&session)
        }
        Command::Push(target) => {
            let mut session = open(&target, &config)?;
            let summary = session.push().await?;
            println!(
                "pushed {}, unlinked {}, failed {}, unchanged {}",
                summary.pushed, summary.demoted, summary.failed, summary.skipped
            );
            finish(&session)
        }
        Command::Create { target, key } => {
            let mut session = open(&target, &config)?;
            let created = session.create(key).await?;
            println!("created {}", created);
            finish(&session)
        }
        Command::Unlink(target) => {
            let mut session = open(&target, &config)?;
            session.unlink_file()?;
            finish(&session)
        }
    }
}

fn client_storage() -> Result<FileClientStorage> {
    FileClientStorage::open_default().map_err(anyhow::Error::msg)
}

/// Load the design file and bring both sides of the bridge up
fn open(target: &Target, config: &SyncConfig) -> Result<Session<HttpApi>> {
    let document = DesignDocument::load(&target.design).map_err(anyhow::Error::msg)?;
    let fonts = target
        .font_registry(&document)
        .map_err(anyhow::Error::msg)?;

    let api_config = config.clone();
    let mut session = Session::new(
        SandboxModel::new(document, fonts),
        Box::new(client_storage()?),
        move |credential: &Credential| HttpApi::new(credential, &api_config),
        config,
    )
    .with_save_path(target.design.clone());

    session.open()?;
    if let Some(page) = &target.page {
        session.switch_page(page)?;
    }
    if target.nodes.is_empty() {
        session.select_page()?;
    } else {
        session.select(target.nodes.clone())?;
    }
    if let Some(index) = target.credential {
        session
            .ui
            .choose_credential(index)
            .with_context(|| format!("Cannot use credential {}", index))?;
    }
    Ok(session)
}

/// Print notifications raised during the run; fail if any was an error
fn finish(session: &Session<HttpApi>) -> Result<()> {
    let mut errors = 0;
    for notification in &session.model.notifications {
        if notification.error {
            errors += 1;
            eprintln!("error: {}", notification.message);
        } else {
            println!("{}", notification.message);
        }
    }
    if errors > 0 {
        bail!("{} operation(s) failed", errors);
    }
    Ok(())
}

fn scan(session: &Session<HttpApi>) {
    for leaf in session.ui.selection() {
        let state = leaf.state();
        println!("{:<12} {:<14} {}", leaf.figma_node_id, state, leaf.figma_content);
        if state == LinkState::LocallyAhead {
            println!("{:<12} {:<14} {}", "", "", leaf.diff().render());
        }
    }
}

fn status(session: &mut Session<HttpApi>) {
    match session.ui.binding() {
        Some(binding) => println!(
            "file {} -> workspace {} ({})",
            binding.id,
            binding.workspace_key,
            binding.custom_origin.as_deref().unwrap_or("default origin")
        ),
        None => println!("file not configured"),
    }

    let resolution = match session.ui.resolution() {
        Resolution::Onboarding => "no credentials stored".to_string(),
        Resolution::Resolved(c) => format!("using workspace {}", c.workspace_key),
        Resolution::SelectionRequired(c) => {
            format!("{} credentials match, pass --credential", c.len())
        }
        Resolution::InvalidForFile { .. } => "no stored credential fits this file".to_string(),
    };
    println!("credentials: {}", resolution);

    let pages: Vec<(String, String)> = session
        .model
        .document
        .pages
        .iter()
        .map(|page| (page.id.clone(), page.name.clone()))
        .collect();
    let mut store = session.model.store();
    for (id, name) in pages {
        match store.page_sync_state(&id).last_synced_at {
            Some(at) => println!("page {} ({}): synced {}", id, name, at.to_rfc3339()),
            None => println!("page {} ({}): never synced", id, name),
        }
    }
}

async fn manage_credentials(action: CredentialsCommand, config: &SyncConfig) -> Result<()> {
    let mut storage = client_storage()?;
    let mut set = UserCredentialSet::load(&storage);

    match action {
        CredentialsCommand::Add { api_key, origin } => {
            let candidate = Credential {
                api_key,
                custom_origin: origin,
                workspace_id: String::new(),
                workspace_key: String::new(),
            };
            let api = HttpApi::new(&candidate, config);
            let credential = credentials::validate(&api, &candidate)
                .await
                .context("Credential rejected")?;
            println!("added workspace {}", credential.workspace_key);
            set.add(credential);
            set.save(&mut storage).map_err(anyhow::Error::msg)?;
        }
        CredentialsCommand::List => {
            for (index, credential) in set.entries().iter().enumerate() {
                println!(
                    "{}: {} {} ({})",
                    index,
                    credential.workspace_key,
                    mask(&credential.api_key),
                    credential
                        .custom_origin
                        .as_deref()
                        .unwrap_or(config.default_origin.as_str())
                );
            }
        }
        CredentialsCommand::Remove { index } => {
            let Some(removed) = set.remove(index) else {
                bail!("No credential at index {}", index);
            };
            set.save(&mut storage).map_err(anyhow::Error::msg)?;
            println!("removed workspace {}", removed.workspace_key);
        }
    }
    Ok(())
}

fn mask(api_key: &str) -> String {
    let tail: String = api_key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}
