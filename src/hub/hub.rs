use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, warn};

use crate::config::HubConfig;
use crate::ext::AsyncTryInto;
use crate::hub::command::{CdTarget, Command, CommandError, HELP};
use crate::hub::role::RoleGate;
use crate::hub::{render, seed};
use crate::resources::{
    BlobRegistry, Crumb, HandleRegistry, NavigationCursor, NodeId, NodeKind, ResourceTree, TreeError,
    listing,
};
use crate::upload::{FilePayload, LinkRequest, PayloadError, UploadSource};

/// What the session loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// One user session over the resource tree: owns the tree, the cursor and the
/// role, and runs one command at a time to completion.
#[derive(Debug)]
pub struct Hub<H: HandleRegistry = BlobRegistry> {
    tree: ResourceTree<H>,
    cursor: NavigationCursor,
    gate: RoleGate,
    root_label: String,
    max_upload_bytes: u64,
    upload_root: PathBuf,
}

impl Hub<BlobRegistry> {
    pub fn from_config(config: &HubConfig, upload_root: impl Into<PathBuf>) -> Result<Self, HubError> {
        let mut hub = Self::with_registry(config, upload_root, BlobRegistry::default());
        if config.seed_demo {
            seed::seed_demo(&mut hub.tree)?;
        }
        Ok(hub)
    }
}

impl<H: HandleRegistry> Hub<H> {
    pub fn with_registry(config: &HubConfig, upload_root: impl Into<PathBuf>, handles: H) -> Self {
        Self {
            tree: ResourceTree::new(handles),
            cursor: NavigationCursor::new(config.root_label.clone(), config.max_breadcrumb_depth),
            gate: RoleGate::new(config.admin_secret.clone()),
            root_label: config.root_label.clone(),
            max_upload_bytes: config.max_upload_bytes,
            upload_root: upload_root.into(),
        }
    }

    /// Parses and runs one line. Blank lines and comments produce no reply.
    pub async fn execute_line(&mut self, line: &str) -> Result<Option<Reply>, HubError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply, HubError> {
        debug!("Executing {:?}", command);
        ensure!(
            !command.mutates() || self.gate.is_admin(),
            AdminRequiredSnafu
        );

        let parent = self.cursor.current();
        let output = match command {
            Command::List => {
                self.crumbs()?;
                render::listing(&listing::sorted(self.tree.children(parent)))
            }
            Command::Pwd => render::breadcrumb(&self.crumbs()?),
            Command::Tree => format!(
                "{}\n{}",
                render::tree(self.tree.store(), &self.root_label),
                render::summary(self.tree.store(), self.tree.handles().live_count())
            ),
            Command::Cd(target) => {
                self.change_folder(target)?;
                render::breadcrumb(&self.crumbs()?)
            }
            Command::Open { id } => self.open(id)?,
            Command::Mkdir { name } => {
                let node = self.tree.create_folder(&name, parent)?;
                format!("Created folder '{}' ({})", node.name(), node.id())
            }
            Command::Upload { path } => {
                let payload = self.read_upload(&path).await?;
                let node = self.tree.create_file(payload, parent)?;
                format!(
                    "Uploaded '{}' ({}, {})",
                    node.name(),
                    node.id(),
                    render::size_label(node)
                )
            }
            Command::Link { url, name } => {
                let request = LinkRequest::new(&url, &name)?;
                let node = self.tree.create_link(&request.url, &request.name, parent)?;
                format!("Added link '{}' ({})", node.name(), node.id())
            }
            Command::Rename { id, name } => {
                let node = self.tree.rename(id, &name)?;
                format!("Renamed {} to '{}'", id, node.name())
            }
            Command::Remove { id } => {
                let deletion = self.tree.delete(id)?;
                let mut output = format!(
                    "Removed {} item(s), released {} upload(s)",
                    deletion.removed.len(),
                    deletion.released
                );
                if self.cursor.recover(&deletion) {
                    output.push_str(&format!(
                        "\nCurrent folder was removed, now at {}",
                        render::breadcrumb(&self.crumbs()?)
                    ));
                }
                output
            }
            Command::Login { secret } => {
                ensure!(self.gate.login(&secret), WrongSecretSnafu);
                "Logged in as admin".to_string()
            }
            Command::Logout => {
                self.gate.logout();
                "Logged out".to_string()
            }
            Command::WhoAmI => self.gate.role().to_string(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Output(output))
    }

    fn change_folder(&mut self, target: CdTarget) -> Result<(), HubError> {
        match target {
            CdTarget::Root => self.cursor.reset(),
            CdTarget::Up => {
                if let Err(err) = self.cursor.ascend(self.tree.store()) {
                    self.cursor.reset();
                    return Err(err.into());
                }
            }
            CdTarget::Folder(id) => {
                ensure!(self.tree.get(id)?.is_folder(), NotAFolderSnafu { id });
                self.cursor.navigate(Some(id));
            }
        }
        Ok(())
    }

    /// Folders open like `cd`; files and links describe what they point at.
    fn open(&mut self, id: NodeId) -> Result<String, HubError> {
        let node = self.tree.get(id)?;
        match node.kind() {
            NodeKind::Folder => {
                self.cursor.navigate(Some(id));
                Ok(render::breadcrumb(&self.crumbs()?))
            }
            NodeKind::Link => Ok(format!("{} -> {}", node.name(), node.resource().unwrap_or_default())),
            NodeKind::File => {
                let held = self.tree.contents(id)?.map(<[u8]>::len).unwrap_or_default();
                Ok(format!(
                    "{} ({}, {}) at {}, {} byte(s) held",
                    node.name(),
                    render::size_label(node),
                    node.media_type(),
                    node.resource().unwrap_or_default(),
                    held
                ))
            }
        }
    }

    /// Breadcrumb of the cursor. A broken ancestry sends the cursor back to
    /// the root before the error is reported.
    fn crumbs(&mut self) -> Result<Vec<Crumb>, HubError> {
        match self.cursor.breadcrumb(self.tree.store()) {
            Ok(crumbs) => Ok(crumbs),
            Err(err) => {
                warn!("Resetting cursor to root: {}", err);
                self.cursor.reset();
                Err(err.into())
            }
        }
    }

    async fn read_upload(&self, path: &Path) -> Result<FilePayload, HubError> {
        let path = self.upload_root.join(path);
        let payload: Result<FilePayload, PayloadError> = UploadSource::new(&path, self.max_upload_bytes)
            .async_try_into()
            .await;
        payload.context(UploadSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum HubError {
    #[snafu(context(false), display("{}", source))]
    TreeError { source: TreeError },
    #[snafu(context(false), display("{}", source))]
    CommandError { source: CommandError },
    #[snafu(display("{}", source))]
    UploadError { source: PayloadError },
    #[snafu(display("This action needs the admin role, use 'login <secret>'"))]
    AdminRequired,
    #[snafu(display("Incorrect password"))]
    WrongSecret,
    #[snafu(display("Node {} is not a folder", id))]
    NotAFolder { id: NodeId },
}
