mod root;
pub use root::{parse, ConnectionOptions, ResplCommand};

pub mod repl;

use std::io::Write;

use crate::client::{self, tls, Api};
use crate::common::info;
use crate::help::CommandTable;
use crate::{render, RespError, Result};

/// Connect with the resolved configuration, then either run the given command once or start the prompt.
pub async fn run(command: ResplCommand) -> Result<()> {
    let config = command.connection.into_config().await?;

    // Certificate material is resolved before dialing so a bad value never reaches the network.
    let trust = config.trust_material().await?;
    let identity = config.client_identity()?;
    let endpoint = config.endpoint()?;
    let tls_config = tls::client_config(&endpoint, trust.as_ref(), identity.as_ref()).await?;

    let mut api = client::connect(&endpoint, tls_config).await?;

    if !command.commands.is_empty() {
        return single_shot(api.as_mut(), &command.commands, &mut std::io::stdout()).await;
    }

    let table = CommandTable::embedded()?;
    info!(commands = table.len(), "Command table loaded");

    repl::run(api.as_mut(), table, &config.prompt(&endpoint)).await
}

/// Send one command and render its reply.
/// An error reply is rendered, then returned as `RespError::ErrorReply`.
pub async fn single_shot<W: Write>(
    api: &mut dyn Api,
    commands: &[String],
    out: &mut W,
) -> Result<()> {
    let (command, args) = commands
        .split_first()
        .ok_or_else(|| RespError::Config("no command given".into()))?;

    let reply = api.call(command, args).await?;
    render::render(out, &reply)?;
    out.flush()?;

    match reply {
        crate::Reply::Error(message) => Err(RespError::ErrorReply(message)),
        _ => Ok(()),
    }
}
