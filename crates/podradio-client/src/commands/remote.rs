//! Commands that talk to the service.
//!
//! Each command runs exactly one operation on a connected client and hands
//! back its payload as JSON for the caller to print.

use serde::Serialize;
use serde_json::Value;

use podradio_protocol::CodecError;

use crate::cli::Command;
use crate::client::{Outcome, PodRadioClient};
use crate::endpoint::Resolver;
use crate::error::{ClientError, ClientResult};
use crate::transport::Connector;

fn to_json<T: Serialize>(outcome: Outcome<T>) -> ClientResult<Outcome<Value>> {
    match outcome {
        Outcome::Completed(value) => {
            let json = serde_json::to_value(value).map_err(CodecError::from)?;
            Ok(Outcome::Completed(json))
        }
        Outcome::Refused(refusal) => Ok(Outcome::Refused(refusal)),
    }
}

/// Runs `command` on a connected client.
///
/// Operations without a payload complete with `Value::Null`.
pub fn run<R: Resolver, C: Connector>(
    client: &mut PodRadioClient<R, C>,
    command: &Command,
) -> ClientResult<Outcome<Value>> {
    match command {
        Command::Status => to_json(client.get_status()?),
        Command::List => to_json(client.list_podcasts()?),
        Command::Add {
            name,
            url,
            description,
        } => Ok(client
            .add_podcast(name, url, description)?
            .map(Option::unwrap_or_default)),
        Command::Remove { identifier } => Ok(client
            .remove_podcast(identifier)?
            .map(Option::unwrap_or_default)),
        Command::Play { url } => to_json(client.play_podcast(url.as_deref())?),
        Command::Pause => Ok(client.pause()?.map(|()| Value::Null)),
        Command::Stop => Ok(client.stop()?.map(|()| Value::Null)),
        Command::Next => to_json(client.next_podcast()?),
        Command::Previous => to_json(client.previous_podcast()?),
        Command::Config { .. } => Err(ClientError::Config(
            "configuration commands do not talk to the service".into(),
        )),
    }
}
