//! Protocol client for a PodRadio service.
//!
//! Every operation goes through [`PodRadioClient::execute`]: encode, send,
//! receive, decode, strictly in that order. `execute` does not return
//! between the send and the matching receive, so at most one request is
//! ever outstanding on the session.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use podradio_core::{Podcast, Status};
use podradio_protocol::{
    Command, Direction, PlayerCommand, Playback, PodcastList, Response, Selection,
    decode_response, encode_command,
};

use crate::endpoint::{Endpoint, Resolver};
use crate::error::{ClientError, ClientResult, CommunicationError};
use crate::transport::{Connector, SessionOptions, Session, TransportError};

/// Message used when a refusal carries no `error` field.
const UNKNOWN_ERROR: &str = "Unknown error";

/// A command the service declined to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    /// Failure message reported by the service.
    pub error: String,
    /// Optional diagnostic detail.
    pub details: Option<String>,
}

impl Refusal {
    fn from_response(response: Response) -> Self {
        Self {
            error: response.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            details: response.details,
        }
    }
}

impl std::fmt::Display for Refusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.error, details),
            None => f.write_str(&self.error),
        }
    }
}

/// Result of a command the service answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The service carried out the command.
    Completed(T),
    /// The service answered with `success=false`.
    Refused(Refusal),
}

impl<T> Outcome<T> {
    /// Returns true if the command was carried out.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the payload of a completed command.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Refused(_) => None,
        }
    }

    /// Returns the refusal of a declined command.
    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Self::Completed(_) => None,
            Self::Refused(refusal) => Some(refusal),
        }
    }

    /// Maps the payload of a completed command.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Refused(refusal) => Outcome::Refused(refusal),
        }
    }

    /// Converts into a `Result`, treating a refusal as the error.
    pub fn into_result(self) -> Result<T, Refusal> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Refused(refusal) => Err(refusal),
        }
    }
}

/// Client for one PodRadio service, owning exactly one session.
pub struct PodRadioClient<R, C: Connector> {
    resolver: R,
    session: Session<C>,
}

impl<R: Resolver, C: Connector> PodRadioClient<R, C> {
    /// Creates a disconnected client.
    pub fn new(resolver: R, connector: C, options: SessionOptions) -> Self {
        Self {
            resolver,
            session: Session::new(connector, options),
        }
    }

    /// Returns true if the session is connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Endpoint of the live session.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.session.endpoint()
    }

    /// Resolves `target` and opens the session.
    ///
    /// Calling this while connected fails with
    /// `ConnectionFailed(TransportError::AlreadyConnected)` and leaves the
    /// live session untouched.
    pub fn connect(&mut self, target: Option<&str>) -> ClientResult<()> {
        if self.session.is_connected() {
            return Err(ClientError::ConnectionFailed(
                TransportError::AlreadyConnected,
            ));
        }

        let endpoint = self
            .resolver
            .resolve(target)
            .ok_or(ClientError::ServiceNotFound)?;

        info!(endpoint = %endpoint, "found PodRadio service");

        self.session
            .connect(&endpoint)
            .map_err(ClientError::ConnectionFailed)
    }

    /// Sends one command and returns the decoded reply verbatim.
    ///
    /// `success`, `data` and `error` are not interpreted here. Failures
    /// at any step surface as [`ClientError::CommunicationFailed`]; there is
    /// no retry.
    pub fn execute(&mut self, command: &Command) -> ClientResult<Response> {
        if !self.session.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let action = command.action();
        debug!(action, "executing command");

        let request = encode_command(command).map_err(CommunicationError::from)?;
        self.session
            .send(&request)
            .map_err(CommunicationError::from)?;
        let reply = self.session.receive().map_err(CommunicationError::from)?;
        let response = decode_response(&reply).map_err(CommunicationError::from)?;

        debug!(action, success = response.success, "command answered");
        Ok(response)
    }

    /// Closes the session. Always succeeds.
    pub fn disconnect(&mut self) {
        self.session.close();
    }

    /// Fetches player and selection status.
    pub fn get_status(&mut self) -> ClientResult<Outcome<Status>> {
        self.request(&Command::GetStatus)
    }

    /// Lists subscriptions in service order.
    pub fn list_podcasts(&mut self) -> ClientResult<Outcome<Vec<Podcast>>> {
        let outcome: Outcome<PodcastList> = self.request(&Command::ListPodcasts)?;
        Ok(outcome.map(|list| list.podcasts))
    }

    /// Subscribes to a feed. The reply payload is passed through untouched.
    pub fn add_podcast(
        &mut self,
        name: &str,
        url: &str,
        description: &str,
    ) -> ClientResult<Outcome<Option<Value>>> {
        self.request_opaque(&Command::add_podcast(name, url, description))
    }

    /// Unsubscribes by name or URL. The reply payload is passed through untouched.
    pub fn remove_podcast(&mut self, identifier: &str) -> ClientResult<Outcome<Option<Value>>> {
        self.request_opaque(&Command::remove_podcast(identifier))
    }

    /// Plays `url`, or the latest episode of the selected podcast when `None`.
    pub fn play_podcast(&mut self, url: Option<&str>) -> ClientResult<Outcome<Playback>> {
        let response = self.execute(&Command::play_podcast(url))?;
        if !response.success {
            return Ok(Outcome::Refused(Refusal::from_response(response)));
        }
        // Every field of the playback payload is optional.
        match response.data {
            None => Ok(Outcome::Completed(Playback::default())),
            Some(_) => Ok(Outcome::Completed(response.payload()?)),
        }
    }

    /// Pauses playback.
    pub fn pause(&mut self) -> ClientResult<Outcome<()>> {
        self.player_control(PlayerCommand::Pause)
    }

    /// Stops playback.
    pub fn stop(&mut self) -> ClientResult<Outcome<()>> {
        self.player_control(PlayerCommand::Stop)
    }

    /// Moves the selection and returns the newly selected podcast.
    pub fn navigate(&mut self, direction: Direction) -> ClientResult<Outcome<Podcast>> {
        let outcome: Outcome<Selection> = self.request(&Command::navigate(direction))?;
        Ok(outcome.map(|selection| selection.podcast))
    }

    /// Selects the next podcast.
    pub fn next_podcast(&mut self) -> ClientResult<Outcome<Podcast>> {
        self.navigate(Direction::Next)
    }

    /// Selects the previous podcast.
    pub fn previous_podcast(&mut self) -> ClientResult<Outcome<Podcast>> {
        self.navigate(Direction::Previous)
    }

    fn player_control(&mut self, command: PlayerCommand) -> ClientResult<Outcome<()>> {
        let response = self.execute(&Command::player_control(command))?;
        if !response.success {
            return Ok(Outcome::Refused(Refusal::from_response(response)));
        }
        Ok(Outcome::Completed(()))
    }

    /// Executes `command` and interprets a successful reply's data as `T`.
    fn request<T: DeserializeOwned>(&mut self, command: &Command) -> ClientResult<Outcome<T>> {
        let response = self.execute(command)?;
        if !response.success {
            return Ok(Outcome::Refused(Refusal::from_response(response)));
        }
        Ok(Outcome::Completed(response.payload()?))
    }

    fn request_opaque(&mut self, command: &Command) -> ClientResult<Outcome<Option<Value>>> {
        let response = self.execute(command)?;
        if !response.success {
            return Ok(Outcome::Refused(Refusal::from_response(response)));
        }
        Ok(Outcome::Completed(response.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::StaticResolver;
    use crate::testing::ScriptedConnector;
    use podradio_protocol::CodecError;

    type TestClient = PodRadioClient<StaticResolver, ScriptedConnector>;

    fn client(connector: &ScriptedConnector) -> TestClient {
        PodRadioClient::new(
            StaticResolver::with_default(Endpoint::new("AA:BB", 3)),
            connector.clone(),
            SessionOptions::default(),
        )
    }

    fn connected(connector: &ScriptedConnector) -> TestClient {
        let mut client = client(connector);
        client.connect(None).unwrap();
        client
    }

    #[test]
    fn connect_resolves_endpoint() {
        let connector = ScriptedConnector::new();
        let mut client = client(&connector);

        client.connect(None).unwrap();
        assert!(client.is_connected());
        assert_eq!(client.endpoint(), Some(&Endpoint::new("AA:BB", 3)));
    }

    #[test]
    fn connect_with_explicit_target() {
        let connector = ScriptedConnector::new();
        let mut client = client(&connector);

        client.connect(Some("CC:DD")).unwrap();
        assert_eq!(client.endpoint(), Some(&Endpoint::new("CC:DD", 3)));
    }

    #[test]
    fn connect_service_not_found() {
        let connector = ScriptedConnector::new();
        let mut client = PodRadioClient::new(
            StaticResolver::default(),
            connector.clone(),
            SessionOptions::default(),
        );

        let err = client.connect(None).unwrap_err();
        assert!(matches!(err, ClientError::ServiceNotFound));
        assert_eq!(connector.opens(), 0);
    }

    #[test]
    fn connect_unreachable_is_connection_failed() {
        let connector = ScriptedConnector::new().refusing();
        let mut client = client(&connector);

        let err = client.connect(None).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ConnectionFailed(TransportError::Unreachable { .. })
        ));
        assert!(!client.is_connected());
    }

    #[test]
    fn connect_twice_fails_with_already_connected() {
        let connector = ScriptedConnector::new();
        let mut client = connected(&connector);

        let err = client.connect(None).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ConnectionFailed(TransportError::AlreadyConnected)
        ));
        assert!(client.is_connected());
        assert_eq!(connector.opens(), 1);
    }

    #[test]
    fn connect_with_closure_resolver() {
        let connector = ScriptedConnector::new();
        let mut client = PodRadioClient::new(
            |_: Option<&str>| Some(Endpoint::new("EE:FF", 5)),
            connector,
            SessionOptions::default(),
        );
        client.connect(None).unwrap();
        assert_eq!(client.endpoint().map(Endpoint::channel), Some(5));
    }

    #[test]
    fn execute_while_disconnected_never_touches_stream() {
        let connector = ScriptedConnector::new().reply(r#"{"success":true}"#);
        let mut client = client(&connector);

        let err = client.execute(&Command::GetStatus).unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert_eq!(connector.opens(), 0);
        assert_eq!(connector.written(), "");
    }

    #[test]
    fn execute_returns_response_verbatim() {
        let connector = ScriptedConnector::new()
            .reply(r#"{"success":false,"error":"Unknown action: dance","details":"x"}"#);
        let mut client = connected(&connector);

        let response = client.execute(&Command::GetStatus).unwrap();
        assert_eq!(
            response,
            Response::failure("Unknown action: dance").with_details("x")
        );
    }

    #[test]
    fn execute_writes_one_frame_per_command() {
        let connector = ScriptedConnector::new()
            .reply(r#"{"success":true}"#)
            .reply(r#"{"success":true}"#);
        let mut client = connected(&connector);

        client.execute(&Command::GetStatus).unwrap();
        client
            .execute(&Command::play_podcast(None::<String>))
            .unwrap();
        assert_eq!(
            connector.written(),
            "{\"action\":\"get_status\"}\n{\"action\":\"play_podcast\"}\n"
        );
    }

    #[test]
    fn execute_malformed_reply_keeps_session() {
        let connector = ScriptedConnector::new()
            .reply("not json")
            .reply(r#"{"success":true}"#);
        let mut client = connected(&connector);

        let err = client.execute(&Command::GetStatus).unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommunicationFailed(CommunicationError::Codec(CodecError::Malformed(_)))
        ));
        assert!(client.is_connected());

        let response = client.execute(&Command::GetStatus).unwrap();
        assert!(response.success);
    }

    #[test]
    fn execute_peer_closed_is_communication_failed() {
        let connector = ScriptedConnector::new().reply_raw(br#"{"success":true"#);
        let mut client = connected(&connector);

        let err = client.execute(&Command::GetStatus).unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommunicationFailed(CommunicationError::Transport(
                TransportError::Closed { .. }
            ))
        ));
        assert!(err.is_communication());
        assert!(!client.is_connected());
    }

    #[test]
    fn execute_oversized_reply_keeps_replies_aligned() {
        let mut oversized = vec![b'x'; podradio_protocol::MAX_FRAME_SIZE + 100_000];
        oversized.push(b'\n');
        let connector = ScriptedConnector::new()
            .reply_raw(&oversized)
            .reply(r#"{"success":true,"data":{"podcasts":[]}}"#);
        let mut client = connected(&connector);

        let err = client.execute(&Command::GetStatus).unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommunicationFailed(CommunicationError::Transport(TransportError::Io(_)))
        ));
        assert!(client.is_connected());

        let podcasts = client.list_podcasts().unwrap().completed().unwrap();
        assert!(podcasts.is_empty());
    }

    #[test]
    fn execute_read_timeout_disconnects() {
        let connector = ScriptedConnector::new().stalling();
        let mut client = connected(&connector);

        let err = client.execute(&Command::ListPodcasts).unwrap_err();
        assert!(err.is_communication());
        assert!(!client.is_connected());
        assert!(matches!(
            client.get_status(),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn execute_write_failure_is_communication_failed() {
        let connector = ScriptedConnector::new().failing_writes();
        let mut client = connected(&connector);

        let err = client.execute(&Command::ListPodcasts).unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommunicationFailed(CommunicationError::Transport(TransportError::Io(_)))
        ));
        assert!(client.is_connected());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let connector = ScriptedConnector::new();
        let mut client = client(&connector);

        client.disconnect();
        assert!(!client.is_connected());

        client.connect(None).unwrap();
        client.disconnect();
        assert!(!client.is_connected());
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[test]
    fn get_status() {
        let connector = ScriptedConnector::new().reply(
            r#"{"success":true,"data":{"player":{"playing":false},"current_podcast":null,"subscription_count":0,"current_index":-1,"connected_clients":1}}"#,
        );
        let mut client = connected(&connector);

        let status = client.get_status().unwrap().completed().unwrap();
        assert_eq!(status.subscription_count, 0);
        assert_eq!(status.current_index, -1);
        assert!(!status.player.playing);
        assert_eq!(connector.written(), "{\"action\":\"get_status\"}\n");
    }

    #[test]
    fn get_status_missing_fields_is_malformed() {
        let connector =
            ScriptedConnector::new().reply(r#"{"success":true,"data":{"player":{"playing":true}}}"#);
        let mut client = connected(&connector);

        let err = client.get_status().unwrap_err();
        assert!(matches!(
            err,
            ClientError::CommunicationFailed(CommunicationError::Codec(_))
        ));
    }

    #[test]
    fn list_podcasts_empty() {
        let connector = ScriptedConnector::new().reply(r#"{"success":true,"data":{"podcasts":[]}}"#);
        let mut client = connected(&connector);

        let podcasts = client.list_podcasts().unwrap().completed().unwrap();
        assert!(podcasts.is_empty());
    }

    #[test]
    fn list_podcasts_keeps_service_order() {
        let connector = ScriptedConnector::new().reply(
            r#"{"success":true,"data":{"podcasts":[
                {"index":0,"name":"B","url":"https://b","description":"","enabled":true,"is_current":true},
                {"index":1,"name":"A","url":"https://a","description":"","enabled":true,"is_current":false}
            ],"current_index":0}}"#
                .replace('\n', "")
                .as_str(),
        );
        let mut client = connected(&connector);

        let podcasts = client.list_podcasts().unwrap().completed().unwrap();
        assert_eq!(podcasts[0], Podcast::new("B", "https://b").current(true).with_index(0));
        assert_eq!(podcasts[1].name, "A");
    }

    #[test]
    fn remove_podcast_refused() {
        let connector = ScriptedConnector::new().reply(r#"{"success":false,"error":"not found"}"#);
        let mut client = connected(&connector);

        let outcome = client.remove_podcast("x").unwrap();
        assert!(!outcome.is_completed());
        assert_eq!(outcome.refusal().map(|r| r.error.as_str()), Some("not found"));
        assert_eq!(outcome.completed(), None);
        assert_eq!(
            connector.written(),
            "{\"action\":\"remove_podcast\",\"identifier\":\"x\"}\n"
        );
    }

    #[test]
    fn refusal_without_message() {
        let connector = ScriptedConnector::new().reply(r#"{"success":false}"#);
        let mut client = connected(&connector);

        let refusal = client.stop().unwrap().into_result().unwrap_err();
        assert_eq!(refusal.error, UNKNOWN_ERROR);
        assert_eq!(refusal.details, None);
    }

    #[test]
    fn add_podcast_passes_payload_through() {
        let connector = ScriptedConnector::new().reply(
            r#"{"success":true,"data":{"message":"Podcast added successfully","name":"Daily","url":"https://d"}}"#,
        );
        let mut client = connected(&connector);

        let data = client
            .add_podcast("Daily", "https://d", "")
            .unwrap()
            .completed()
            .unwrap()
            .unwrap();
        assert_eq!(data["message"], "Podcast added successfully");
        assert_eq!(
            connector.written(),
            "{\"action\":\"add_podcast\",\"name\":\"Daily\",\"url\":\"https://d\",\"description\":\"\"}\n"
        );
    }

    #[test]
    fn add_podcast_without_payload() {
        let connector = ScriptedConnector::new().reply(r#"{"success":true}"#);
        let mut client = connected(&connector);

        let outcome = client.add_podcast("Daily", "https://d", "News").unwrap();
        assert_eq!(outcome, Outcome::Completed(None));
    }

    #[test]
    fn play_current_podcast() {
        let connector = ScriptedConnector::new().reply(
            r#"{"success":true,"data":{"message":"Playing podcast episode","podcast":"Daily","episode":"Ep 1","url":"https://d/1.mp3"}}"#,
        );
        let mut client = connected(&connector);

        let playback = client.play_podcast(None).unwrap().completed().unwrap();
        assert_eq!(playback.episode.as_deref(), Some("Ep 1"));
        assert_eq!(connector.written(), "{\"action\":\"play_podcast\"}\n");
    }

    #[test]
    fn play_url_without_payload() {
        let connector = ScriptedConnector::new().reply(r#"{"success":true}"#);
        let mut client = connected(&connector);

        let playback = client
            .play_podcast(Some("https://d/2.mp3"))
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(playback, Playback::default());
        assert_eq!(
            connector.written(),
            "{\"action\":\"play_podcast\",\"url\":\"https://d/2.mp3\"}\n"
        );
    }

    #[test]
    fn play_refused_with_details() {
        let connector = ScriptedConnector::new()
            .reply(r#"{"success":false,"error":"Playback failed","details":"no audio device"}"#);
        let mut client = connected(&connector);

        let refusal = client.play_podcast(None).unwrap().into_result().unwrap_err();
        assert_eq!(refusal.to_string(), "Playback failed (no audio device)");
    }

    #[test]
    fn pause_and_stop() {
        let connector = ScriptedConnector::new()
            .reply(r#"{"success":true,"data":{"message":"Playback paused"}}"#)
            .reply(r#"{"success":true}"#);
        let mut client = connected(&connector);

        assert_eq!(client.pause().unwrap(), Outcome::Completed(()));
        assert_eq!(client.stop().unwrap(), Outcome::Completed(()));
        assert_eq!(
            connector.written(),
            "{\"action\":\"player_control\",\"command\":\"pause\"}\n{\"action\":\"player_control\",\"command\":\"stop\"}\n"
        );
    }

    #[test]
    fn navigate_next() {
        let connector = ScriptedConnector::new().reply(
            r#"{"success":true,"data":{"message":"Selected next podcast","podcast":{"name":"Daily","url":"https://d","description":""},"index":1}}"#,
        );
        let mut client = connected(&connector);

        let podcast = client.next_podcast().unwrap().completed().unwrap();
        assert_eq!(podcast.name, "Daily");
        assert_eq!(
            connector.written(),
            "{\"action\":\"navigate_podcasts\",\"direction\":\"next\"}\n"
        );
    }

    #[test]
    fn navigate_previous_refused() {
        let connector =
            ScriptedConnector::new().reply(r#"{"success":false,"error":"No podcasts available"}"#);
        let mut client = connected(&connector);

        let outcome = client.previous_podcast().unwrap();
        assert_eq!(
            outcome.refusal().map(|r| r.error.as_str()),
            Some("No podcasts available")
        );
        assert_eq!(
            connector.written(),
            "{\"action\":\"navigate_podcasts\",\"direction\":\"previous\"}\n"
        );
    }

    #[test]
    fn navigate_missing_podcast_is_malformed() {
        let connector = ScriptedConnector::new().reply(r#"{"success":true,"data":{"index":1}}"#);
        let mut client = connected(&connector);

        assert!(client.navigate(Direction::Next).unwrap_err().is_communication());
    }

    #[test]
    fn accessors_require_connection() {
        let connector = ScriptedConnector::new();
        let mut client = client(&connector);

        assert!(matches!(client.get_status(), Err(ClientError::NotConnected)));
        assert!(matches!(client.list_podcasts(), Err(ClientError::NotConnected)));
        assert!(matches!(client.pause(), Err(ClientError::NotConnected)));
        assert!(matches!(
            client.navigate(Direction::Next),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn outcome_helpers() {
        let done: Outcome<u32> = Outcome::Completed(2);
        assert!(done.is_completed());
        assert_eq!(done.clone().map(|v| v * 2), Outcome::Completed(4));
        assert_eq!(done.into_result(), Ok(2));

        let refused: Outcome<u32> = Outcome::Refused(Refusal {
            error: "nope".into(),
            details: None,
        });
        assert_eq!(refused.refusal().unwrap().to_string(), "nope");
        assert_eq!(refused.completed(), None);
    }
}
