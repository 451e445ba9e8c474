//! HTTP + WebSocket gateway against `hearth-api` and `hearth-gateway`
//!
//! REST calls go through one `reqwest::Client`. Push subscriptions share a
//! single WebSocket; topics are refcounted locally so the server sees one
//! SUBSCRIBE per topic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use hearth_core::{ChangeNotice, ChangeTopic, ReactionKind, Snowflake};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::{RemoteGateway, SubscriptionCloser, SubscriptionHandle, SUBSCRIPTION_BUFFER};
use crate::error::{GatewayError, GatewayResult};
use crate::models::{AnalyticsEvent, Page, PublicProfile, ReactionRecord, StoryRecord};
use crate::session::{Principal, Session};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HEARTBEAT_MS: u64 = 30_000;

const OP_CHANGE: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_SUBSCRIBE: u8 = 2;
const OP_UNSUBSCRIBE: u8 = 3;
const OP_ERROR: u8 = 9;
const OP_HELLO: u8 = 10;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    op: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChangeFrame {
    topic: ChangeTopic,
    #[serde(flatten)]
    notice: ChangeNotice,
}

/// ERROR frame body; `topic` is set when a SUBSCRIBE was rejected.
#[derive(Debug, Deserialize)]
struct RejectionFrame {
    code: String,
    message: String,
    #[serde(default)]
    topic: Option<ChangeTopic>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AuthBody {
    access_token: String,
    refresh_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Snowflake,
}

impl From<AuthBody> for Session {
    fn from(body: AuthBody) -> Self {
        Session::SignedIn(Principal {
            user_id: body.user.id,
            access_token: body.access_token,
            refresh_token: Some(body.refresh_token),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MatchedStories {
    story_ids: Vec<Snowflake>,
}

enum PushCommand {
    Subscribe {
        id: u64,
        topic: ChangeTopic,
        sender: mpsc::Sender<ChangeNotice>,
    },
    Unsubscribe {
        id: u64,
    },
}

pub struct HttpGateway {
    client: Client,
    api_url: String,
    realtime_url: String,
    push: Mutex<Option<mpsc::UnboundedSender<PushCommand>>>,
    next_subscription: AtomicU64,
}

impl HttpGateway {
    /// `api_url` includes the version prefix, e.g. `http://localhost:8080/api/v1`;
    /// `realtime_url` is the gateway socket, e.g. `ws://localhost:8081/realtime`.
    pub fn new(api_url: impl Into<String>, realtime_url: impl Into<String>) -> GatewayResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            realtime_url: realtime_url.into(),
            push: Mutex::new(None),
            next_subscription: AtomicU64::new(1),
        })
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> GatewayResult<Session> {
        let body: AuthBody = fetch(self.client.post(self.url("/auth/sign-up")).json(&json!({
            "email": email,
            "password": password,
            "display_name": display_name,
        })))
        .await?;
        Ok(body.into())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let body: AuthBody = fetch(
            self.client
                .post(self.url("/auth/sign-in"))
                .json(&json!({ "email": email, "password": password })),
        )
        .await?;
        Ok(body.into())
    }

    /// Revokes the refresh token; the session should be dropped afterwards.
    pub async fn sign_out(&self, session: &Session) -> GatewayResult<()> {
        let Some(refresh_token) = session.principal().and_then(|p| p.refresh_token.as_deref())
        else {
            return Ok(());
        };
        check(
            self.client
                .post(self.url("/auth/sign-out"))
                .json(&json!({ "refresh_token": refresh_token }))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn reaction_url(&self, story_id: Snowflake, kind: ReactionKind) -> String {
        self.url(&format!("/stories/{story_id}/reactions/{kind}/@me"))
    }

    async fn push_channel(&self) -> GatewayResult<mpsc::UnboundedSender<PushCommand>> {
        let mut push = self.push.lock().await;
        if let Some(commands) = push.as_ref().filter(|c| !c.is_closed()) {
            return Ok(commands.clone());
        }

        let (socket, _) = connect_async(self.realtime_url.as_str()).await?;
        info!(url = %self.realtime_url, "Push channel connected");
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_push(socket, receiver));
        *push = Some(commands.clone());
        Ok(commands)
    }
}

fn authorized(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.principal() {
        Some(principal) => request.bearer_auth(&principal.access_token),
        None => request,
    }
}

async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthenticated),
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        _ => {
            let (code, message) = match response.json::<ErrorEnvelope>().await {
                Ok(body) => (body.error.code, body.error.message),
                Err(_) => ("UNKNOWN".to_string(), status.to_string()),
            };
            Err(GatewayError::Status {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}

async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> GatewayResult<T> {
    let response = check(request.send().await?).await?;
    Ok(response.json().await?)
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn list_reactions(&self, story_id: Snowflake) -> GatewayResult<Vec<ReactionRecord>> {
        fetch(self.client.get(self.url(&format!("/stories/{story_id}/reactions")))).await
    }

    async fn my_reactions(
        &self,
        principal: &Principal,
        story_id: Snowflake,
    ) -> GatewayResult<Vec<ReactionRecord>> {
        fetch(
            self.client
                .get(self.url(&format!("/stories/{story_id}/reactions/@me")))
                .bearer_auth(&principal.access_token),
        )
        .await
    }

    async fn add_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()> {
        let request = self
            .client
            .put(self.reaction_url(story_id, kind))
            .bearer_auth(&principal.access_token);
        check(request.send().await?).await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()> {
        let request = self
            .client
            .delete(self.reaction_url(story_id, kind))
            .bearer_auth(&principal.access_token);
        check(request.send().await?).await?;
        Ok(())
    }

    async fn list_feed(
        &self,
        before: Option<Snowflake>,
        limit: usize,
    ) -> GatewayResult<Page<StoryRecord>> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }
        fetch(self.client.get(self.url("/stories")).query(&query)).await
    }

    async fn get_story(
        &self,
        session: &Session,
        story_id: Snowflake,
    ) -> GatewayResult<StoryRecord> {
        let request = self.client.get(self.url(&format!("/stories/{story_id}")));
        fetch(authorized(request, session)).await
    }

    async fn get_profile(&self, user_id: Snowflake) -> GatewayResult<PublicProfile> {
        fetch(self.client.get(self.url(&format!("/profiles/{user_id}")))).await
    }

    async fn match_stories_by_moods(&self, moods: &[String]) -> GatewayResult<Vec<Snowflake>> {
        let matched: MatchedStories = fetch(
            self.client
                .post(self.url("/rpc/match_stories_by_moods"))
                .json(&json!({ "moods": moods })),
        )
        .await?;
        Ok(matched.story_ids)
    }

    async fn record_event(&self, session: &Session, event: &AnalyticsEvent) -> GatewayResult<()> {
        let request = self.client.post(self.url("/rpc/record_event")).json(event);
        check(authorized(request, session).send().await?).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: ChangeTopic) -> GatewayResult<SubscriptionHandle> {
        topic.validate()?;
        let commands = self.push_channel().await?;

        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let (sender, notices) = mpsc::channel(SUBSCRIPTION_BUFFER);
        commands
            .send(PushCommand::Subscribe {
                id,
                topic: topic.clone(),
                sender,
            })
            .map_err(|_| GatewayError::ChannelClosed)?;

        let closer = SubscriptionCloser::new(move || {
            commands.send(PushCommand::Unsubscribe { id }).ok();
        });
        Ok(SubscriptionHandle::new(topic, notices, closer))
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("api_url", &self.api_url)
            .field("realtime_url", &self.realtime_url)
            .finish_non_exhaustive()
    }
}

fn frame(op: u8, topic: Option<&ChangeTopic>) -> GatewayResult<Message> {
    let d = topic.map(serde_json::to_value).transpose()?;
    Ok(Message::Text(serde_json::to_string(&Frame { op, d })?))
}

/// Topic and notice of a CHANGE frame; `None` for any other frame.
fn parse_change(frame: &Frame) -> Option<(ChangeTopic, ChangeNotice)> {
    if frame.op != OP_CHANGE {
        return None;
    }
    let change: ChangeFrame = serde_json::from_value(frame.d.clone()?).ok()?;
    Some((change.topic, change.notice))
}

/// Owns the socket. Ends when the socket closes or every `HttpGateway`
/// handle is gone; dropping the routes closes all subscriber streams.
async fn run_push(socket: Socket, mut commands: mpsc::UnboundedReceiver<PushCommand>) {
    let (mut sink, mut stream) = socket.split();
    let mut routes = Routes::new();
    let period = Duration::from_millis(DEFAULT_HEARTBEAT_MS);
    let mut heartbeat = interval_at(Instant::now() + period, period);

    loop {
        let outgoing = tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    PushCommand::Subscribe { id, topic, sender } => {
                        let first = !routes.values().any(|(t, _)| *t == topic);
                        routes.insert(id, (topic.clone(), sender));
                        first.then(|| frame(OP_SUBSCRIBE, Some(&topic)))
                    }
                    PushCommand::Unsubscribe { id } => routes.remove(&id).and_then(|(topic, _)| {
                        let last = !routes.values().any(|(t, _)| *t == topic);
                        last.then(|| frame(OP_UNSUBSCRIBE, Some(&topic)))
                    }),
                }
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Frame>(&text) {
                            Ok(frame) => handle_frame(&frame, &mut routes, &mut heartbeat),
                            Err(e) => debug!(error = %e, "Ignoring undecodable frame"),
                        }
                        None
                    }
                    Some(Ok(Message::Close(close))) => {
                        info!(?close, "Push channel closed by server");
                        break;
                    }
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        warn!(error = %e, "Push channel error");
                        break;
                    }
                    None => break,
                }
            }
            _ = heartbeat.tick() => Some(frame(OP_HEARTBEAT, None)),
        };

        if let Some(outgoing) = outgoing {
            let sent = match outgoing {
                Ok(message) => sink.send(message).await.map_err(GatewayError::from),
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                warn!(error = %e, "Failed to write to push channel");
                break;
            }
        }
    }

    sink.close().await.ok();
    debug!(subscriptions = routes.len(), "Push channel task ended");
}

type Routes = HashMap<u64, (ChangeTopic, mpsc::Sender<ChangeNotice>)>;

fn handle_frame(
    frame: &Frame,
    routes: &mut Routes,
    heartbeat: &mut tokio::time::Interval,
) {
    match frame.op {
        OP_CHANGE => {
            let Some((topic, notice)) = parse_change(frame) else {
                debug!("Ignoring malformed CHANGE frame");
                return;
            };
            for (t, sender) in routes.values() {
                if *t == topic && sender.try_send(notice.clone()).is_err() {
                    debug!(topic = %topic, "Subscriber lagging, notice dropped");
                }
            }
        }
        OP_HELLO => {
            let interval_ms = frame
                .d
                .as_ref()
                .and_then(|d| d.get("heartbeat_interval"))
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_HEARTBEAT_MS)
                .max(1);
            let period = Duration::from_millis(interval_ms);
            *heartbeat = interval_at(Instant::now() + period, period);
        }
        OP_ERROR => {
            let rejection = frame
                .d
                .clone()
                .and_then(|d| serde_json::from_value::<RejectionFrame>(d).ok());
            match rejection {
                Some(RejectionFrame {
                    code,
                    message,
                    topic: Some(topic),
                }) => {
                    // Ending the streams lets holders notice and subscribe again.
                    let before = routes.len();
                    routes.retain(|_, (t, _)| *t != topic);
                    warn!(
                        topic = %topic,
                        code = %code,
                        message = %message,
                        dropped = before - routes.len(),
                        "Push channel rejected subscription"
                    );
                }
                _ => warn!(payload = ?frame.d, "Push channel rejected a request"),
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{ChangeOp, WatchedTable};

    #[test]
    fn change_frame_carries_topic_and_notice() {
        let frame: Frame = serde_json::from_str(
            r#"{"op":0,"d":{"topic":{"table":"reactions","filter":{"column":"story_id","value":"7"}},"table":"reactions","op":"INSERT","key":{"story_id":"7","user_id":"9"}}}"#,
        )
        .unwrap();

        let (topic, notice) = parse_change(&frame).unwrap();
        assert_eq!(topic, ChangeTopic::story_reactions(Snowflake::new(7)));
        assert_eq!(notice.op, ChangeOp::Insert);
        assert_eq!(notice.table, WatchedTable::Reactions);
        assert_eq!(notice.key_value("user_id"), Some("9"));
    }

    #[test]
    fn other_frames_are_not_changes() {
        let hello: Frame = serde_json::from_str(r#"{"op":10,"d":{"heartbeat_interval":100}}"#).unwrap();
        assert!(parse_change(&hello).is_none());
    }

    #[test]
    fn subscribe_frame_shape() {
        let topic = ChangeTopic::table(WatchedTable::Stories);
        let Message::Text(text) = frame(OP_SUBSCRIBE, Some(&topic)).unwrap() else {
            panic!("expected text frame");
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["op"], 2);
        assert_eq!(value["d"]["table"], "stories");

        let Message::Text(text) = frame(OP_HEARTBEAT, None).unwrap() else {
            panic!("expected text frame");
        };
        assert_eq!(text, r#"{"op":1}"#);
    }

    #[tokio::test]
    async fn rejected_subscription_ends_its_streams() {
        let rejected = ChangeTopic::story_reactions(Snowflake::new(5));
        let kept = ChangeTopic::table(WatchedTable::Reactions);
        let (tx_a, mut rx_a) = mpsc::channel(1);
        let (tx_b, mut rx_b) = mpsc::channel(1);
        let (tx_c, mut rx_c) = mpsc::channel(1);
        let mut routes = Routes::new();
        routes.insert(1, (rejected.clone(), tx_a));
        routes.insert(2, (rejected.clone(), tx_b));
        routes.insert(3, (kept, tx_c));

        let frame: Frame = serde_json::from_value(json!({
            "op": OP_ERROR,
            "d": {
                "code": "TOO_MANY_SUBSCRIPTIONS",
                "message": "At most 256 topics per connection",
                "topic": rejected,
            }
        }))
        .unwrap();
        let period = Duration::from_secs(30);
        let mut heartbeat = interval_at(Instant::now() + period, period);
        handle_frame(&frame, &mut routes, &mut heartbeat);

        assert_eq!(routes.len(), 1);
        assert!(matches!(rx_a.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
        assert!(matches!(rx_b.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
        assert!(matches!(rx_c.try_recv(), Err(mpsc::error::TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn error_without_topic_keeps_routes() {
        let (tx, _rx) = mpsc::channel(1);
        let mut routes = Routes::new();
        routes.insert(1, (ChangeTopic::table(WatchedTable::Stories), tx));

        let frame: Frame = serde_json::from_str(
            r#"{"op":9,"d":{"code":"INVALID_PAYLOAD","message":"bad frame"}}"#,
        )
        .unwrap();
        let period = Duration::from_secs(30);
        let mut heartbeat = interval_at(Instant::now() + period, period);
        handle_frame(&frame, &mut routes, &mut heartbeat);
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn api_url_is_normalized() {
        let gateway = HttpGateway::new("http://localhost:8080/api/v1/", "ws://localhost:8081/realtime")
            .unwrap();
        assert_eq!(
            gateway.url("/stories"),
            "http://localhost:8080/api/v1/stories"
        );
        assert_eq!(
            gateway.reaction_url(Snowflake::new(3), ReactionKind::Hope),
            "http://localhost:8080/api/v1/stories/3/reactions/hope/@me"
        );
    }
}
