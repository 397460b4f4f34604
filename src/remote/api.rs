use super::ApiError;
use crate::flow::{FlowId, FlowLevel, FlowStyle, Side};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Blocking client for the remote flow store. The base URL comes from
/// settings and can be overridden with `FLOWSMITH_API_BASE`.
#[derive(Debug, Clone)]
pub struct FlowApiClient {
    api_base: String,
    auth_token: Option<String>,
    agent: ureq::Agent,
}

/// Write body for create/update. `position` restates the array index; the
/// server echoes it back but readers trust array order only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPayload {
    pub title: String,
    pub style: FlowStyle,
    pub level: FlowLevel,
    pub target_duration_minutes: u32,
    pub items: Vec<FlowItemPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowItemPayload {
    pub source_item_id: String,
    pub position: usize,
    pub duration_seconds: u32,
    pub side: Side,
    #[serde(default)]
    pub notes: String,
}

/// Owned flow as returned by the store, items carrying the resolved catalog
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    pub id: FlowId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub style: FlowStyle,
    #[serde(default)]
    pub level: FlowLevel,
    #[serde(default)]
    pub target_duration_minutes: u32,
    #[serde(default)]
    pub items: Vec<FlowItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowItemRecord {
    pub source_item_id: String,
    #[serde(default)]
    pub source_item_slug: String,
    #[serde(default)]
    pub source_item_name: String,
    #[serde(default)]
    pub source_item_image: Option<String>,
    #[serde(default)]
    pub position: usize,
    pub duration_seconds: u32,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub notes: String,
}

/// Shared flow fetched by slug; carries no owned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFlowRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub style: FlowStyle,
    #[serde(default)]
    pub level: FlowLevel,
    #[serde(default)]
    pub target_duration_minutes: u32,
    #[serde(default)]
    pub items: Vec<FlowItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: FlowId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub slug: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl FlowApiClient {
    pub fn new(api_base: &str, auth_token: Option<String>, timeout_seconds: u64) -> Self {
        let api_base = std::env::var("FLOWSMITH_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| api_base.to_string());
        let timeout = if timeout_seconds == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        } else {
            timeout_seconds
        };
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .build();
        Self {
            api_base,
            auth_token,
            agent,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match self.auth_token.as_deref() {
            Some(token) => request.set("authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.agent.get(&self.endpoint(path)))
            .call()
            .map_err(map_request_error)?;
        decode_json(response)
    }

    fn send_flow(
        &self,
        request: ureq::Request,
        payload: &FlowPayload,
    ) -> Result<SaveResponse, ApiError> {
        let response = self
            .authorize(request)
            .send_json(payload)
            .map_err(map_request_error)?;
        decode_json(response)
    }

    pub fn list_flows(&self) -> Result<Vec<FlowRecord>, ApiError> {
        self.get_json("flows")
    }

    pub fn fetch_flow(&self, id: &FlowId) -> Result<FlowRecord, ApiError> {
        self.get_json(&format!("flows/{}", urlencoding::encode(id.as_str())))
    }

    pub fn create_flow(&self, payload: &FlowPayload) -> Result<SaveResponse, ApiError> {
        self.send_flow(self.agent.post(&self.endpoint("flows")), payload)
    }

    pub fn update_flow(&self, id: &FlowId, payload: &FlowPayload) -> Result<SaveResponse, ApiError> {
        let url = self.endpoint(&format!("flows/{}", urlencoding::encode(id.as_str())));
        self.send_flow(self.agent.put(&url), payload)
    }

    pub fn delete_flow(&self, id: &FlowId) -> Result<(), ApiError> {
        self.authorize(
            self.agent
                .delete(&self.endpoint(&format!("flows/{}", urlencoding::encode(id.as_str())))),
        )
        .call()
        .map_err(map_request_error)?;
        Ok(())
    }

    pub fn fetch_public_flow(&self, slug: &str) -> Result<PublicFlowRecord, ApiError> {
        let response = self
            .agent
            .get(&self.endpoint(&format!("flows/public/{}", urlencoding::encode(slug))))
            .call()
            .map_err(map_public_request_error)?;
        decode_json(response)
    }

    pub fn share_flow(&self, id: &FlowId) -> Result<ShareRecord, ApiError> {
        let response = self
            .authorize(
                self.agent
                    .post(&self.endpoint(&format!("flows/{}/share", urlencoding::encode(id.as_str())))),
            )
            .send_json(serde_json::json!({}))
            .map_err(map_request_error)?;
        decode_json(response)
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(response: ureq::Response) -> Result<T, ApiError> {
    response
        .into_json::<T>()
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn rejection_message(response: ureq::Response) -> String {
    let body = response.into_string().unwrap_or_default();
    if body.trim().is_empty() {
        return "request rejected".to_string();
    }
    body
}

fn map_request_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(401, _) => ApiError::AuthRequired,
        ureq::Error::Status(404, _) => ApiError::NotFound,
        ureq::Error::Status(400, response) | ureq::Error::Status(422, response) => {
            ApiError::Rejected(rejection_message(response))
        }
        ureq::Error::Status(status, _) => ApiError::Server { status },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// Public share links have their own status vocabulary: 410 marks an expired
/// link, and every other non-2xx reads as not-found.
fn map_public_request_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(410, _) => ApiError::ExpiredLink,
        ureq::Error::Status(_, _) => ApiError::NotFound,
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}
