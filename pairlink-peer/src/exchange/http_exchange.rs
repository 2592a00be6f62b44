use crate::error::ExchangeError;
use crate::exchange::Exchange;
use async_trait::async_trait;
use pairlink_core::{
    AppendReceipt, CandidateRecord, Entry, ErrorBody, ErrorCode, RoomId, Slot, SlotValue,
};
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Exchange`] backed by the `pairlink-server` HTTP API.
#[derive(Clone)]
pub struct HttpExchange {
    client: Client,
    base: Url,
}

impl HttpExchange {
    pub fn new(base_url: &str) -> Result<Self, ExchangeError> {
        let base = Url::parse(base_url)
            .map_err(|e| ExchangeError::Rejected(format!("invalid server url '{base_url}': {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::Unavailable(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn slot_url(&self, room: &RoomId, slot: Slot) -> Result<Url, ExchangeError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ExchangeError::Rejected(format!("'{}' cannot be a base url", self.base)))?
            .pop_if_empty()
            .extend(["rooms", room.as_str(), slot.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl Exchange for HttpExchange {
    async fn put(&self, room: &RoomId, entry: Entry) -> Result<usize, ExchangeError> {
        let slot = entry.slot();
        let url = self.slot_url(room, slot)?;

        let request = match &entry {
            Entry::Description(desc) => self.client.put(url).json(desc),
            Entry::Candidate(record) => self.client.post(url).json(record),
        };
        let resp = request.send().await.map_err(unavailable)?;
        let resp = error_for_status(resp, slot).await?;

        match entry {
            Entry::Description(_) => Ok(1),
            Entry::Candidate(_) => {
                let receipt: AppendReceipt = resp.json().await.map_err(decode)?;
                debug!("Room {} now holds {} candidate(s)", room, receipt.len);
                Ok(receipt.len)
            }
        }
    }

    async fn get(&self, room: &RoomId, slot: Slot) -> Result<Option<SlotValue>, ExchangeError> {
        let url = self.slot_url(room, slot)?;
        let resp = self.client.get(url).send().await.map_err(unavailable)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = error_for_status(resp, slot).await?;

        let value = match slot {
            Slot::Candidates => SlotValue::Candidates(resp.json().await.map_err(decode)?),
            Slot::Offer | Slot::Answer => SlotValue::Description(resp.json().await.map_err(decode)?),
        };
        Ok(Some(value))
    }

    async fn candidates_since(
        &self,
        room: &RoomId,
        from: usize,
    ) -> Result<Vec<CandidateRecord>, ExchangeError> {
        let mut url = self.slot_url(room, Slot::Candidates)?;
        url.query_pairs_mut().append_pair("from", &from.to_string());

        let resp = self.client.get(url).send().await.map_err(unavailable)?;
        let resp = error_for_status(resp, Slot::Candidates).await?;
        resp.json().await.map_err(decode)
    }
}

fn unavailable(err: reqwest::Error) -> ExchangeError {
    ExchangeError::Unavailable(err.to_string())
}

fn decode(err: reqwest::Error) -> ExchangeError {
    ExchangeError::Decode(err.to_string())
}

async fn error_for_status(resp: Response, slot: Slot) -> Result<Response, ExchangeError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let code = serde_json::from_str::<ErrorBody>(&text).ok().map(|b| b.code);

    Err(match code {
        Some(ErrorCode::RoomNotFound | ErrorCode::SlotEmpty) => ExchangeError::RoomNotFound,
        Some(ErrorCode::SlotTaken) => ExchangeError::SlotTaken(slot),
        Some(ErrorCode::RoomFull) => ExchangeError::RoomFull,
        Some(ErrorCode::KindMismatch | ErrorCode::BadRequest) => ExchangeError::Rejected(text),
        None if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
            ExchangeError::Unavailable(status.to_string())
        }
        None if status == StatusCode::NOT_FOUND => ExchangeError::RoomNotFound,
        None => ExchangeError::Rejected(format!("{status}: {text}")),
    })
}
