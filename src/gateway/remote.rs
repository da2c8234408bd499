use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use url::Url;

use crate::bookmarks::{
    ApiBookmark, ApiCollection, ApiTag, Bookmark, BookmarkCreate, BookmarkUpdate, Collection,
    CollectionCreate, CollectionUpdate, Tag, TagCreate,
};

use super::{backend::Gateway, errors::GatewayError};

/// HTTP/JSON gateway to the bookmarks API.
pub struct GatewayRemote {
    remote_addr: String,
    client: reqwest::Client,
    basic_auth: Option<(String, Option<String>)>,
    bearer_token: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct SuccessResponse {
    #[serde(default)]
    success: bool,
}

impl GatewayRemote {
    pub fn new(
        addr: &str,
        timeout: Duration,
        basic_auth: Option<(String, Option<String>)>,
        bearer_token: Option<String>,
    ) -> Result<GatewayRemote, GatewayError> {
        let remote_addr = addr.strip_suffix("/").unwrap_or(addr).to_string();
        // fail early on a malformed address rather than on the first request
        Url::parse(&remote_addr)?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(GatewayRemote {
            remote_addr,
            client,
            basic_auth,
            bearer_token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(Url::parse(&format!("{}{}", self.remote_addr, path))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::info!("{method} {url}");

        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        match (self.basic_auth.clone(), &self.bearer_token) {
            (Some((username, password)), _) => builder.basic_auth(username, password),
            (None, Some(token)) => builder.bearer_auth(token),
            (None, None) => builder,
        }
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        Ok(self.request(Method::GET, self.url(path)?))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        Ok(self.request(Method::POST, self.url(path)?))
    }

    fn put(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        Ok(self.request(Method::PUT, self.url(path)?))
    }

    fn delete(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        Ok(self.request(Method::DELETE, self.url(path)?))
    }
}

/// The backend keys everything by integer ids; domain ids are their decimal form.
fn parse_id(id: &str) -> Result<u64, GatewayError> {
    id.trim()
        .parse::<u64>()
        .map_err(|_| GatewayError::InvalidId(id.to_string()))
}

fn parse_ids(ids: &[String]) -> Result<Vec<u64>, GatewayError> {
    ids.iter().map(|id| parse_id(id)).collect()
}

/// Turns a non-2xx response into [`GatewayError::Status`], preferring the
/// body's `message`, then its `error`, then the status line.
fn status_error(status: reqwest::StatusCode, text: &str) -> GatewayError {
    let body = match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(_) if !text.trim().is_empty() => Some(Value::String(text.to_string())),
        Err(_) => None,
    };

    let from_body = |key: &str| {
        body.as_ref()
            .and_then(|b| b.get(key))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    };

    let message = from_body("message").or_else(|| from_body("error")).unwrap_or_else(|| {
        format!(
            "Request failed with status {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    });

    GatewayError::Status {
        status: status.as_u16(),
        message,
        body,
    }
}

async fn handle_response<T>(response: Response) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, &text));
    }

    serde_json::from_str::<T>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        err.into()
    })
}

#[async_trait]
impl Gateway for GatewayRemote {
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, GatewayError> {
        let resp = self.get("/bookmarks")?.send().await?;
        let bmarks = handle_response::<Vec<ApiBookmark>>(resp).await?;

        Ok(bmarks.into_iter().map(Bookmark::from).collect())
    }

    async fn get_bookmark(&self, id: &str) -> Result<Bookmark, GatewayError> {
        let resp = self
            .get(&format!("/bookmarks/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<ApiBookmark>(resp).await?.into())
    }

    async fn search_bookmarks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Bookmark>, GatewayError> {
        log::debug!("search: {query:?} limit={limit}");
        let mut url = self.url("/bookmarks/search")?;
        url.query_pairs_mut()
            .append_pair("q", query.trim())
            .append_pair("limit", &limit.to_string());

        let resp = self.request(Method::GET, url).send().await?;
        let bmarks = handle_response::<Vec<ApiBookmark>>(resp).await?;

        Ok(bmarks.into_iter().map(Bookmark::from).collect())
    }

    async fn create_bookmark(
        &self,
        bmark_create: BookmarkCreate,
    ) -> Result<Bookmark, GatewayError> {
        let body = json!({
            "title": bmark_create.title,
            "url": bmark_create.url,
            "description": bmark_create.description,
            "collection_id": parse_id(&bmark_create.collection_id)?,
            "tag_ids": parse_ids(&bmark_create.tag_ids)?,
            "is_favorite": bmark_create.is_favorite,
        });
        let resp = self.post("/create-bookmark")?.json(&body).send().await?;

        Ok(handle_response::<ApiBookmark>(resp).await?.into())
    }

    async fn update_bookmark(
        &self,
        id: &str,
        bmark_update: BookmarkUpdate,
    ) -> Result<Bookmark, GatewayError> {
        let mut body = serde_json::Map::new();
        if let Some(title) = bmark_update.title {
            body.insert("title".into(), json!(title));
        }
        if let Some(url) = bmark_update.url {
            body.insert("url".into(), json!(url));
        }
        if let Some(description) = bmark_update.description {
            body.insert("description".into(), json!(description));
        }
        if let Some(collection_id) = bmark_update.collection_id {
            body.insert("collection_id".into(), json!(parse_id(&collection_id)?));
        }
        if let Some(tag_ids) = bmark_update.tag_ids {
            body.insert("tag_ids".into(), json!(parse_ids(&tag_ids)?));
        }
        if let Some(is_favorite) = bmark_update.is_favorite {
            body.insert("is_favorite".into(), json!(is_favorite));
        }

        let resp = self
            .put(&format!("/bookmarks/{}", parse_id(id)?))?
            .json(&body)
            .send()
            .await?;

        Ok(handle_response::<ApiBookmark>(resp).await?.into())
    }

    async fn delete_bookmark(&self, id: &str) -> Result<bool, GatewayError> {
        let resp = self
            .delete(&format!("/bookmarks/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<SuccessResponse>(resp).await?.success)
    }

    async fn list_favorites(&self) -> Result<Vec<Bookmark>, GatewayError> {
        let resp = self.get("/favorites")?.send().await?;
        let bmarks = handle_response::<Vec<ApiBookmark>>(resp).await?;

        Ok(bmarks.into_iter().map(Bookmark::from).collect())
    }

    async fn add_favorite(&self, id: &str) -> Result<Bookmark, GatewayError> {
        let resp = self
            .post(&format!("/favorites/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<ApiBookmark>(resp).await?.into())
    }

    async fn remove_favorite(&self, id: &str) -> Result<bool, GatewayError> {
        let resp = self
            .delete(&format!("/favorites/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<SuccessResponse>(resp).await?.success)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError> {
        let resp = self.get("/tags")?.send().await?;
        let tags = handle_response::<Vec<ApiTag>>(resp).await?;

        Ok(tags.into_iter().map(Tag::from).collect())
    }

    async fn create_tag(&self, tag_create: TagCreate) -> Result<Tag, GatewayError> {
        let resp = self.post("/create-tags")?.json(&tag_create).send().await?;

        Ok(handle_response::<ApiTag>(resp).await?.into())
    }

    async fn delete_tag(&self, id: &str) -> Result<bool, GatewayError> {
        let resp = self
            .delete(&format!("/tags/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<SuccessResponse>(resp).await?.success)
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, GatewayError> {
        let resp = self.get("/collections")?.send().await?;
        let collections = handle_response::<Vec<ApiCollection>>(resp).await?;

        Ok(collections.into_iter().map(Collection::from).collect())
    }

    async fn get_collection(&self, id: &str) -> Result<Collection, GatewayError> {
        let resp = self
            .get(&format!("/collections/{}", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<ApiCollection>(resp).await?.into())
    }

    async fn create_collection(
        &self,
        collection_create: CollectionCreate,
    ) -> Result<Collection, GatewayError> {
        let resp = self
            .post("/create-collection")?
            .json(&collection_create)
            .send()
            .await?;

        Ok(handle_response::<ApiCollection>(resp).await?.into())
    }

    async fn update_collection(
        &self,
        id: &str,
        collection_update: CollectionUpdate,
    ) -> Result<Collection, GatewayError> {
        let resp = self
            .put(&format!("/collections/{}", parse_id(id)?))?
            .json(&collection_update)
            .send()
            .await?;

        Ok(handle_response::<ApiCollection>(resp).await?.into())
    }

    async fn delete_collection(&self, id: &str) -> Result<bool, GatewayError> {
        let resp = self
            .delete(&format!("/collections/{}/delete", parse_id(id)?))?
            .send()
            .await?;

        Ok(handle_response::<SuccessResponse>(resp).await?.success)
    }
}
