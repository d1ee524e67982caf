//! Notion workspace client.
//!
//! Talks to the public Notion REST API with an integration token. Raw
//! JSON is converted into the closed [`BlockKind`] and [`PropertyValue`]
//! shapes here, so nothing past this module probes for keys.

use async_trait::async_trait;
use recall_core::error::WorkspaceError;
use recall_core::workspace::{
    BlockKind, Column, ContentBlock, Page, PageSummary, PropertyValue, Record, Table,
    TableSummary, WorkspaceProvider,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

pub const UNTITLED: &str = "Untitled";

/// A workspace provider backed by the Notion API.
pub struct NotionClient {
    base_url: String,
    token: String,
    notion_version: String,
    page_size: u32,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        notion_version: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, WorkspaceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| WorkspaceError::Network(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            notion_version: notion_version.into(),
            page_size: page_size.clamp(1, 100),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.notion_version)
    }

    /// Map non-success statuses to workspace errors.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, WorkspaceError> {
        let status = response.status().as_u16();
        match status {
            401 | 403 => Err(WorkspaceError::Unauthorized(
                "Invalid workspace token or the integration lacks access".into(),
            )),
            404 => Err(WorkspaceError::NotFound(response.url().path().to_string())),
            _ if !response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                warn!(status, body = %body, "Workspace API returned error");
                Err(WorkspaceError::Api {
                    status_code: status,
                    message: body,
                })
            }
            _ => Ok(response),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, WorkspaceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| WorkspaceError::Network(e.to_string()))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| WorkspaceError::InvalidResponse(format!("Failed to parse response: {e}")))
    }

    /// Run a paginated POST endpoint (search, database query) to the end.
    async fn post_all(&self, path: &str, body: Value) -> Result<Vec<Value>, WorkspaceError> {
        let url = self.url(path);
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = body.clone();
            body["page_size"] = json!(self.page_size);
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }
            let list: ApiList = self
                .send(self.request(reqwest::Method::POST, &url).json(&body))
                .await?;
            let (page, next) = list.into_parts();
            results.extend(page);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(results)
    }

    /// Direct children of a block or page, every page of results.
    async fn children(&self, block_id: &str) -> Result<Vec<ContentBlock>, WorkspaceError> {
        let url = self.url(&format!("blocks/{block_id}/children"));
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![("page_size", self.page_size.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("start_cursor", cursor.clone()));
            }
            let list: ApiList = self
                .send(self.request(reqwest::Method::GET, &url).query(&query))
                .await?;
            blocks.extend(list.results.iter().filter_map(block_from_json));
            match list.next() {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(blocks)
    }

    async fn search(&self, object: &str) -> Result<Vec<Value>, WorkspaceError> {
        debug!(object, "Searching workspace");
        self.post_all(
            "search",
            json!({"filter": {"property": "object", "value": object}}),
        )
        .await
    }
}

#[async_trait]
impl WorkspaceProvider for NotionClient {
    fn name(&self) -> &str {
        "notion"
    }

    async fn list_pages(&self) -> Result<Vec<PageSummary>, WorkspaceError> {
        let results = self.search("page").await?;
        Ok(results.iter().filter_map(page_summary_from_json).collect())
    }

    async fn get_page(&self, id: &str) -> Result<Option<Page>, WorkspaceError> {
        debug!(page = id, "Fetching page");
        let page: ApiPage = match self
            .send(self.request(reqwest::Method::GET, &self.url(&format!("pages/{id}"))))
            .await
        {
            Ok(page) => page,
            Err(WorkspaceError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut blocks = self.children(id).await?;
        // One level deep; a failing child fetch leaves its parent childless
        for block in blocks.iter_mut().filter(|b| b.has_children) {
            match self.children(&block.id).await {
                Ok(children) => block.children = children,
                Err(e) => warn!(block = %block.id, error = %e, "Skipping child blocks"),
            }
        }

        Ok(Some(Page {
            id: page.id,
            title: page_title(&page.properties),
            url: page.url,
            last_edited_time: page.last_edited_time,
            blocks,
        }))
    }

    async fn list_tables(&self) -> Result<Vec<TableSummary>, WorkspaceError> {
        let results = self.search("database").await?;
        Ok(results
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<ApiDatabase>(raw).ok())
            .map(|db| TableSummary {
                title: db.title(),
                id: db.id,
            })
            .collect())
    }

    async fn get_table(&self, id: &str) -> Result<Option<Table>, WorkspaceError> {
        debug!(database = id, "Fetching database");
        let db: ApiDatabase = match self
            .send(self.request(reqwest::Method::GET, &self.url(&format!("databases/{id}"))))
            .await
        {
            Ok(db) => db,
            Err(WorkspaceError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let rows = self
            .post_all(&format!("databases/{id}/query"), json!({}))
            .await?;
        let records = rows
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<ApiPage>(raw).ok())
            .map(|row| record_from_properties(&row.properties))
            .collect();

        Ok(Some(Table {
            title: db.title(),
            schema: schema_from_properties(&db.properties),
            id: db.id,
            records,
        }))
    }
}

// --- API wire types ---

#[derive(Debug, Deserialize)]
struct ApiList {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl ApiList {
    fn next(&self) -> Option<String> {
        if self.has_more {
            self.next_cursor.clone()
        } else {
            None
        }
    }

    /// The results of this page and the cursor of the next one.
    fn into_parts(self) -> (Vec<Value>, Option<String>) {
        let next = self.next();
        (self.results, next)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiRichText {
    #[serde(default)]
    plain_text: String,
}

fn concat_runs(runs: &[ApiRichText]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}

#[derive(Debug, Deserialize)]
struct ApiBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    has_children: bool,
    /// The per-type payload lives under a key named after the type
    #[serde(flatten)]
    payload: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiBlockPayload {
    #[serde(default)]
    rich_text: Vec<ApiRichText>,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    language: String,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    last_edited_time: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ApiDatabase {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Vec<ApiRichText>,
    /// Declared column order is kept as received
    #[serde(default)]
    properties: Map<String, Value>,
}

impl ApiDatabase {
    fn title(&self) -> String {
        non_empty_or_untitled(concat_runs(&self.title))
    }
}

#[derive(Debug, Deserialize)]
struct ApiName {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiDate {
    #[serde(default)]
    start: String,
}

/// The property shapes the flattener understands.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiProperty {
    Title {
        #[serde(default)]
        title: Vec<ApiRichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<ApiRichText>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<ApiName>,
    },
    Status {
        status: Option<ApiName>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<ApiName>,
    },
    Date {
        date: Option<ApiDate>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl ApiProperty {
    fn into_value(self) -> Option<PropertyValue> {
        match self {
            ApiProperty::Title { title: runs } | ApiProperty::RichText { rich_text: runs } => {
                Some(PropertyValue::Text(concat_runs(&runs)))
            }
            ApiProperty::Number { number } => number.map(PropertyValue::Number),
            ApiProperty::Select { select: option } | ApiProperty::Status { status: option } => {
                option.map(|o| PropertyValue::Text(o.name))
            }
            ApiProperty::MultiSelect { multi_select } => Some(PropertyValue::List(
                multi_select.into_iter().map(|o| o.name).collect(),
            )),
            ApiProperty::Date { date } => date.map(|d| PropertyValue::Date(d.start)),
            ApiProperty::Checkbox { checkbox } => Some(PropertyValue::Bool(checkbox)),
            ApiProperty::Url { url: text }
            | ApiProperty::Email { email: text }
            | ApiProperty::PhoneNumber { phone_number: text } => text.map(PropertyValue::Text),
            ApiProperty::Unsupported => None,
        }
    }
}

// --- JSON to content model ---

fn block_from_json(raw: &Value) -> Option<ContentBlock> {
    let block: ApiBlock = serde_json::from_value(raw.clone()).ok()?;
    let payload: ApiBlockPayload = block
        .payload
        .get(&block.kind)
        .and_then(|p| serde_json::from_value(p.clone()).ok())
        .unwrap_or_default();

    let kind = match block.kind.as_str() {
        "heading_1" => BlockKind::Heading1,
        "heading_2" => BlockKind::Heading2,
        "heading_3" => BlockKind::Heading3,
        "paragraph" => BlockKind::Paragraph,
        "bulleted_list_item" => BlockKind::BulletedItem,
        "numbered_list_item" => BlockKind::NumberedItem,
        "to_do" => BlockKind::Checklist {
            checked: payload.checked,
        },
        "quote" => BlockKind::Quote,
        "code" => BlockKind::Code {
            language: payload.language.clone(),
        },
        "divider" => BlockKind::Divider,
        other => BlockKind::Other {
            name: other.to_string(),
        },
    };

    Some(ContentBlock {
        id: block.id,
        kind,
        text: payload.rich_text.into_iter().map(|r| r.plain_text).collect(),
        has_children: block.has_children,
        children: Vec::new(),
    })
}

fn property_from_json(raw: &Value) -> Option<PropertyValue> {
    serde_json::from_value::<ApiProperty>(raw.clone())
        .ok()?
        .into_value()
}

fn non_empty_or_untitled(title: String) -> String {
    if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Title from the `title` or `Name` property, else any title-typed one.
fn page_title(properties: &Map<String, Value>) -> String {
    let named = ["title", "Name"]
        .iter()
        .filter_map(|key| properties.get(*key));
    let typed = properties
        .values()
        .filter(|p| p.get("type").and_then(Value::as_str) == Some("title"));

    let title = named
        .chain(typed)
        .filter_map(|raw| match property_from_json(raw) {
            Some(PropertyValue::Text(text)) if !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .next()
        .unwrap_or_default();
    non_empty_or_untitled(title)
}

fn page_summary_from_json(raw: &Value) -> Option<PageSummary> {
    let page: ApiPage = serde_json::from_value(raw.clone()).ok()?;
    Some(PageSummary {
        title: page_title(&page.properties),
        id: page.id,
        url: page.url,
        last_edited_time: page.last_edited_time,
    })
}

fn schema_from_properties(properties: &Map<String, Value>) -> Vec<Column> {
    properties
        .iter()
        .map(|(name, raw)| {
            let kind = raw.get("type").and_then(Value::as_str).unwrap_or("unknown");
            Column::new(name.as_str(), kind)
        })
        .collect()
}

fn record_from_properties(properties: &Map<String, Value>) -> Record {
    Record {
        values: properties
            .iter()
            .filter_map(|(name, raw)| Some((name.clone(), property_from_json(raw)?)))
            .collect(),
    }
}
