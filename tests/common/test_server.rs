use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

use bffcli::config::{AuthConfig, ServicesConfig, ZoneConfig};
use bffcli::server::{AppState, create_router};
use bffcli::services::Services;
use bffcli::store::{SqliteStore, Store};

pub const CLI_SECRET: &str = "c2FsdHNhbHRzYWx0c2FsdA==";
pub const PROJECT: &str = "PRJ";

/// Graph, file-info, transfer, HPC, KG and provenance services rolled into
/// one fake listening on a single port.
pub struct FakeUpstream {
    pub graph_calls: AtomicUsize,
    users: Vec<Value>,
    projects: Vec<Value>,
    datasets: Vec<Value>,
    entities: Vec<Value>,
    relations: Vec<(i64, i64, &'static str)>,
}

impl FakeUpstream {
    fn seeded() -> Self {
        let user = |id: i64, name: &str, role: &str, status: &str| {
            json!({"id": id, "labels": ["User"], "name": name, "role": role, "status": status})
        };
        let entity = |geid: &str, labels: &[&str], name: &str, folder: &str, uploader: &str| {
            let display_path = if folder.is_empty() {
                name.to_string()
            } else {
                format!("{folder}/{name}")
            };
            json!({
                "id": 1000,
                "labels": labels,
                "global_entity_id": geid,
                "project_code": PROJECT,
                "name": name,
                "folder_relative_path": folder,
                "display_path": display_path,
                "uploader": uploader,
                "archived": false,
            })
        };

        let mut trashed = entity("f-trash", &["File", "Greenroom"], "old.txt", "bob", "bob");
        trashed["archived"] = json!(true);

        Self {
            graph_calls: AtomicUsize::new(0),
            users: vec![
                user(1, "alice", "admin", "active"),
                user(2, "bob", "member", "active"),
                user(3, "carol", "member", "active"),
                user(4, "dave", "member", "disabled"),
                user(5, "erin", "member", "active"),
            ],
            projects: vec![
                json!({"id": 100, "labels": ["Container"], "code": PROJECT, "name": "Project"}),
                json!({"id": 101, "labels": ["Container"], "code": "OTHER", "name": "Other"}),
            ],
            datasets: vec![json!({
                "id": 200,
                "labels": ["Dataset"],
                "code": "DS1",
                "creator": "bob",
                "global_entity_id": "ds-geid",
            })],
            entities: vec![
                entity("f-bob", &["File", "Greenroom"], "a.txt", "bob/raw", "bob"),
                entity("f-carol", &["File", "Greenroom"], "b.txt", "carol", "carol"),
                entity("f-core", &["File", "VRECore"], "c.txt", "bob", "bob"),
                entity("folder-bob", &["Folder", "Greenroom"], "bob", "", "bob"),
                entity("folder-raw", &["Folder", "Greenroom"], "raw", "bob", "bob"),
                trashed,
            ],
            relations: vec![
                (2, 100, "collaborator"),
                (3, 100, "contributor"),
                (4, 100, "collaborator"),
            ],
        }
    }

    fn count_graph_call(&self) {
        self.graph_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn project_by_id(&self, id: i64) -> Option<&Value> {
        self.projects.iter().find(|p| p["id"] == id)
    }

    fn user_id(&self, name: &str) -> Option<i64> {
        self.users
            .iter()
            .find(|u| u["name"] == name)
            .and_then(|u| u["id"].as_i64())
    }
}

type Shared = Arc<FakeUpstream>;

fn has_labels(node: &Value, labels: &Value) -> bool {
    let wanted: Vec<&Value> = match labels {
        Value::Array(list) => list.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    };
    let node_labels = node["labels"].as_array().cloned().unwrap_or_default();
    wanted.iter().all(|label| node_labels.contains(*label))
}

fn matches_props(node: &Value, props: &Map<String, Value>) -> bool {
    props
        .iter()
        .filter(|(key, _)| key.as_str() != "labels")
        .all(|(key, value)| &node[key] == value)
}

async fn query_nodes(
    State(fake): State<Shared>,
    Path(label): Path<String>,
    Json(params): Json<Map<String, Value>>,
) -> Json<Value> {
    fake.count_graph_call();
    let pool = match label.as_str() {
        "User" => &fake.users,
        "Container" => &fake.projects,
        "Dataset" => &fake.datasets,
        _ => &fake.entities,
    };
    if params.get("is_all") == Some(&json!(true)) {
        return Json(json!(pool));
    }
    let found: Vec<&Value> = pool.iter().filter(|n| matches_props(n, &params)).collect();
    Json(json!(found))
}

#[derive(Deserialize)]
struct RelationParams {
    start_id: i64,
    end_id: i64,
}

async fn relation_between(
    State(fake): State<Shared>,
    Query(params): Query<RelationParams>,
) -> Json<Value> {
    fake.count_graph_call();
    let records: Vec<Value> = fake
        .relations
        .iter()
        .filter(|(start, end, _)| *start == params.start_id && *end == params.end_id)
        .map(|(_, _, kind)| json!({"r": {"type": kind}}))
        .collect();
    Json(json!(records))
}

async fn relation_query(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.count_graph_call();
    let end_nodes: Vec<&Value> = match (body["start_label"].as_str(), body["end_label"].as_str()) {
        (Some("User"), Some("Container")) => {
            let user_id = body["start_params"]["name"]
                .as_str()
                .and_then(|name| fake.user_id(name));
            fake.relations
                .iter()
                .filter(|(start, _, _)| Some(*start) == user_id)
                .filter_map(|(_, end, _)| fake.project_by_id(*end))
                .collect()
        }
        (Some("User"), Some("Dataset")) => fake
            .datasets
            .iter()
            .filter(|d| d["creator"] == body["start_params"]["name"])
            .collect(),
        _ => {
            let end_params = body["end_params"].as_object().cloned().unwrap_or_default();
            fake.entities
                .iter()
                .filter(|n| has_labels(n, &body["end_label"]) && matches_props(n, &end_params))
                .collect()
        }
    };
    let records: Vec<Value> = end_nodes.into_iter().map(|n| json!({"end_node": n})).collect();
    Json(json!(records))
}

async fn search_nodes(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.count_graph_call();
    let query = body["query"].as_object().cloned().unwrap_or_default();
    let labels = query.get("labels").cloned().unwrap_or(Value::Null);
    let found: Vec<&Value> = fake
        .entities
        .iter()
        .filter(|n| has_labels(n, &labels) && matches_props(n, &query))
        .collect();
    Json(json!({"code": 200, "result": found}))
}

async fn nodes_by_geid(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.count_graph_call();
    let geids = body["geids"].as_array().cloned().unwrap_or_default();
    let found: Vec<&Value> = fake
        .entities
        .iter()
        .filter(|n| geids.contains(&n["global_entity_id"]))
        .collect();
    Json(json!({"code": 200, "result": found}))
}

#[derive(Deserialize)]
struct FileExistParams {
    zone: String,
    file_relative_path: String,
}

async fn file_exist(
    State(fake): State<Shared>,
    Query(params): Query<FileExistParams>,
) -> (StatusCode, Json<Value>) {
    let exists = fake.entities.iter().any(|n| {
        has_labels(n, &json!(params.zone)) && n["display_path"] == params.file_relative_path
    });
    if exists {
        (StatusCode::OK, Json(json!({"code": 200, "error_msg": "", "result": true})))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"code": 404, "error_msg": "File not found", "result": false})),
        )
    }
}

async fn attach(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"code": 200, "error_msg": "", "result": body}))
}

async fn upload_jobs(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["upload_message"] == "busy" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"code": 409, "error_msg": "Upload in progress", "result": {}})),
        );
    }
    let session = headers
        .get("Session-ID")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "code": 200,
            "error_msg": "",
            "result": {"session_id": session, "project_code": body["project_code"]},
        })),
    )
}

async fn download_pre(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"code": 200, "error_msg": "", "result": {"status": "ready", "files": body["files"]}}))
}

async fn hpc_auth(Json(body): Json<Value>) -> Json<Value> {
    if body["username"] == "hpcuser" {
        Json(json!({"code": 200, "error_msg": "", "result": "hpc-token"}))
    } else {
        Json(json!({"code": 401, "error_msg": "bad credentials", "result": ""}))
    }
}

async fn hpc_submit(Json(body): Json<Value>) -> Json<Value> {
    if body["job_info"]["script"] == "expired" {
        return Json(json!({
            "code": 500,
            "error_msg": "Zero Bytes were transmitted or received",
            "result": {},
        }));
    }
    Json(json!({"code": 200, "error_msg": "", "result": {"job_id": "7"}}))
}

async fn hpc_job(Path(job_id): Path<String>) -> Json<Value> {
    if job_id == "404" {
        Json(json!({"code": 500, "error_msg": "slurm: unknown job 404", "result": {}}))
    } else {
        Json(json!({"code": 200, "error_msg": "", "result": {"job_id": job_id}}))
    }
}

async fn hpc_nodes() -> Json<Value> {
    Json(json!({"code": 200, "error_msg": "", "result": [{"name": "n1"}]}))
}

async fn hpc_node(Path(name): Path<String>) -> Json<Value> {
    Json(json!({
        "code": 500,
        "error_msg": format!("Invalid node name specified: {name}"),
        "result": {},
    }))
}

async fn hpc_partitions() -> Json<Value> {
    Json(json!({"code": 200, "error_msg": "", "result": []}))
}

async fn kg_resources(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    (
        StatusCode::CREATED,
        Json(json!({"authorization": authorization, "data": body["data"]})),
    )
}

async fn lineage(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::ACCEPTED, Json(json!({"lineage": body})))
}

fn upstream_router(fake: Shared) -> Router {
    Router::new()
        .route("/v1/neo4j/nodes/{label}/query", post(query_nodes))
        .route("/v1/neo4j/nodes/query/geids", post(nodes_by_geid))
        .route("/v1/neo4j/relations", get(relation_between))
        .route("/v1/neo4j/relations/query", post(relation_query))
        .route("/v2/neo4j/nodes/query", post(search_nodes))
        .route("/v1/project/{code}/file/exist", get(file_exist))
        .route("/v1/files/attributes/attach", post(attach))
        .route("/v1/files/jobs", post(upload_jobs))
        .route("/v1/download/pre/", post(download_pre))
        .route("/v1/hpc/auth", post(hpc_auth))
        .route("/v1/hpc/job", post(hpc_submit))
        .route("/v1/hpc/job/{job_id}", get(hpc_job))
        .route("/v1/hpc/nodes", get(hpc_nodes))
        .route("/v1/hpc/nodes/{name}", get(hpc_node))
        .route("/v1/hpc/partitions", get(hpc_partitions))
        .route("/v1/resources", post(kg_resources))
        .route("/v1/lineage", post(lineage))
        .with_state(fake)
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

/// The gateway and its fake upstream, both served in-process.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub upstream: Arc<FakeUpstream>,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        let upstream = Arc::new(FakeUpstream::seeded());
        let upstream_addr = spawn(upstream_router(upstream.clone())).await;

        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(SqliteStore::new(temp_dir.path().join("bffcli.db")).expect("open db"));
        store.initialize().expect("init db");

        let services = Services::new(&ServicesConfig::single_host(&format!(
            "http://{upstream_addr}"
        )))
        .expect("build clients");
        let auth = AuthConfig {
            cli_secret: CLI_SECRET.to_string(),
            jwt_secret: None,
        };
        let state = AppState::new(store.clone(), services, ZoneConfig::default(), auth);
        let addr = spawn(create_router(Arc::new(state))).await;

        Self {
            temp_dir,
            base_url: format!("http://{addr}"),
            upstream,
            store,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn graph_calls(&self) -> usize {
        self.upstream.graph_calls.load(Ordering::SeqCst)
    }
}

/// Unsigned JWT for `username`, expiring `ttl_secs` from now.
pub fn token_for(username: &str, ttl_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "RS256", "typ": "JWT"}).to_string());
    let claims = URL_SAFE_NO_PAD.encode(
        json!({"preferred_username": username, "exp": exp}).to_string(),
    );
    format!("{header}.{claims}.signature")
}

pub async fn read_json(resp: reqwest::Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = resp.json().await.expect("json body");
    (status, body)
}
