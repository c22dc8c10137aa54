use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::server::AppState;
use crate::server::dto::{HpcAuthRequest, HpcJobRequest, HpcQuery};
use crate::server::extract::{Json, Query};
use crate::server::response::{ApiError, ApiResponse};
use crate::services::{HpcHost, HpcResource};

pub async fn auth(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HpcAuthRequest>,
) -> impl IntoResponse {
    let token = state
        .services
        .hpc
        .auth(&req.token_issuer, &req.username, &req.password)
        .await
        .map_err(|e| ApiError::from(e).with_result(json!([])))?;

    tracing::info!("Issued HPC token for {}", req.username);
    Ok::<_, ApiError>(ApiResponse::success(token))
}

pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HpcJobRequest>,
) -> impl IntoResponse {
    let host = HpcHost::parse(&req.host)?;
    let job = state
        .services
        .hpc
        .submit_job(&req.token, &host, &req.username, &req.job_info)
        .await?;

    tracing::info!("Submitted HPC job on {} for {}", host.slurm_host, req.username);
    Ok::<_, ApiError>(ApiResponse::success(job))
}

async fn fetch(state: &AppState, resource: HpcResource, query: &HpcQuery) -> Result<Value, ApiError> {
    let host = HpcHost::parse(&query.host)?;
    let value = state
        .services
        .hpc
        .fetch(&resource, &query.token, &host, &query.username)
        .await?;
    Ok(value)
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Query(query): Query<HpcQuery>,
) -> impl IntoResponse {
    let job = fetch(&state, HpcResource::Job(job_id), &query).await?;
    Ok::<_, ApiError>(ApiResponse::success(job))
}

pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HpcQuery>,
) -> impl IntoResponse {
    let nodes = fetch(&state, HpcResource::Nodes, &query).await?;
    Ok::<_, ApiError>(ApiResponse::success(nodes))
}

pub async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(node_name): Path<String>,
    Query(query): Query<HpcQuery>,
) -> impl IntoResponse {
    let node = fetch(&state, HpcResource::Node(node_name), &query).await?;
    Ok::<_, ApiError>(ApiResponse::success(node))
}

pub async fn list_partitions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HpcQuery>,
) -> impl IntoResponse {
    let partitions = fetch(&state, HpcResource::Partitions, &query).await?;
    Ok::<_, ApiError>(ApiResponse::success(partitions))
}

pub async fn get_partition(
    State(state): State<Arc<AppState>>,
    Path(partition_name): Path<String>,
    Query(query): Query<HpcQuery>,
) -> impl IntoResponse {
    let partition = fetch(&state, HpcResource::Partition(partition_name), &query).await?;
    Ok::<_, ApiError>(ApiResponse::success(partition))
}
