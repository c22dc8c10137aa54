mod access;
mod datasets;
mod files;
mod hpc;
mod kg;
mod lineage;
mod manifests;
mod projects;
mod validate;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn v1_router() -> Router<Arc<AppState>> {
    Router::new()
        // Projects
        .route("/projects", get(projects::list_projects))
        .route("/project/{code}/files", post(projects::upload_files))
        .route("/project/{code}/role", get(projects::get_role))
        .route("/project/{code}/folder", get(projects::get_folder))
        .route("/project/{code}/file/exist", get(projects::file_exists))
        // Files
        .route("/{code}/files/query", get(files::list_files))
        .route("/query/geid", post(files::query_geid))
        .route("/files/download/pre", post(files::download_pre))
        // Manifests
        .route("/manifest", get(manifests::list_manifests))
        .route("/manifest/attach", post(manifests::attach_manifest))
        .route("/manifest/export", get(manifests::export_manifest))
        // Validation (no identity required)
        .route("/validate/gid", post(validate::validate_gid))
        .route("/validate/manifest", post(validate::validate_manifest))
        .route("/validate/env", post(validate::validate_env))
        // Datasets
        .route("/datasets", get(datasets::list_datasets))
        .route("/dataset/{code}", get(datasets::get_dataset))
        // HPC (credentials travel in the request)
        .route("/hpc/auth", post(hpc::auth))
        .route("/hpc/job", post(hpc::submit_job))
        .route("/hpc/job/{job_id}", get(hpc::get_job))
        .route("/hpc/nodes", get(hpc::list_nodes))
        .route("/hpc/nodes/{name}", get(hpc::get_node))
        .route("/hpc/partitions", get(hpc::list_partitions))
        .route("/hpc/partitions/{name}", get(hpc::get_partition))
        // Forwarded services
        .route("/kg/resources", post(kg::import_resources))
        .route("/lineage", post(lineage::create_lineage))
}
